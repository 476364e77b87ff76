//! NotificationManager implementation
//!
//! Each subscriber gets its own unbounded channel, so publishing never blocks
//! the publisher and every subscriber sees events in publication order.

use crate::notifications::error::NotificationError;
use crate::notifications::event::{EventFilter, ScanEvent, ScanEventType};
use std::collections::HashMap;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Receiving end handed to subscribers
pub type EventReceiver = UnboundedReceiver<ScanEvent>;

struct SubscriberInfo {
    filter: EventFilter,
    source: String,
    sender: UnboundedSender<ScanEvent>,
}

#[derive(Default)]
pub struct NotificationManager {
    subscribers: HashMap<String, SubscriberInfo>,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber and return its event receiver
    ///
    /// Re-using an id replaces the previous subscription; the old receiver
    /// stops getting events.
    pub fn subscribe(
        &mut self,
        subscriber_id: String,
        filter: EventFilter,
        source: String,
    ) -> EventReceiver {
        let (sender, receiver) = unbounded_channel();

        let subscriber_info = SubscriberInfo {
            filter,
            source: source.clone(),
            sender,
        };

        if let Some(existing) = self.subscribers.insert(subscriber_id.clone(), subscriber_info) {
            log::warn!(
                "Subscriber '{}' replaced existing subscription (source: {} -> {})",
                subscriber_id,
                existing.source,
                source
            );
        }

        receiver
    }

    /// Remove a subscriber, returning whether it existed
    pub fn unsubscribe(&mut self, subscriber_id: &str) -> bool {
        self.subscribers.remove(subscriber_id).is_some()
    }

    /// Deliver an event to every subscriber whose filter accepts it
    ///
    /// Subscribers whose receiver has been dropped are removed and reported
    /// in the error; delivery to the remaining subscribers still happens.
    pub fn publish(&mut self, event: ScanEvent) -> Result<(), NotificationError> {
        let mut failed_subscribers = Vec::new();

        for (subscriber_id, subscriber_info) in &self.subscribers {
            if !subscriber_info.filter.accepts(&event) {
                continue;
            }
            if subscriber_info.sender.send(event.clone()).is_err() {
                failed_subscribers.push(subscriber_id.clone());
            }
        }

        for subscriber_id in &failed_subscribers {
            self.subscribers.remove(subscriber_id);
        }

        if !failed_subscribers.is_empty() {
            let event_type = match event.event_type {
                ScanEventType::Started => "Started".to_string(),
                ScanEventType::Finished(result) => format!("Finished({})", result),
            };
            return Err(NotificationError::PublishFailed {
                event_type,
                failed_subscribers,
            });
        }

        Ok(())
    }
}
