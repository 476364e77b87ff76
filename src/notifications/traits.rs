//! Traits for the notification system

use crate::notifications::event::{ScanEvent, ScanEventType};
use crate::notifications::manager::EventReceiver;
use crate::scanner::types::ScanResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Callback-style consumer of scan lifecycle events
///
/// An alternative to polling an [`EventReceiver`] directly: hand the
/// receiver and the observer to [`spawn_observer`] and the callbacks run on
/// a tokio task in publication order.
#[async_trait]
pub trait ScanObserver: Send + Sync {
    /// A scan session has been accepted and its process launched
    async fn on_started(&self, event: &ScanEvent);

    /// A scan session reached its terminal state
    async fn on_finished(&self, event: &ScanEvent, result: ScanResult);

    /// Identifier for logging
    fn observer_id(&self) -> &str;
}

/// Drive an observer from a receiver until the publisher goes away
pub fn spawn_observer(
    mut receiver: EventReceiver,
    observer: Arc<dyn ScanObserver>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            match event.event_type {
                ScanEventType::Started => observer.on_started(&event).await,
                ScanEventType::Finished(result) => observer.on_finished(&event, result).await,
            }
        }
        log::trace!("Observer '{}' detached", observer.observer_id());
    })
}
