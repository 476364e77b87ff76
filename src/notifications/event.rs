//! Event types for the notification system

use crate::scanner::types::{ScanResult, SessionId};
use std::path::PathBuf;
use std::time::SystemTime;

/// The two observable lifecycle events of a scan session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanEventType {
    Started,
    Finished(ScanResult),
}

impl ScanEventType {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanEventType::Finished(_))
    }
}

/// Lifecycle notification published by the scan supervisor
#[derive(Clone, Debug)]
pub struct ScanEvent {
    pub event_type: ScanEventType,
    pub timestamp: SystemTime,
    pub session_id: SessionId,
    pub output_path: PathBuf,
    pub message: Option<String>,
}

impl ScanEvent {
    pub fn started(session_id: SessionId, output_path: PathBuf) -> Self {
        Self {
            event_type: ScanEventType::Started,
            timestamp: SystemTime::now(),
            session_id,
            output_path,
            message: None,
        }
    }

    pub fn finished(session_id: SessionId, output_path: PathBuf, result: ScanResult) -> Self {
        Self {
            event_type: ScanEventType::Finished(result),
            timestamp: SystemTime::now(),
            session_id,
            output_path,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Terminal result carried by a `Finished` event
    pub fn result(&self) -> Option<ScanResult> {
        match self.event_type {
            ScanEventType::Finished(result) => Some(result),
            ScanEventType::Started => None,
        }
    }
}

/// Event filtering options for subscribers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventFilter {
    All,
    /// Only `Finished` events
    TerminalOnly,
}

impl EventFilter {
    /// Check if an event should be accepted by this filter
    pub fn accepts(&self, event: &ScanEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::TerminalOnly => event.event_type.is_terminal(),
        }
    }
}
