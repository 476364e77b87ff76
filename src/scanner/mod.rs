//! Scanner Component
//!
//! Supervises the external command that performs a document scan. A single
//! [`ScanSupervisor`] runs at most one session at a time, substitutes the
//! configured device into the command template, and reports each session's
//! outcome through the notification system.
//!
//! ## Core Features
//!
//! - **Non-blocking start**: `scan()` returns as soon as the process is launched
//! - **Single session**: a second `scan()` while running is rejected
//! - **Cancellation**: graceful terminate, forced kill after a grace period
//! - **Lifecycle events**: exactly one `Started` and one `Finished` per session

pub mod api;
pub mod error;
pub mod process;
pub mod supervisor;
pub mod template;
pub mod types;

pub use error::ScanError;
pub use supervisor::{ScanSupervisor, SupervisorOptions};
pub use types::{ScanResult, ScanState, SessionId};
