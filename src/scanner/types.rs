//! Scanner Types and Enums

use strum_macros::{Display, EnumIter};

/// Identifier of one scan session, unique per supervisor
pub type SessionId = u64;

/// Outcome of a scan invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ScanResult {
    Cancelled,
    Complete,
    Failed,
    /// Resting value before any scan has run
    NotStarted,
}

/// Supervisor lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ScanState {
    Idle,
    Running,
}
