//! Scanner API
//!
//! Public surface of the scanner, following the same pattern as
//! `notifications::api`.

// Supervisor
pub use crate::scanner::supervisor::{ScanSupervisor, SupervisorOptions};

// Error handling
pub use crate::scanner::error::ScanError;

// Command templates
pub use crate::scanner::template::{CommandTemplate, OutputTarget, ScanCommand};

// Core data types
pub use crate::scanner::process::ProcessOutcome;
pub use crate::scanner::types::{ScanResult, ScanState, SessionId};
