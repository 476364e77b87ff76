//! Scanner Error Types
//!
//! Only errors the caller must handle synchronously live here. Everything
//! that goes wrong with the scan process itself is reported as
//! `ScanResult::Failed` through the `Finished` notification instead.

use crate::scanner::types::SessionId;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ScanError {
    /// `scan()` was called while another session is still running
    #[error("{message}")]
    AlreadyRunning {
        session_id: SessionId,
        message: String,
    },

    /// The command template cannot be turned into a command line
    #[error("Invalid scan command: {message}")]
    Template { message: String },

    /// The supervisor was created outside a tokio runtime
    #[error("No tokio runtime available: {message}")]
    NoRuntime { message: String },

    #[error("Internal scanner error: {message}")]
    Internal { message: String },
}

impl ScanError {
    pub fn already_running(session_id: SessionId) -> Self {
        Self::AlreadyRunning {
            session_id,
            message: format!(
                "A scan is already in progress (session {}); wait for it to finish or cancel it",
                session_id
            ),
        }
    }
}

impl crate::core::error_handling::ContextualError for ScanError {
    fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            ScanError::AlreadyRunning { .. } | ScanError::Template { .. }
        )
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ScanError::AlreadyRunning { message, .. } | ScanError::Template { message } => {
                Some(message)
            }
            _ => None,
        }
    }
}
