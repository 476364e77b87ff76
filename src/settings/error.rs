//! Settings Error Types

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// An explicitly requested configuration file does not exist
    #[error("{message}")]
    FileNotFound { path: PathBuf, message: String },

    #[error("Failed to read configuration file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML
    #[error("{message}")]
    Parse { path: PathBuf, message: String },

    #[error("{message}")]
    InvalidValue { key: String, message: String },
}

impl SettingsError {
    pub fn file_not_found(path: PathBuf) -> Self {
        let message = format!(
            "The specified configuration file does not exist: {}",
            path.display()
        );
        Self::FileNotFound { path, message }
    }

    pub fn parse(path: PathBuf, error: impl std::fmt::Display) -> Self {
        let message = format!(
            "Error parsing configuration file {}: {}",
            path.display(),
            error
        );
        Self::Parse { path, message }
    }

    pub fn invalid_value(key: &str, detail: impl std::fmt::Display) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            message: format!("Invalid value for '{}': {}", key, detail),
        }
    }
}

impl crate::core::error_handling::ContextualError for SettingsError {
    fn is_user_actionable(&self) -> bool {
        !matches!(self, SettingsError::Read { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            SettingsError::FileNotFound { message, .. }
            | SettingsError::Parse { message, .. }
            | SettingsError::InvalidValue { message, .. } => Some(message),
            SettingsError::Read { .. } => None,
        }
    }
}

pub type SettingsResult<T> = Result<T, SettingsError>;
