//! Generic error handling utilities
//!
//! Provides unified error reporting across the settings, scanner and
//! notification subsystems while keeping their error types separate.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)` with a message the user can act on (fix the config file,
/// wait for the running scan). When it returns `false`, `user_message()`
/// returns `None` and only generic context is shown.
pub trait ContextualError: std::error::Error {
    /// Returns true if this error carries a message that should be shown to the user as-is
    ///
    /// User-actionable: missing config file, malformed settings value, scan already running.
    /// System: IO failures, poisoned locks, missing tokio runtime.
    fn is_user_actionable(&self) -> bool;

    /// Returns the specific user message if this is a user-actionable error
    fn user_message(&self) -> Option<&str>;
}

/// Log errors with appropriate detail level based on error specificity
///
/// User-actionable errors are reported with their own message, system errors
/// with the supplied operation context. Full details always go to debug level.
///
/// # Examples
/// ```rust,no_run
/// # use vaultscan::core::error_handling::log_error_with_context;
/// # use vaultscan::settings::SettingsError;
/// let err = SettingsError::invalid_value("cancel-grace-ms", "expected milliseconds");
/// log_error_with_context(&err, "Loading settings");
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => log::error!("FATAL: {}", user_msg),
        _ => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}
