//! Synchronization utilities for robust mutex handling
//!
//! Converts mutex poisoning into subsystem errors so a panic on one task
//! surfaces as a typed failure instead of cascading panics.

use std::sync::LockResult;

/// Handle poisoned mutex cases with consistent error handling
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use vaultscan::core::sync::handle_mutex_poison;
/// use vaultscan::scanner::ScanError;
///
/// let mutex = Mutex::new(42);
/// let guard = handle_mutex_poison(
///     mutex.lock(),
///     |message| ScanError::Internal { message }
/// ).unwrap();
/// assert_eq!(*guard, 42);
/// ```
pub fn handle_mutex_poison<T, E>(
    result: LockResult<T>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<T, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "Internal synchronisation error (mutex poisoned). This indicates a panic occurred while holding a lock. PoisonError: {:?}",
            poison_err
        ))
    })
}

/// Recover the guard from a poisoned lock
///
/// For state that stays consistent across a panic (plain enums replaced
/// wholesale), continuing with the inner value is preferable to failing.
pub fn recover_poison<T>(result: LockResult<T>) -> T {
    result.unwrap_or_else(|poison_err| {
        log::warn!("Recovering from poisoned lock");
        poison_err.into_inner()
    })
}
