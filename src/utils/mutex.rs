/// Mutex helpers that never panic on poisoning.
///
/// A scripted child and the test driving it share one transcript. If the
/// test panics while holding the lock the mutex is poisoned; the helpers
/// here either surface that as an error or recover the guard.

use crate::error::SftpError;
use std::sync::{Mutex, MutexGuard};
use tracing::warn;

/// Lock a mutex with explicit error context.
///
/// # Returns
///
/// * `Ok(MutexGuard)` - Successfully acquired lock
/// * `Err(SftpError::LockPoisoned)` - Mutex was poisoned, with `context` prefixed
pub fn safe_lock_with_context<'a, T>(
    mutex: &'a Mutex<T>,
    context: &str,
) -> Result<MutexGuard<'a, T>, SftpError> {
    mutex
        .lock()
        .map_err(|e| SftpError::LockPoisoned(format!("{}: mutex poisoned ({})", context, e)))
}

/// Lock a mutex and automatically recover from poisoned state.
pub fn safe_lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("Mutex was poisoned, attempting recovery");
            poisoned.into_inner()
        }
    }
}
