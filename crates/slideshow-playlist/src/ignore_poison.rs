//! Mutex locking that recovers from poisoning.
//!
//! Every playlist operation leaves entries and position consistent with each other before it
//! returns, so a panic on one thread while holding the lock (a subscriber, a test assertion)
//! does not leave half-written state behind. Recovering the guard keeps the reload worker and
//! the caller thread usable afterwards.

use std::sync::{Mutex, MutexGuard};

pub(crate) trait IgnorePoison<T> {
    /// Locks the mutex, taking the guard back even if another thread panicked while holding it.
    fn lock_ignore_poison(&self) -> MutexGuard<'_, T>;
}

impl<T> IgnorePoison<T> for Mutex<T> {
    fn lock_ignore_poison(&self) -> MutexGuard<'_, T> {
        self.lock().unwrap_or_else(|e| e.into_inner())
    }
}
