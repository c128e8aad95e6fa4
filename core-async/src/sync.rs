//! Synchronization primitives.
//!
//! Async-aware primitives come from `tokio::sync`. Components that only hold a
//! lock for a few field updates (never across an `.await`) use
//! [`std::sync::Mutex`] through [`lock_unpoisoned`].

pub use tokio::sync::{
    broadcast, mpsc, oneshot, watch, Mutex as AsyncMutex, Notify, RwLock, Semaphore,
};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks a standard mutex, recovering the data if a previous holder panicked.
///
/// Provider callbacks may panic while the bridge holds state; the state itself
/// stays consistent because every critical section is a plain field update.
pub fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_lock_unpoisoned_recovers() {
        let shared = Arc::new(Mutex::new(1));
        let cloned = Arc::clone(&shared);
        let _ = std::thread::spawn(move || {
            let _guard = cloned.lock().unwrap();
            panic!("poison");
        })
        .join();

        assert!(shared.is_poisoned());
        *lock_unpoisoned(&shared) += 1;
        assert_eq!(*lock_unpoisoned(&shared), 2);
    }
}
