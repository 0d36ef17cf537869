use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::sync::MutexGuard;

use tracing::warn;

static POISON_RECOVERIES: AtomicU64 = AtomicU64::new(0);

/// Locks `lock`, taking the inner guard back if a previous holder panicked.
pub fn mutex_lock_or_recover<T: ?Sized>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        POISON_RECOVERIES.fetch_add(1, Ordering::Relaxed);
        warn!("recovering from poisoned mutex");
        poisoned.into_inner()
    })
}

/// Number of poisoned locks recovered by this process so far.
pub fn poison_recovery_count() -> u64 {
    POISON_RECOVERIES.load(Ordering::Relaxed)
}
