use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;

use crate::config::LockGranularity;
use crate::model::UserId;

/// Mutual exclusion for `apply`, scoped either to the whole ledger or to one user.
///
/// The locks guard `()`, so a poisoned lock is simply taken over: the data it
/// protects lives in the stores, which report their own failures.
#[derive(Debug)]
pub(crate) enum CriticalSection {
    Global(Mutex<()>),
    /// Per-user locks live only while some caller holds or waits on them.
    PerUser(DashMap<UserId, Arc<Mutex<()>>>),
}

impl CriticalSection {
    pub(crate) fn new(granularity: LockGranularity) -> Self {
        match granularity {
            LockGranularity::Global => CriticalSection::Global(Mutex::new(())),
            LockGranularity::PerUser => CriticalSection::PerUser(DashMap::new()),
        }
    }

    pub(crate) fn granularity(&self) -> LockGranularity {
        match self {
            CriticalSection::Global(_) => LockGranularity::Global,
            CriticalSection::PerUser(_) => LockGranularity::PerUser,
        }
    }

    /// Run `f` while holding the lock covering `user`. Blocks until it is free.
    pub(crate) fn enter<R>(&self, user: UserId, f: impl FnOnce() -> R) -> R {
        match self {
            CriticalSection::Global(lock) => {
                let _guard = acquire(lock);
                f()
            }
            CriticalSection::PerUser(slots) => {
                // the shard lock is released at the end of this statement
                let slot = Arc::clone(&slots.entry(user).or_default());
                let result = {
                    let _guard = acquire(&slot);
                    f()
                };
                drop(slot);
                // a count of one means only the map still refers to the slot, and no
                // other caller can clone it while the shard is locked
                slots.remove_if(&user, |_, slot| Arc::strong_count(slot) == 1);
                result
            }
        }
    }

    /// Number of per-user lock slots currently allocated.
    #[cfg(test)]
    pub(crate) fn slot_count(&self) -> usize {
        match self {
            CriticalSection::Global(_) => 0,
            CriticalSection::PerUser(slots) => slots.len(),
        }
    }
}

fn acquire<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}
