use crate::model::FavoriteKey;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One lock per (user, property) pair, created on first use.
///
/// The registry only keeps weak references: a pair's lock lives as long as some
/// task holds or waits for it, and dead entries are pruned on the next acquire.
#[derive(Default)]
pub struct PairLocks {
    slots: Mutex<HashMap<FavoriteKey, Weak<AsyncMutex<()>>>>,
}

impl PairLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to the pair. Waiters are served in the order
    /// they called `acquire`.
    pub async fn acquire(&self, key: &FavoriteKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.retain(|_, slot| slot.strong_count() > 0);
            match slots.get(key).and_then(Weak::upgrade) {
                Some(lock) => lock,
                None => {
                    let lock = Arc::new(AsyncMutex::new(()));
                    slots.insert(key.clone(), Arc::downgrade(&lock));
                    lock
                }
            }
        };
        lock.lock_owned().await
    }

    /// Pairs whose lock is currently held or awaited.
    pub fn active(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| slot.strong_count() > 0)
            .count()
    }
}
