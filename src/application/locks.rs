use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-key async mutexes.
///
/// Serializes read-modify-write sequences on a single record (an item's stock,
/// an order's status) without blocking unrelated keys.
pub struct KeyedLocks<K> {
    locks: DashMap<K, Arc<Mutex<()>>>,
}

impl<K> Default for KeyedLocks<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Ord + Copy,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, key: K) -> Arc<Mutex<()>> {
        self.locks.entry(key).or_default().clone()
    }

    /// Waits for exclusive access to `key`.
    pub async fn lock(&self, key: K) -> OwnedMutexGuard<()> {
        self.handle(key).lock_owned().await
    }

    /// Locks every key in ascending order, skipping duplicates.
    ///
    /// Callers locking overlapping sets always acquire in the same order and so
    /// cannot deadlock each other.
    pub async fn lock_all(&self, keys: impl IntoIterator<Item = K>) -> Vec<OwnedMutexGuard<()>> {
        let mut keys: Vec<K> = keys.into_iter().collect();
        keys.sort_unstable();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in keys {
            guards.push(self.lock(key).await);
        }
        guards
    }

    /// Drops the entry for `key` once nobody else holds or waits on it.
    pub fn forget(&self, key: K) {
        self.locks
            .remove_if(&key, |_, handle| Arc::strong_count(handle) == 1);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
