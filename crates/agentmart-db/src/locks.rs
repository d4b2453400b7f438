//! Per-key async mutual exclusion
//!
//! Check-then-insert sequences (profile bootstrap, subscribe) hold the
//! caller's lock across the read and the write so two concurrent requests
//! from the same identity serialize. A key's mutex is removed from the map
//! when the last guard or waiter for it goes away.

use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap<K> = DashMap<K, Arc<Mutex<()>>>;

/// A map of lazily created mutexes, one per key
pub struct KeyedLocks<K: Eq + Hash> {
    locks: Arc<LockMap<K>>,
}

impl<K: Eq + Hash + Clone> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self {
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Wait for and take the lock for `key`
    pub async fn lock(&self, key: &K) -> KeyedGuard<K> {
        // Clone the Arc out so the DashMap shard is not held across the await
        let mutex = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = mutex.lock_owned().await;
        KeyedGuard {
            guard: Some(guard),
            locks: self.locks.clone(),
            key: key.clone(),
        }
    }

    /// Number of keys with a live mutex
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Holds one key's lock; releasing the last reference prunes the entry
pub struct KeyedGuard<K: Eq + Hash> {
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<LockMap<K>>,
    key: K,
}

impl<K: Eq + Hash> Drop for KeyedGuard<K> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map's own Arc left means no holder and no waiter. The
        // shard lock taken by remove_if orders this against a new `lock`.
        self.locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
