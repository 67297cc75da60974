//! Per-key mutual exclusion.
//!
//! Two notifications for the same cart must not interleave their
//! read-snapshot / write-snapshot sections, otherwise both compare against
//! the same old snapshot and emit duplicate events. Different keys never
//! contend.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Clone, Default)]
pub struct KeyedLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

/// Held for the duration of one keyed critical section. Also alive while
/// waiting, with no inner guard yet.
pub struct KeyedLockGuard {
    key: String,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other holder of `key` remains, then take it.
    pub async fn lock(&self, key: &str) -> KeyedLockGuard {
        // Clone the Arc out so the shard lock is released before awaiting
        let mutex = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        // Built before waiting so a cancelled waiter still reclaims the entry
        let mut held = KeyedLockGuard {
            key: key.to_string(),
            locks: self.locks.clone(),
            guard: None,
        };
        held.guard = Some(mutex.lock_owned().await);
        held
    }

    /// Number of keys currently tracked (held or awaited)
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl Drop for KeyedLockGuard {
    fn drop(&mut self) {
        // Release first; the guard holds its own reference to the mutex
        self.guard.take();
        // Only the map's reference left means nobody holds or awaits the key
        self.locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
