//! Sharded lock registry
//!
//! The authoritative key -> entry mapping. An entry exists if and only if
//! the key is currently held. Keys are dispatched to a fixed set of shards
//! by hash; all operations on one key serialize on that key's shard mutex,
//! while distinct keys on distinct shards proceed independently.

use std::{
    collections::HashMap,
    hash::{BuildHasher, RandomState},
    sync::Arc,
};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Default shard count; per-key throughput is mutex-bound within a shard.
const DEFAULT_SHARDS: usize = 16;

/// In-memory record marking a key as held, with its signaling primitives.
///
/// Both tokens fire exactly once, at destruction, while the owning shard
/// mutex is still held. `unlock` wakes every caller blocked in the
/// wait-retry loop; `close` stops the entry's lease supervisor or wakes its
/// connection-scoped holder task.
pub struct LockEntry {
    unlock: CancellationToken,
    close: CancellationToken,
    refresh_tx: mpsc::Sender<u64>,
    refresh_rx: Mutex<Option<mpsc::Receiver<u64>>>,
}

impl LockEntry {
    fn new() -> Arc<Self> {
        // Capacity-1 slot: at most one refresh value is ever pending, and a
        // lease supervisor is back on recv before the next one is due.
        let (refresh_tx, refresh_rx) = mpsc::channel(1);
        Arc::new(Self {
            unlock: CancellationToken::new(),
            close: CancellationToken::new(),
            refresh_tx,
            refresh_rx: Mutex::new(Some(refresh_rx)),
        })
    }

    /// Resolves once the entry has been destroyed; level-triggered, wakes
    /// all wait-retry callers.
    pub async fn released(&self) {
        self.unlock.cancelled().await;
    }

    /// Resolves once the entry has been destroyed; level-triggered, consumed
    /// by the entry's supervising task.
    pub async fn closed(&self) {
        self.close.cancelled().await;
    }

    /// Hands out the refresh receiver to its single consumer. Returns `None`
    /// on any call after the first: one lease supervisor per entry.
    pub(crate) fn take_refresh_rx(&self) -> Option<mpsc::Receiver<u64>> {
        self.refresh_rx.lock().take()
    }

    /// Fire close then unlock, in that order. Called exactly once, by
    /// `LockRegistry::destroy` while the shard mutex is held.
    fn fire(&self) {
        self.close.cancel();
        self.unlock.cancel();
    }
}

/// Sharded key -> entry registry guarding all lock state.
pub struct LockRegistry {
    shards: Box<[Mutex<HashMap<String, Arc<LockEntry>>>]>,
    hasher: RandomState,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }

    pub fn with_shards(shards: usize) -> Self {
        let shards = shards.max(1);
        Self {
            shards: (0..shards)
                .map(|_| Mutex::new(HashMap::new()))
                .collect::<Vec<_>>()
                .into_boxed_slice(),
            hasher: RandomState::new(),
        }
    }

    fn shard(&self, key: &str) -> &Mutex<HashMap<String, Arc<LockEntry>>> {
        let index = self.hasher.hash_one(key) as usize % self.shards.len();
        &self.shards[index]
    }

    /// Insert-if-absent. Returns `(true, entry)` with a freshly created
    /// entry when the key was free, `(false, entry)` with the existing one
    /// otherwise. Creation and insertion happen under one critical section.
    pub fn try_create(&self, key: &str) -> (bool, Arc<LockEntry>) {
        let mut shard = self.shard(key).lock();
        if let Some(existing) = shard.get(key) {
            return (false, existing.clone());
        }
        let entry = LockEntry::new();
        shard.insert(key.to_string(), entry.clone());
        (true, entry)
    }

    /// Remove the entry and fire both of its signals before the shard mutex
    /// is released. Returns false when the key was not held; the signals of
    /// an entry therefore fire exactly once over its lifetime.
    pub fn destroy(&self, key: &str) -> bool {
        let mut shard = self.shard(key).lock();
        match shard.remove(key) {
            Some(entry) => {
                entry.fire();
                true
            }
            None => false,
        }
    }

    pub fn exists(&self, key: &str) -> bool {
        self.shard(key).lock().contains_key(key)
    }

    /// Best-effort delivery of a new ttl to the entry's lease supervisor.
    /// Returns false when the key is not held. A full slot (refresh already
    /// pending, or an entry that never had a lease) is not an error.
    pub fn refresh(&self, key: &str, ttl_ms: u64) -> bool {
        let shard = self.shard(key).lock();
        match shard.get(key) {
            Some(entry) => {
                let _ = entry.refresh_tx.try_send(ttl_ms);
                true
            }
            None => false,
        }
    }
}

impl Default for LockRegistry {
    fn default() -> Self {
        Self::new()
    }
}
