//! Sharded store implementation
//!
//! Fixed array of `RwLock<HashMap>` shards addressed by FNV-1a.

use tracing::debug;

use crate::error::{KvError, Result};
use crate::wal::{Event, EventKind};

use super::hash::shard_for;
use super::shard::Shard;

/// Concurrent in-memory key-value map
///
/// ## Concurrency:
/// - Each shard has its own `RwLock`; there is no store-wide lock
/// - Many readers per shard, one writer per shard
/// - All methods use `&self`, so the store can be shared through an `Arc`
#[derive(Debug)]
pub struct ShardedStore {
    shards: Box<[Shard]>,
}

impl ShardedStore {
    /// Create a store with `shard_count` empty shards
    pub fn new(shard_count: usize) -> Result<Self> {
        if shard_count == 0 {
            return Err(KvError::InvalidShardCount(shard_count));
        }

        let shards = (0..shard_count).map(|_| Shard::default()).collect();
        debug!(shard_count, "sharded store created");
        Ok(Self { shards })
    }

    /// Insert or overwrite the value for `key`
    pub fn put(&self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.shard(&key).put(key, value.into());
    }

    /// Current value for `key`
    pub fn get(&self, key: &str) -> Result<String> {
        self.shard(key)
            .get(key)
            .ok_or_else(|| KvError::KeyNotFound(key.to_string()))
    }

    /// Remove `key` if present; deleting an absent key is not an error.
    /// Returns whether a value was removed.
    pub fn delete(&self, key: &str) -> bool {
        self.shard(key).delete(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.shard(key).contains_key(key)
    }

    /// Apply a replayed log event
    pub fn apply(&self, event: &Event) {
        match event.kind {
            EventKind::Put => self.put(event.key.as_str(), event.value.as_str()),
            EventKind::Delete => {
                self.delete(&event.key);
            }
        }
    }

    /// Index of the shard that owns `key`
    pub fn shard_index(&self, key: &str) -> usize {
        shard_for(key, self.shards.len())
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Number of keys held by one shard.
    ///
    /// Panics if `index` is out of range.
    pub fn shard_len(&self, index: usize) -> usize {
        self.shards[index].len()
    }

    /// Total number of keys. Shards are read one at a time, so under
    /// concurrent writes this is not a consistent snapshot.
    pub fn len(&self) -> usize {
        self.shards.iter().map(Shard::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|shard| shard.len() == 0)
    }

    fn shard(&self, key: &str) -> &Shard {
        &self.shards[self.shard_index(key)]
    }
}
