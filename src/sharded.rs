//! Lock-striped map.
//!
//! The key space is partitioned across `N` independent shards, each a hash map
//! behind its own reader/writer lock. Operations only lock the shard that owns
//! the key, so threads working on different shards never contend.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                         ShardedLockMap                               │
//! │                                                                      │
//! │  key % N  ──▶  Shard Selection                                       │
//! │                                                                      │
//! │  ┌──────────────┐ ┌──────────────┐     ┌──────────────┐              │
//! │  │   Shard 0    │ │   Shard 1    │ ... │  Shard N-1   │              │
//! │  │  ┌────────┐  │ │  ┌────────┐  │     │  ┌────────┐  │              │
//! │  │  │ RwLock │  │ │  │ RwLock │  │     │  │ RwLock │  │              │
//! │  │  └────┬───┘  │ │  └────┬───┘  │     │  └────┬───┘  │              │
//! │  │  ┌────▼───┐  │ │  ┌────▼───┐  │     │  ┌────▼───┐  │              │
//! │  │  │HashMap │  │ │  │HashMap │  │     │  │HashMap │  │              │
//! │  │  └────────┘  │ │  └────────┘  │     │  └────────┘  │              │
//! │  └──────────────┘ └──────────────┘     └──────────────┘              │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A key always maps to exactly one shard, so there is no cross-shard
//! coordination and no global invariant beyond key uniqueness.
//!
//! A lookup never mutates a shard. Shards use `RwLock`, so concurrent readers
//! of one shard do not exclude each other.

use crate::config::ShardedMapConfig;
use crate::error::ConfigError;
use crate::keyspace::KeySpace;
use crate::map::{ConcurrentIntMap, IntMap, Key, Value};
use crate::metrics::{CoreMapMetrics, MapMetrics};
use crate::HashMap;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Returns the shard owning `key` among `shards` shards.
#[inline]
pub(crate) fn shard_index(key: Key, shards: usize) -> usize {
    // The remainder is below `shards`, which is a usize.
    (key % shards as u64) as usize
}

/// A hash map split into independently locked shards.
///
/// # Example
///
/// ```
/// use conmap::config::ShardedMapConfig;
/// use conmap::ShardedLockMap;
///
/// let map = ShardedLockMap::init(ShardedMapConfig::with_shards(16));
/// map.put(17, 1);
/// assert_eq!(map.get(17), Some(1));
/// assert_eq!(map.shard_of(17), 1);
/// ```
pub struct ShardedLockMap {
    shards: Box<[RwLock<HashMap<Key, Value>>]>,
    key_space: KeySpace,
}

impl ShardedLockMap {
    /// Creates a map with the default shard count.
    pub fn new() -> Self {
        Self::init(ShardedMapConfig::default())
    }

    /// Creates a map from a configuration.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid. Use [`try_init`](Self::try_init)
    /// to handle that case.
    pub fn init(config: ShardedMapConfig) -> Self {
        match Self::try_init(config) {
            Ok(map) => map,
            Err(err) => panic!("invalid sharded map configuration: {err}"),
        }
    }

    /// Creates a map from a configuration, rejecting invalid ones.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroShards`] if `config.shards` is zero.
    pub fn try_init(config: ShardedMapConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let shard_capacity = config.shard_capacity();
        let shards: Vec<_> = (0..config.shards)
            .map(|_| RwLock::new(HashMap::with_capacity(shard_capacity)))
            .collect();

        tracing::debug!(shards = config.shards, key_space = ?config.base.key_space, "creating sharded lock map");
        Ok(Self {
            shards: shards.into_boxed_slice(),
            key_space: config.base.key_space,
        })
    }

    /// Returns the index of the shard that owns `key`.
    #[inline]
    pub fn shard_of(&self, key: Key) -> usize {
        shard_index(key, self.shards.len())
    }

    /// Returns the number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Returns the value stored for `key`, read-locking only its shard.
    #[inline]
    pub fn get(&self, key: Key) -> Option<Value> {
        self.key_space.check(key);
        self.shards[self.shard_of(key)].read().get(&key).copied()
    }

    /// Stores `value` for `key`, write-locking only its shard.
    #[inline]
    pub fn put(&self, key: Key, value: Value) {
        self.key_space.check(key);
        self.shards[self.shard_of(key)].write().insert(key, value);
    }

    /// Returns the total number of keys across all shards.
    ///
    /// Note: This locks each shard in turn, so the result may be slightly
    /// stale while writers are active.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.read().len()).sum()
    }

    /// Returns `true` if no shard holds a key.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|s| s.read().is_empty())
    }
}

impl Default for ShardedLockMap {
    fn default() -> Self {
        Self::new()
    }
}

impl IntMap for ShardedLockMap {
    fn get(&self, key: Key) -> Option<Value> {
        ShardedLockMap::get(self, key)
    }

    fn put(&mut self, key: Key, value: Value) {
        ShardedLockMap::put(self, key, value);
    }

    fn name(&self) -> &'static str {
        "shard"
    }
}

impl ConcurrentIntMap for ShardedLockMap {
    fn put_shared(&self, key: Key, value: Value) {
        ShardedLockMap::put(self, key, value);
    }
}

impl MapMetrics for ShardedLockMap {
    fn metrics(&self) -> BTreeMap<String, f64> {
        let lens: Vec<usize> = self.shards.iter().map(|s| s.read().len()).collect();
        let mut metrics = CoreMapMetrics::new(lens.iter().sum(), lens.len()).to_btreemap();
        metrics.insert(
            "largest_shard".to_string(),
            lens.iter().copied().max().unwrap_or(0) as f64,
        );
        metrics
    }

    fn algorithm_name(&self) -> &'static str {
        "ShardedLock"
    }
}

impl core::fmt::Debug for ShardedLockMap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ShardedLockMap")
            .field("shard_count", &self.shards.len())
            .field("total_len", &self.len())
            .finish()
    }
}
