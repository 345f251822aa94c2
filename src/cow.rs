//! Copy-on-write sharded map.
//!
//! Shards are selected by `key % N` like [`ShardedLockMap`](crate::ShardedLockMap),
//! but each shard publishes an immutable snapshot through an atomically
//! swappable reference ([`arc_swap::ArcSwap`]).
//!
//! # Concurrency Model
//!
//! ```text
//! Reader threads (N)              Writer threads (per shard, serialized)
//!   |                               |
//!   +-- shard.snapshot.load()       +-- shard.write_lock.lock()
//!   |   (lock-free load)            +-- copy current snapshot, apply put
//!   |                               +-- shard.snapshot.store(new)
//!   +-- lookup in the snapshot      |   (atomic pointer swap)
//!       that was current at load    +-- unlock; old snapshot dropped when
//!                                       the last reader releases it
//! ```
//!
//! Readers never block and never see a half-built snapshot. Writers to the
//! same shard serialize on the shard's write lock; writers to different
//! shards do not interact. Every write copies its whole shard, so write cost
//! grows with shard size.

use crate::config::ShardedMapConfig;
use crate::error::ConfigError;
use crate::keyspace::KeySpace;
use crate::map::{ConcurrentIntMap, IntMap, Key, Value};
use crate::metrics::{CoreMapMetrics, EventCounter, MapMetrics};
use crate::sharded::shard_index;
use crate::HashMap;
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

/// An immutable view of one shard's contents at a point in time.
///
/// Holding a snapshot keeps it alive; later writes publish new snapshots and
/// never change this one.
#[derive(Clone)]
pub struct Snapshot(Arc<HashMap<Key, Value>>);

impl Snapshot {
    /// Returns the value stored for `key` in this snapshot.
    #[inline]
    pub fn get(&self, key: Key) -> Option<Value> {
        self.0.get(&key).copied()
    }

    /// Returns `true` if `key` is present in this snapshot.
    pub fn contains_key(&self, key: Key) -> bool {
        self.0.contains_key(&key)
    }

    /// Number of keys in this snapshot.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (Key, Value)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

impl core::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Snapshot").field("len", &self.len()).finish()
    }
}

struct CowShard {
    snapshot: ArcSwap<HashMap<Key, Value>>,
    write_lock: Mutex<()>,
}

impl CowShard {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(HashMap::with_capacity(capacity)),
            write_lock: Mutex::new(()),
        }
    }
}

/// A sharded map whose readers never take a lock.
///
/// # Example
///
/// ```
/// use conmap::config::ShardedMapConfig;
/// use conmap::CopyOnWriteShardedMap;
///
/// let map = CopyOnWriteShardedMap::init(ShardedMapConfig::with_shards(16));
/// map.put(3, 30);
/// let before = map.snapshot_of(3);
/// map.put(3, 31);
///
/// assert_eq!(before.get(3), Some(30));
/// assert_eq!(map.get(3), Some(31));
/// ```
pub struct CopyOnWriteShardedMap {
    shards: Box<[CowShard]>,
    key_space: KeySpace,
    snapshots_published: EventCounter,
}

impl CopyOnWriteShardedMap {
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
            Err(err) => panic!("invalid copy-on-write map configuration: {err}"),
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
            .map(|_| CowShard::with_capacity(shard_capacity))
            .collect();

        tracing::debug!(shards = config.shards, key_space = ?config.base.key_space, "creating copy-on-write sharded map");
        Ok(Self {
            shards: shards.into_boxed_slice(),
            key_space: config.base.key_space,
            snapshots_published: EventCounter::new(),
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

    /// Returns the value for `key` from the shard's current snapshot.
    ///
    /// Lock-free and non-blocking.
    #[inline]
    pub fn get(&self, key: Key) -> Option<Value> {
        self.key_space.check(key);
        self.shards[self.shard_of(key)]
            .snapshot
            .load()
            .get(&key)
            .copied()
    }

    /// Publishes a new snapshot of `key`'s shard containing `value` for `key`.
    ///
    /// Serializes with other writers of the same shard. Copies the shard.
    pub fn put(&self, key: Key, value: Value) {
        self.key_space.check(key);
        let shard = &self.shards[self.shard_of(key)];

        let _writer = shard.write_lock.lock();
        let current = shard.snapshot.load();
        if current.get(&key) == Some(&value) {
            return;
        }
        let mut next = HashMap::clone(&current);
        next.insert(key, value);
        shard.snapshot.store(Arc::new(next));
        self.snapshots_published.incr();
    }

    /// Stores every `(key, value)` pair, publishing at most one snapshot per
    /// shard.
    ///
    /// Each touched shard is copied once for the whole batch instead of once
    /// per key. Readers see either none or all of a shard's part of the batch.
    /// Later pairs win over earlier ones with the same key.
    pub fn put_all<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (Key, Value)>,
    {
        let mut per_shard: Vec<Vec<(Key, Value)>> = vec![Vec::new(); self.shards.len()];
        for (key, value) in entries {
            self.key_space.check(key);
            per_shard[self.shard_of(key)].push((key, value));
        }

        for (shard, batch) in self.shards.iter().zip(per_shard) {
            if batch.is_empty() {
                continue;
            }
            let _writer = shard.write_lock.lock();
            let mut next = HashMap::clone(&shard.snapshot.load());
            next.reserve(batch.len());
            next.extend(batch);
            shard.snapshot.store(Arc::new(next));
            self.snapshots_published.incr();
        }
    }

    /// Returns the current snapshot of the shard that owns `key`.
    pub fn snapshot_of(&self, key: Key) -> Snapshot {
        Snapshot(self.shards[self.shard_of(key)].snapshot.load_full())
    }

    /// Total number of keys across the current snapshots.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.snapshot.load().len()).sum()
    }

    /// Returns `true` if every current snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|s| s.snapshot.load().is_empty())
    }

    /// Number of snapshots published since construction.
    pub fn snapshots_published(&self) -> u64 {
        self.snapshots_published.get()
    }
}

impl Default for CopyOnWriteShardedMap {
    fn default() -> Self {
        Self::new()
    }
}

impl IntMap for CopyOnWriteShardedMap {
    fn get(&self, key: Key) -> Option<Value> {
        CopyOnWriteShardedMap::get(self, key)
    }

    fn put(&mut self, key: Key, value: Value) {
        CopyOnWriteShardedMap::put(self, key, value);
    }

    fn name(&self) -> &'static str {
        "cow"
    }
}

impl ConcurrentIntMap for CopyOnWriteShardedMap {
    fn put_shared(&self, key: Key, value: Value) {
        CopyOnWriteShardedMap::put(self, key, value);
    }
}

impl MapMetrics for CopyOnWriteShardedMap {
    fn metrics(&self) -> BTreeMap<String, f64> {
        let mut metrics = CoreMapMetrics::new(self.len(), self.shards.len()).to_btreemap();
        metrics.insert(
            "snapshots_published".to_string(),
            self.snapshots_published() as f64,
        );
        metrics
    }

    fn algorithm_name(&self) -> &'static str {
        "CopyOnWriteSharded"
    }
}

impl core::fmt::Debug for CopyOnWriteShardedMap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CopyOnWriteShardedMap")
            .field("shard_count", &self.shards.len())
            .field("total_len", &self.len())
            .field("snapshots_published", &self.snapshots_published())
            .finish()
    }
}
