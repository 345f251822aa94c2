//! Ecosystem concurrent map.
//!
//! Delegates to [`dashmap::DashMap`], the concurrent associative container
//! most Rust programs reach for. Its internal locking granularity is its own
//! business; this wrapper only adapts it to the shared contract so it can be
//! benchmarked next to the hand-built variants.

use crate::config::MapConfig;
use crate::keyspace::KeySpace;
use crate::map::{ConcurrentIntMap, IntMap, Key, Value};
use crate::metrics::{CoreMapMetrics, MapMetrics};
use dashmap::DashMap;
use std::collections::BTreeMap;

/// A thin wrapper over `DashMap<u64, u64>`.
///
/// # Example
///
/// ```
/// use conmap::NativeConcurrentMap;
///
/// let map = NativeConcurrentMap::new();
/// map.put(9, 81);
/// assert_eq!(map.get(9), Some(81));
/// ```
pub struct NativeConcurrentMap {
    map: DashMap<Key, Value>,
    key_space: KeySpace,
}

impl NativeConcurrentMap {
    /// Creates an empty map accepting any key.
    pub fn new() -> Self {
        Self::init(MapConfig::default())
    }

    /// Creates a map from a configuration.
    pub fn init(config: MapConfig) -> Self {
        tracing::debug!(capacity = config.capacity, key_space = ?config.key_space, "creating native concurrent map");
        Self {
            map: DashMap::with_capacity(config.capacity),
            key_space: config.key_space,
        }
    }

    /// Returns the value stored for `key`.
    #[inline]
    pub fn get(&self, key: Key) -> Option<Value> {
        self.key_space.check(key);
        self.map.get(&key).map(|entry| *entry.value())
    }

    /// Stores `value` for `key`, replacing any previous value.
    #[inline]
    pub fn put(&self, key: Key, value: Value) {
        self.key_space.check(key);
        self.map.insert(key, value);
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for NativeConcurrentMap {
    fn default() -> Self {
        Self::new()
    }
}

impl IntMap for NativeConcurrentMap {
    fn get(&self, key: Key) -> Option<Value> {
        NativeConcurrentMap::get(self, key)
    }

    fn put(&mut self, key: Key, value: Value) {
        NativeConcurrentMap::put(self, key, value);
    }

    fn name(&self) -> &'static str {
        "native"
    }
}

impl ConcurrentIntMap for NativeConcurrentMap {
    fn put_shared(&self, key: Key, value: Value) {
        NativeConcurrentMap::put(self, key, value);
    }
}

impl MapMetrics for NativeConcurrentMap {
    fn metrics(&self) -> BTreeMap<String, f64> {
        // DashMap does not expose its shard layout; report it as one partition.
        CoreMapMetrics::new(self.len(), 1).to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "NativeConcurrent"
    }
}

impl core::fmt::Debug for NativeConcurrentMap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NativeConcurrentMap")
            .field("len", &self.len())
            .field("key_space", &self.key_space)
            .finish()
    }
}
