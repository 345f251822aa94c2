//! Unsynchronized baseline map.
//!
//! A plain hash map with no synchronization at all. It is the reference point
//! every other variant is measured against.
//!
//! Writing needs `&mut self`, so the map can only be written by whoever owns
//! it exclusively; sharing it across threads for concurrent writes does not
//! compile. Once populated, any number of threads may read it through a
//! shared reference.

use crate::config::MapConfig;
use crate::keyspace::KeySpace;
use crate::map::{IntMap, Key, Value};
use crate::metrics::{CoreMapMetrics, MapMetrics};
use crate::HashMap;
use std::collections::BTreeMap;

/// A plain hash map for single-threaded writers.
///
/// # Example
///
/// ```
/// use conmap::{IntMap, UnsharedMap};
///
/// let mut map = UnsharedMap::new();
/// map.put(1, 10);
/// assert_eq!(map.get(1), Some(10));
/// assert_eq!(map.get(2), None);
/// ```
pub struct UnsharedMap {
    map: HashMap<Key, Value>,
    key_space: KeySpace,
}

impl UnsharedMap {
    /// Creates an empty map accepting any key.
    pub fn new() -> Self {
        Self::init(MapConfig::default())
    }

    /// Creates a map from a configuration.
    pub fn init(config: MapConfig) -> Self {
        tracing::debug!(capacity = config.capacity, key_space = ?config.key_space, "creating unshared map");
        Self {
            map: HashMap::with_capacity(config.capacity),
            key_space: config.key_space,
        }
    }

    /// Returns the value stored for `key`.
    #[inline]
    pub fn get(&self, key: Key) -> Option<Value> {
        self.key_space.check(key);
        self.map.get(&key).copied()
    }

    /// Stores `value` for `key`, replacing any previous value.
    #[inline]
    pub fn put(&mut self, key: Key, value: Value) {
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

impl Default for UnsharedMap {
    fn default() -> Self {
        Self::new()
    }
}

impl IntMap for UnsharedMap {
    fn get(&self, key: Key) -> Option<Value> {
        UnsharedMap::get(self, key)
    }

    fn put(&mut self, key: Key, value: Value) {
        UnsharedMap::put(self, key, value);
    }

    fn name(&self) -> &'static str {
        "unshared"
    }
}

impl MapMetrics for UnsharedMap {
    fn metrics(&self) -> BTreeMap<String, f64> {
        CoreMapMetrics::new(self.len(), 1).to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "Unshared"
    }
}

impl core::fmt::Debug for UnsharedMap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UnsharedMap")
            .field("len", &self.len())
            .field("key_space", &self.key_space)
            .finish()
    }
}
