//! Single reader/writer lock around one hash map.
//!
//! `get` takes the lock in shared mode and `put` in exclusive mode. The lock
//! is held only for the map access itself. Readers proceed together; a writer
//! excludes everyone.
//!
//! ```text
//! ┌───────────────────────────────┐
//! │         GlobalLockMap         │
//! │  ┌─────────────────────────┐  │
//! │  │ RwLock<HashMap<u64,u64>>│  │  ◀── every get/put
//! │  └─────────────────────────┘  │
//! └───────────────────────────────┘
//! ```

use crate::config::MapConfig;
use crate::keyspace::KeySpace;
use crate::map::{ConcurrentIntMap, IntMap, Key, Value};
use crate::metrics::{CoreMapMetrics, MapMetrics};
use crate::HashMap;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// A hash map guarded by one `parking_lot::RwLock`.
///
/// All operations may block waiting for the lock; there is no timeout.
///
/// # Example
///
/// ```
/// use conmap::GlobalLockMap;
/// use std::sync::Arc;
/// use std::thread;
///
/// let map = Arc::new(GlobalLockMap::new());
/// let writer = {
///     let map = Arc::clone(&map);
///     thread::spawn(move || map.put(1, 100))
/// };
/// writer.join().unwrap();
/// assert_eq!(map.get(1), Some(100));
/// ```
pub struct GlobalLockMap {
    map: RwLock<HashMap<Key, Value>>,
    key_space: KeySpace,
}

impl GlobalLockMap {
    /// Creates an empty map accepting any key.
    pub fn new() -> Self {
        Self::init(MapConfig::default())
    }

    /// Creates a map from a configuration.
    pub fn init(config: MapConfig) -> Self {
        tracing::debug!(capacity = config.capacity, key_space = ?config.key_space, "creating global lock map");
        Self {
            map: RwLock::new(HashMap::with_capacity(config.capacity)),
            key_space: config.key_space,
        }
    }

    /// Returns the value stored for `key`, holding the read lock for the lookup only.
    #[inline]
    pub fn get(&self, key: Key) -> Option<Value> {
        self.key_space.check(key);
        self.map.read().get(&key).copied()
    }

    /// Stores `value` for `key`, holding the write lock for the insert only.
    #[inline]
    pub fn put(&self, key: Key, value: Value) {
        self.key_space.check(key);
        self.map.write().insert(key, value);
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }
}

impl Default for GlobalLockMap {
    fn default() -> Self {
        Self::new()
    }
}

impl IntMap for GlobalLockMap {
    fn get(&self, key: Key) -> Option<Value> {
        GlobalLockMap::get(self, key)
    }

    fn put(&mut self, key: Key, value: Value) {
        GlobalLockMap::put(self, key, value);
    }

    fn name(&self) -> &'static str {
        "lock"
    }
}

impl ConcurrentIntMap for GlobalLockMap {
    fn put_shared(&self, key: Key, value: Value) {
        GlobalLockMap::put(self, key, value);
    }
}

impl MapMetrics for GlobalLockMap {
    fn metrics(&self) -> BTreeMap<String, f64> {
        CoreMapMetrics::new(self.len(), 1).to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "GlobalLock"
    }
}

impl core::fmt::Debug for GlobalLockMap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GlobalLockMap")
            .field("len", &self.len())
            .field("key_space", &self.key_space)
            .finish()
    }
}
