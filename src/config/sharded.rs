//! Configuration for the sharded maps.
//!
//! Both [`ShardedLockMap`](crate::ShardedLockMap) and
//! [`CopyOnWriteShardedMap`](crate::CopyOnWriteShardedMap) split the key space
//! into `shards` independent partitions selected by `key % shards`.
//!
//! # Sizing Guidelines
//!
//! More shards mean less contention between writers but a little more memory
//! per map. For the copy-on-write map the shard count also bounds the cost of
//! a single write, since every write copies one whole shard:
//!
//! ```text
//! copy cost per put ≈ entries / shards
//! ```

use super::{default_shard_count, MapConfig};
use crate::error::ConfigError;
use core::fmt;

/// Configuration for a map partitioned into independently synchronized shards.
///
/// # Fields
///
/// - `base`: Capacity hint (for the whole map, divided across shards) and key space.
/// - `shards`: Number of partitions. Must be greater than zero.
///
/// # Examples
///
/// ```
/// use conmap::config::{MapConfig, ShardedMapConfig};
/// use conmap::CopyOnWriteShardedMap;
///
/// let config = ShardedMapConfig {
///     base: MapConfig::with_capacity(1 << 20),
///     shards: 16,
/// };
/// let map = CopyOnWriteShardedMap::init(config);
/// assert_eq!(map.shard_count(), 16);
/// ```
#[derive(Clone, Copy)]
pub struct ShardedMapConfig {
    /// Capacity hint and key space for the whole map.
    pub base: MapConfig,
    /// Number of shards (more shards = less contention).
    pub shards: usize,
}

impl ShardedMapConfig {
    /// Creates a config with `shards` partitions and an unbounded key space.
    #[must_use]
    pub fn with_shards(shards: usize) -> Self {
        Self {
            base: MapConfig::default(),
            shards,
        }
    }

    /// Checks that the configuration describes a usable map.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroShards`] if `shards` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shards == 0 {
            return Err(ConfigError::ZeroShards);
        }
        Ok(())
    }

    /// Capacity hint for one shard.
    #[inline]
    pub fn shard_capacity(&self) -> usize {
        self.base.capacity / self.shards.max(1)
    }
}

impl Default for ShardedMapConfig {
    /// Uses [`default_shard_count`] shards.
    fn default() -> Self {
        Self::with_shards(default_shard_count())
    }
}

impl fmt::Debug for ShardedMapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedMapConfig")
            .field("base", &self.base)
            .field("shards", &self.shards)
            .finish()
    }
}
