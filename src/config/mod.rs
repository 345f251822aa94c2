//! Map Configuration Module
//!
//! This module provides configuration structures for every map variant.
//! Each map family has its own dedicated configuration struct with public fields.
//!
//! # Design Philosophy
//!
//! Configuration structs have all public fields for simple instantiation:
//!
//! - **Simple**: Just create the struct with all fields set, or start from `Default`
//! - **Checked once**: `validate()` runs when a map is built, never on the hot path
//! - **No hidden reduction**: keys are never folded into range; see [`KeySpace`]
//!
//! # Configs
//!
//! | Config | Maps | Description |
//! |--------|------|-------------|
//! | `MapConfig` | [`UnsharedMap`](crate::UnsharedMap), [`GlobalLockMap`](crate::GlobalLockMap), [`NativeConcurrentMap`](crate::NativeConcurrentMap) | Capacity hint and key space |
//! | `ShardedMapConfig` | [`ShardedLockMap`](crate::ShardedLockMap), [`CopyOnWriteShardedMap`](crate::CopyOnWriteShardedMap) | Adds the shard count |
//! | `ChainMapConfig` | [`LockFreeChainMap`](crate::LockFreeChainMap) | Requested bucket count |
//! | `ActorMapConfig` | [`ActorMap`](crate::ActorMap) | Adds the request queue capacity |
//!
//! # Examples
//!
//! ```
//! use conmap::config::{ChainMapConfig, ShardedMapConfig};
//! use conmap::{KeySpace, LockFreeChainMap, ShardedLockMap};
//!
//! // 256000 requested buckets become 262144
//! let chain = LockFreeChainMap::init(ChainMapConfig::new(256_000));
//! assert_eq!(chain.bucket_count(), 262_144);
//!
//! let mut config = ShardedMapConfig::default();
//! config.shards = 32;
//! config.base.key_space = KeySpace::Bounded(500_000);
//! let sharded = ShardedLockMap::init(config);
//! assert_eq!(sharded.shard_count(), 32);
//! ```

use crate::keyspace::KeySpace;
use core::fmt;

pub mod actor;
pub mod chain;
pub mod sharded;

pub use actor::ActorMapConfig;
pub use chain::ChainMapConfig;
pub use sharded::ShardedMapConfig;

/// Returns the default number of shards based on available parallelism.
///
/// The value is clamped to `4..=64`; 16 if parallelism is unknown.
pub fn default_shard_count() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(16)
        .clamp(4, 64)
}

/// Base configuration shared by the hash-map backed variants.
///
/// # Fields
///
/// - `capacity`: Number of entries to pre-size for. Only a hint; maps grow
///   past it freely.
/// - `key_space`: Which keys are accepted. See [`KeySpace`].
#[derive(Clone, Copy, Default)]
pub struct MapConfig {
    /// Number of entries to reserve room for up front.
    pub capacity: usize,
    /// Accepted keys; out-of-range keys panic.
    pub key_space: KeySpace,
}

impl MapConfig {
    /// Creates a config that pre-sizes for `capacity` entries and accepts any key.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            key_space: KeySpace::Unbounded,
        }
    }

    /// Restricts the accepted keys.
    #[must_use]
    pub fn with_key_space(mut self, key_space: KeySpace) -> Self {
        self.key_space = key_space;
        self
    }
}

impl fmt::Debug for MapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapConfig")
            .field("capacity", &self.capacity)
            .field("key_space", &self.key_space)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_config_default() {
        let config = MapConfig::default();
        assert_eq!(config.capacity, 0);
        assert_eq!(config.key_space, KeySpace::Unbounded);
    }

    #[test]
    fn test_map_config_builder() {
        let config = MapConfig::with_capacity(1024).with_key_space(KeySpace::Bounded(10));
        assert_eq!(config.capacity, 1024);
        assert_eq!(config.key_space, KeySpace::Bounded(10));
    }

    #[test]
    fn test_default_shard_count_bounds() {
        let shards = default_shard_count();
        assert!((4..=64).contains(&shards));
    }
}
