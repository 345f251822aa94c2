//! Configuration errors.
//!
//! Map operations themselves never fail; only building a map from an
//! invalid configuration does.

use thiserror::Error;

/// Reasons a map configuration is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A sharded map needs at least one shard.
    #[error("shard count must be greater than zero")]
    ZeroShards,

    /// A chained table needs at least one bucket.
    #[error("bucket count must be greater than zero")]
    ZeroBuckets,

    /// The requested bucket count cannot be rounded up to a power of two.
    #[error("bucket count {requested} cannot be rounded up to a power of two")]
    BucketOverflow {
        /// The bucket count that was asked for.
        requested: usize,
    },

    /// A bounded key space with limit zero accepts no keys.
    #[error("a bounded key space must accept at least one key")]
    ZeroKeySpace,
}
