//! Configuration for the lock-free chained map.
//!
//! The table has a fixed number of buckets chosen at construction. The
//! requested count is rounded up to the next power of two so a bucket index
//! is a single mask (`key & (size - 1)`).
//!
//! | Requested | Buckets | Mask |
//! |-----------|---------|------|
//! | 256000 | 262144 | 262143 |
//! | 1000000 | 1048576 | 1048575 |

use crate::error::ConfigError;
use crate::keyspace::KeySpace;
use core::fmt;

/// Bucket count requested by [`ChainMapConfig::default`].
pub const DEFAULT_BUCKETS: usize = 1_000_000;

/// Configuration for a [`LockFreeChainMap`](crate::LockFreeChainMap).
///
/// # Fields
///
/// - `buckets`: Requested table size. Rounded up to a power of two.
/// - `key_space`: Which keys are accepted.
///
/// # Examples
///
/// ```
/// use conmap::config::ChainMapConfig;
///
/// let config = ChainMapConfig::new(1_000_000);
/// assert_eq!(config.table_size(), Ok(1_048_576));
/// ```
#[derive(Clone, Copy)]
pub struct ChainMapConfig {
    /// Requested number of buckets.
    pub buckets: usize,
    /// Accepted keys; out-of-range keys panic.
    pub key_space: KeySpace,
}

impl ChainMapConfig {
    /// Creates a config for a table of at least `buckets` buckets.
    #[must_use]
    pub fn new(buckets: usize) -> Self {
        Self {
            buckets,
            key_space: KeySpace::Unbounded,
        }
    }

    /// Restricts the accepted keys.
    #[must_use]
    pub fn with_key_space(mut self, key_space: KeySpace) -> Self {
        self.key_space = key_space;
        self
    }

    /// Returns the effective number of buckets.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ZeroBuckets`] if no buckets were requested.
    /// - [`ConfigError::BucketOverflow`] if the next power of two does not fit in `usize`.
    pub fn table_size(&self) -> Result<usize, ConfigError> {
        if self.buckets == 0 {
            return Err(ConfigError::ZeroBuckets);
        }
        self.buckets
            .checked_next_power_of_two()
            .ok_or(ConfigError::BucketOverflow {
                requested: self.buckets,
            })
    }

    /// Checks that the configuration describes a usable table.
    ///
    /// # Errors
    ///
    /// See [`table_size`](Self::table_size).
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.table_size().map(|_| ())
    }
}

impl Default for ChainMapConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BUCKETS)
    }
}

impl fmt::Debug for ChainMapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainMapConfig")
            .field("buckets", &self.buckets)
            .field("key_space", &self.key_space)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_up_to_power_of_two() {
        assert_eq!(ChainMapConfig::new(256_000).table_size(), Ok(262_144));
        assert_eq!(ChainMapConfig::new(1_000_000).table_size(), Ok(1_048_576));
        assert_eq!(ChainMapConfig::new(1).table_size(), Ok(1));
        assert_eq!(ChainMapConfig::new(1024).table_size(), Ok(1024));
    }

    #[test]
    fn test_default_is_one_million_buckets() {
        let config = ChainMapConfig::default();
        assert_eq!(config.buckets, DEFAULT_BUCKETS);
        assert_eq!(config.table_size(), Ok(1 << 20));
    }

    #[test]
    fn test_zero_buckets_rejected() {
        assert_eq!(
            ChainMapConfig::new(0).validate(),
            Err(ConfigError::ZeroBuckets)
        );
    }

    #[test]
    fn test_overflow_rejected() {
        let requested = usize::MAX;
        assert_eq!(
            ChainMapConfig::new(requested).table_size(),
            Err(ConfigError::BucketOverflow { requested })
        );
    }
}
