//! Key-space policy shared by every map.
//!
//! No map ever rewrites a key before storing it. A key selects a bucket or a
//! shard, and that is all. When a map is built with a bounded key space,
//! out-of-range keys are rejected with a panic instead of being wrapped into
//! range, so a benchmark can never silently fold two keys onto one entry.

use crate::error::ConfigError;
use crate::map::Key;
use core::fmt;

/// Which keys a map accepts.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub enum KeySpace {
    /// Any `u64` is a valid key.
    #[default]
    Unbounded,
    /// Only keys strictly below the limit are valid.
    Bounded(Key),
}

impl KeySpace {
    /// Creates a bounded key space accepting `0..limit`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroKeySpace`] when `limit` is zero, since such a
    /// map could never hold anything.
    pub fn bounded(limit: Key) -> Result<Self, ConfigError> {
        if limit == 0 {
            return Err(ConfigError::ZeroKeySpace);
        }
        Ok(KeySpace::Bounded(limit))
    }

    /// Returns `true` if `key` is inside the key space.
    #[inline]
    pub fn contains(&self, key: Key) -> bool {
        match *self {
            KeySpace::Unbounded => true,
            KeySpace::Bounded(limit) => key < limit,
        }
    }

    /// Validates `key` before it reaches a map.
    ///
    /// # Panics
    ///
    /// Panics if the key is outside a bounded key space. Callers own this
    /// precondition; the maps do not treat it as a recoverable error.
    #[inline]
    #[track_caller]
    pub fn check(&self, key: Key) {
        if let KeySpace::Bounded(limit) = *self {
            assert!(key < limit, "key {key} is outside the key space 0..{limit}");
        }
    }

    /// Returns the exclusive upper bound, if any.
    #[inline]
    pub fn limit(&self) -> Option<Key> {
        match *self {
            KeySpace::Unbounded => None,
            KeySpace::Bounded(limit) => Some(limit),
        }
    }
}

impl fmt::Debug for KeySpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySpace::Unbounded => f.write_str("Unbounded"),
            KeySpace::Bounded(limit) => write!(f, "Bounded(0..{limit})"),
        }
    }
}
