//! The shared map contract.
//!
//! Every map in this crate stores integer values under integer keys and
//! differs from the others only in how it deals with concurrent access.
//! Benchmark drivers and tests are written against the two traits below
//! and never look at the structure behind them.
//!
//! # Absent Keys
//!
//! [`IntMap::get`] reports a missing key as `None`, so a stored `0` is never
//! confused with "nothing stored". Drivers that still want the historical
//! zero sentinel can use [`IntMap::get_or_absent`].
//!
//! # Single-Threaded vs Shared Writers
//!
//! ```text
//! ┌──────────────────────────┐        ┌──────────────────────────────┐
//! │         IntMap           │◀───────│      ConcurrentIntMap        │
//! │  get(&self)              │        │  put_shared(&self)           │
//! │  put(&mut self)          │        │  Send + Sync                 │
//! └──────────────────────────┘        └──────────────────────────────┘
//!      UnsharedMap only                 every other variant
//! ```
//!
//! Writing through `&mut self` means an unsynchronized map can never be
//! written from two threads: the borrow checker rejects it. Reads through a
//! shared reference stay available for all maps.

/// Key type accepted by every map.
pub type Key = u64;

/// Value type stored by every map.
pub type Value = u64;

/// The value reported by [`IntMap::get_or_absent`] for keys that were never stored.
///
/// It is indistinguishable from a stored `0`; prefer [`IntMap::get`].
pub const ABSENT: Value = 0;

/// The capability shared by all map variants.
pub trait IntMap {
    /// Returns the most recently published value for `key`, or `None` if the
    /// key was never stored.
    fn get(&self, key: Key) -> Option<Value>;

    /// Installs `value` for `key`, replacing any previous value.
    fn put(&mut self, key: Key, value: Value);

    /// Short, stable name of the variant (e.g. `"chain"`).
    fn name(&self) -> &'static str;

    /// Like [`get`](Self::get) but reports a missing key as [`ABSENT`].
    #[inline]
    fn get_or_absent(&self, key: Key) -> Value {
        self.get(key).unwrap_or(ABSENT)
    }
}

/// A map whose writers may run on many threads at once.
///
/// All variants except [`UnsharedMap`](crate::UnsharedMap) implement this.
pub trait ConcurrentIntMap: IntMap + Send + Sync {
    /// Installs `value` for `key` through a shared reference.
    ///
    /// Operations on the same key are totally ordered by their publish point
    /// (lock release, successful CAS, or actor processing order).
    fn put_shared(&self, key: Key, value: Value);
}
