//! Correctness Tests for the Map Contract
//!
//! This module validates the `Get`/`Put` contract that every variant shares,
//! using small deterministic sequences from a single thread.
//!
//! ## Test Strategy
//! - Every check runs against all seven variants through `IntMap`
//! - Absent keys, overwrites, a stored zero, and unreduced keys
//! - Bounded key spaces reject out-of-range keys in every variant

use conmap::config::{ActorMapConfig, ChainMapConfig, MapConfig, ShardedMapConfig};
use conmap::{
    ActorMap, ConcurrentIntMap, CopyOnWriteShardedMap, GlobalLockMap, IntMap, KeySpace,
    LockFreeChainMap, NativeConcurrentMap, ShardedLockMap, UnsharedMap, ABSENT,
};
use std::panic::{catch_unwind, AssertUnwindSafe};

// ============================================================================
// HELPER FUNCTIONS FOR MAP CREATION
// ============================================================================

/// Every variant, built with `key_space`.
fn all_maps(key_space: KeySpace) -> Vec<Box<dyn IntMap>> {
    let base = MapConfig::default().with_key_space(key_space);
    let sharded = ShardedMapConfig { base, shards: 8 };
    vec![
        Box::new(UnsharedMap::init(base)),
        Box::new(GlobalLockMap::init(base)),
        Box::new(ShardedLockMap::init(sharded)),
        Box::new(CopyOnWriteShardedMap::init(sharded)),
        Box::new(NativeConcurrentMap::init(base)),
        Box::new(ActorMap::init(ActorMapConfig {
            base,
            queue_capacity: 16,
        })),
        Box::new(LockFreeChainMap::init(
            ChainMapConfig::new(64).with_key_space(key_space),
        )),
    ]
}

/// Every variant that supports concurrent writers.
fn shared_maps() -> Vec<Box<dyn ConcurrentIntMap>> {
    vec![
        Box::new(GlobalLockMap::new()),
        Box::new(ShardedLockMap::init(ShardedMapConfig::with_shards(4))),
        Box::new(CopyOnWriteShardedMap::init(ShardedMapConfig::with_shards(4))),
        Box::new(NativeConcurrentMap::new()),
        Box::new(ActorMap::new()),
        Box::new(LockFreeChainMap::init(ChainMapConfig::new(16))),
    ]
}

// ============================================================================
// CONTRACT TESTS
// ============================================================================

#[test]
fn test_names_are_distinct() {
    let mut names: Vec<_> = all_maps(KeySpace::Unbounded)
        .iter()
        .map(|map| map.name())
        .collect();
    names.sort_unstable();
    assert_eq!(
        names,
        vec!["actor", "chain", "cow", "lock", "native", "shard", "unshared"]
    );
}

#[test]
fn test_never_written_key_is_absent() {
    for map in all_maps(KeySpace::Unbounded) {
        assert_eq!(map.get(0), None, "{}", map.name());
        assert_eq!(map.get(12345), None, "{}", map.name());
        assert_eq!(map.get_or_absent(12345), ABSENT, "{}", map.name());
    }
}

#[test]
fn test_put_then_get() {
    for mut map in all_maps(KeySpace::Unbounded) {
        for key in 0..200 {
            map.put(key, key * 3 + 1);
        }
        for key in 0..200 {
            assert_eq!(map.get(key), Some(key * 3 + 1), "{}", map.name());
        }
        assert_eq!(map.get(200), None, "{}", map.name());
    }
}

#[test]
fn test_last_writer_wins() {
    for mut map in all_maps(KeySpace::Unbounded) {
        map.put(7, 1);
        map.put(7, 2);
        map.put(7, 3);
        assert_eq!(map.get(7), Some(3), "{}", map.name());
        // Writing the current value again changes nothing.
        map.put(7, 3);
        assert_eq!(map.get(7), Some(3), "{}", map.name());
    }
}

#[test]
fn test_stored_zero_is_distinguishable_from_absent() {
    for mut map in all_maps(KeySpace::Unbounded) {
        map.put(5, 0);
        assert_eq!(map.get(5), Some(0), "{}", map.name());
        assert_eq!(map.get(6), None, "{}", map.name());
        assert_eq!(map.get_or_absent(5), ABSENT, "{}", map.name());
    }
}

#[test]
fn test_keys_are_never_reduced() {
    // 3, 3 + 64, 3 + 500000 and 3 + 2^20 share a bucket or shard in several
    // variants, and must still be separate entries.
    let keys = [3u64, 3 + 64, 3 + 500_000, 3 + (1 << 20), u64::MAX];
    for mut map in all_maps(KeySpace::Unbounded) {
        for (i, &key) in keys.iter().enumerate() {
            map.put(key, i as u64 + 100);
        }
        for (i, &key) in keys.iter().enumerate() {
            assert_eq!(map.get(key), Some(i as u64 + 100), "{}", map.name());
        }
    }
}

#[test]
fn test_bounded_key_space_accepts_keys_below_limit() {
    for mut map in all_maps(KeySpace::Bounded(100)) {
        map.put(0, 1);
        map.put(99, 2);
        assert_eq!(map.get(0), Some(1), "{}", map.name());
        assert_eq!(map.get(99), Some(2), "{}", map.name());
    }
}

#[test]
fn test_bounded_key_space_rejects_out_of_range_keys() {
    for mut map in all_maps(KeySpace::Bounded(100)) {
        let name = map.name();
        let get = catch_unwind(AssertUnwindSafe(|| map.get(100)));
        assert!(get.is_err(), "{name} accepted get(100)");
        let put = catch_unwind(AssertUnwindSafe(|| map.put(1_000, 1)));
        assert!(put.is_err(), "{name} accepted put(1000)");
        // The map keeps working after rejecting a key.
        map.put(1, 1);
        assert_eq!(map.get(1), Some(1), "{name}");
    }
}

#[test]
fn test_put_shared_matches_put() {
    for map in shared_maps() {
        for key in 0..100 {
            map.put_shared(key, key + 1);
        }
        for key in 0..100 {
            assert_eq!(map.get(key), Some(key + 1), "{}", map.name());
        }
    }
}

#[test]
fn test_zero_key_space_is_rejected() {
    assert!(KeySpace::bounded(0).is_err());
    assert_eq!(KeySpace::bounded(10), Ok(KeySpace::Bounded(10)));
}
