//! Stress Tests for Concurrent Maps
//!
//! These tests verify thread safety and correctness under high contention.

use conmap::config::{ActorMapConfig, ChainMapConfig, MapConfig, ShardedMapConfig};
use conmap::{
    ActorMap, ConcurrentIntMap, CopyOnWriteShardedMap, GlobalLockMap, IntMap, LockFreeChainMap,
    NativeConcurrentMap, ShardedLockMap, UnsharedMap,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

const NUM_THREADS: u64 = 8;
const KEYS_PER_THREAD: u64 = 2_000;

fn shared_maps() -> Vec<Arc<dyn ConcurrentIntMap>> {
    vec![
        Arc::new(GlobalLockMap::new()),
        Arc::new(ShardedLockMap::init(ShardedMapConfig::with_shards(16))),
        Arc::new(CopyOnWriteShardedMap::init(ShardedMapConfig::with_shards(16))),
        Arc::new(NativeConcurrentMap::new()),
        Arc::new(ActorMap::new()),
        // 256 buckets for 16000 keys keeps chains long and CASes contended.
        Arc::new(LockFreeChainMap::init(ChainMapConfig::new(256))),
    ]
}

/// N threads each put M disjoint keys; afterwards all N*M keys are present.
#[test]
fn stress_no_lost_puts() {
    for map in shared_maps() {
        let mut handles = Vec::new();
        for t in 0..NUM_THREADS {
            let map = Arc::clone(&map);
            handles.push(thread::spawn(move || {
                for i in 0..KEYS_PER_THREAD {
                    let key = i * NUM_THREADS + t;
                    map.put_shared(key, key ^ 0xABCD);
                }
            }));
        }
        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        for key in 0..NUM_THREADS * KEYS_PER_THREAD {
            assert_eq!(map.get(key), Some(key ^ 0xABCD), "{} lost key {key}", map.name());
        }
    }
}

/// Two writers race on one key; the survivor is one of the two values.
#[test]
fn stress_same_key_last_writer_wins() {
    const V1: u64 = 0x5555_5555_5555_5555;
    const V2: u64 = 0xAAAA_AAAA_AAAA_AAAA;

    for map in shared_maps() {
        let mut handles = Vec::new();
        for value in [V1, V2] {
            let map = Arc::clone(&map);
            handles.push(thread::spawn(move || {
                for _ in 0..5_000 {
                    map.put_shared(99, value);
                }
            }));
        }
        let reader = {
            let map = Arc::clone(&map);
            thread::spawn(move || {
                for _ in 0..5_000 {
                    if let Some(value) = map.get(99) {
                        assert!(value == V1 || value == V2, "torn value {value:#x}");
                    }
                }
            })
        };
        for handle in handles {
            handle.join().expect("Thread panicked");
        }
        reader.join().expect("Reader panicked");

        let value = map.get(99).expect("key written");
        assert!(value == V1 || value == V2, "{}: {value:#x}", map.name());
    }
}

/// Writers hammer a handful of keys while readers check every value is
/// one that was actually written for that key.
#[test]
fn stress_readers_never_see_foreign_values() {
    for map in shared_maps() {
        for key in 0..32 {
            map.put_shared(key, key);
        }
        let done = Arc::new(AtomicBool::new(false));

        let writers: Vec<_> = (0..4u64)
            .map(|t| {
                let map = Arc::clone(&map);
                thread::spawn(move || {
                    for round in 1..=500u64 {
                        for key in (t..32).step_by(4) {
                            map.put_shared(key, key + (round << 8));
                        }
                    }
                })
            })
            .collect();
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let map = Arc::clone(&map);
                let done = Arc::clone(&done);
                thread::spawn(move || {
                    while !done.load(Ordering::Relaxed) {
                        for key in 0..32 {
                            let value = map.get(key).expect("populated key vanished");
                            assert_eq!(value & 0xFF, key);
                        }
                    }
                })
            })
            .collect();

        for writer in writers {
            writer.join().expect("Writer panicked");
        }
        done.store(true, Ordering::Relaxed);
        for reader in readers {
            reader.join().expect("Reader panicked");
        }
        for key in 0..32 {
            assert_eq!(map.get(key), Some(key + (500 << 8)), "{}", map.name());
        }
    }
}

/// A reader racing a batch writer on one shard sees the whole batch or none of it.
#[test]
fn stress_cow_snapshot_is_all_or_nothing() {
    let map = Arc::new(CopyOnWriteShardedMap::init(ShardedMapConfig::with_shards(4)));
    // Keys 0, 4, 8, ... all live in shard 0.
    let keys: Vec<u64> = (0..64).map(|k| k * 4).collect();
    map.put_all(keys.iter().map(|&k| (k, 0)));

    let writer = {
        let map = Arc::clone(&map);
        let keys = keys.clone();
        thread::spawn(move || {
            for round in 1..=300u64 {
                map.put_all(keys.iter().map(|&k| (k, round)));
            }
        })
    };
    let reader = {
        let map = Arc::clone(&map);
        thread::spawn(move || {
            let mut last = 0;
            while last < 300 {
                let snapshot = map.snapshot_of(0);
                let round = snapshot.get(0).expect("populated");
                assert!(round >= last);
                for &key in &keys {
                    assert_eq!(snapshot.get(key), Some(round));
                }
                last = round;
            }
        })
    };
    writer.join().expect("Writer panicked");
    reader.join().expect("Reader panicked");
}

/// Test with various shard counts
#[test]
fn stress_shard_counts() {
    for shards in [1, 2, 4, 8, 16, 32] {
        let map = Arc::new(ShardedLockMap::init(ShardedMapConfig::with_shards(shards)));

        let mut handles = Vec::new();
        for t in 0..8u64 {
            let map = Arc::clone(&map);
            handles.push(thread::spawn(move || {
                for i in 0..1000 {
                    map.put(t * 1000 + i, i);
                    assert_eq!(map.get(t * 1000 + i), Some(i));
                }
            }));
        }

        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        assert_eq!(map.shard_count(), shards);
        assert_eq!(map.len(), 8000);
    }
}

/// Chain maps of every size, down to a single bucket.
#[test]
fn stress_chain_table_sizes() {
    for buckets in [1, 3, 64, 1000] {
        let map = Arc::new(LockFreeChainMap::init(ChainMapConfig::new(buckets)));
        let mut handles = Vec::new();
        for t in 0..4u64 {
            let map = Arc::clone(&map);
            handles.push(thread::spawn(move || {
                for i in 0..500 {
                    let key = t * 500 + i;
                    map.put(key, 1);
                    map.put(key, key);
                }
            }));
        }
        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        assert_eq!(map.len(), 2000);
        for key in 0..2000 {
            assert_eq!(map.get(key), Some(key));
        }
    }
}

// ============================================================================
// END-TO-END: 1,000,000 KEYS, 8 READERS
// ============================================================================

const E2E_KEYS: u64 = 1_000_000;
const E2E_READERS: u64 = 8;

/// Reads every key back with `E2E_READERS` threads, each taking one residue class.
fn read_back<M: IntMap + Sync + ?Sized>(map: &M) {
    thread::scope(|s| {
        for reader in 0..E2E_READERS {
            s.spawn(move || {
                let mut key = reader;
                while key < E2E_KEYS {
                    assert_eq!(map.get(key), Some(key), "{} at key {key}", map.name());
                    key += E2E_READERS;
                }
            });
        }
    });
}

fn populate<M: IntMap>(map: &mut M) {
    for i in 0..E2E_KEYS {
        map.put(i, i);
    }
}

fn e2e<M: IntMap + Sync>(mut map: M) {
    populate(&mut map);
    read_back(&map);
}

#[test]
fn e2e_million_keys_unshared() {
    e2e(UnsharedMap::init(MapConfig::with_capacity(E2E_KEYS as usize)));
}

#[test]
fn e2e_million_keys_global_lock() {
    e2e(GlobalLockMap::init(MapConfig::with_capacity(E2E_KEYS as usize)));
}

#[test]
fn e2e_million_keys_sharded() {
    e2e(ShardedLockMap::init(ShardedMapConfig {
        base: MapConfig::with_capacity(E2E_KEYS as usize),
        shards: 16,
    }));
}

#[test]
fn e2e_million_keys_copy_on_write() {
    // Every put copies its shard, so keep shards small.
    e2e(CopyOnWriteShardedMap::init(ShardedMapConfig::with_shards(4096)));
}

#[test]
fn e2e_million_keys_native() {
    e2e(NativeConcurrentMap::init(MapConfig::with_capacity(E2E_KEYS as usize)));
}

#[test]
fn e2e_million_keys_actor() {
    e2e(ActorMap::init(ActorMapConfig {
        base: MapConfig::with_capacity(E2E_KEYS as usize),
        queue_capacity: 4096,
    }));
}

#[test]
fn e2e_million_keys_chain() {
    e2e(LockFreeChainMap::init(ChainMapConfig::new(1_000_000)));
}

#[test]
fn e2e_million_keys_chain_with_collisions() {
    e2e(LockFreeChainMap::init(ChainMapConfig::new(256_000)));
}
