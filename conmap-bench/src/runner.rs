//! Benchmark runner for map variants
//!
//! For every selected map the runner builds the map, populates the whole key
//! range with `put(i, i)`, optionally verifies the population from every
//! worker thread, and then times each applicable operation in turn.
//!
//! Maps are driven only through the public `IntMap` / `ConcurrentIntMap`
//! contract; the structural metrics printed afterwards come from
//! `MapMetrics`.
//!
//! Timed runs include spawning the worker threads. With the default
//! operation counts that cost is noise next to the loops themselves.

use std::collections::BTreeMap;
use std::hint::black_box;
use std::thread;
use std::time::{Duration, Instant};

use conmap::config::{ActorMapConfig, ChainMapConfig, MapConfig, ShardedMapConfig};
use conmap::{
    ActorMap, ConcurrentIntMap, CopyOnWriteShardedMap, GlobalLockMap, IntMap,
    LockFreeChainMap, MapMetrics, NativeConcurrentMap, ShardedLockMap, UnsharedMap, Value,
};

use crate::models::{BenchConfig, MapKind, OpResult, Operation};
use crate::stats::BenchReport;
use crate::workload::{XorShift, KEY_MASK};

/// Requested buckets for the collision-free chain map.
const CHAIN_BUCKETS: usize = 1_000_000;

/// Requested buckets for the chain map with about 4x collisions.
const CHAIN_COLLIDE_BUCKETS: usize = 256_000;

/// A map that can be shared by the workers and report metrics.
pub trait SharedBenchMap: ConcurrentIntMap + MapMetrics {}

impl<T: ConcurrentIntMap + MapMetrics> SharedBenchMap for T {}

/// Wrapper over every map the runner drives.
///
/// The unshared map keeps its own variant because it can only be written
/// through `&mut`.
pub enum MapInstance {
    Unshared(UnsharedMap),
    Shared(Box<dyn SharedBenchMap>),
}

impl MapInstance {
    /// Builds `kind` and fills it with `put(i, i)` for every key in range.
    pub fn build_populated(kind: MapKind, config: &BenchConfig) -> Result<Self, String> {
        let base = MapConfig::with_capacity(KEY_MASK as usize + 1);
        let sharded = || {
            let mut sharded = ShardedMapConfig {
                base,
                ..ShardedMapConfig::default()
            };
            if let Some(shards) = config.shards {
                sharded.shards = shards;
            }
            sharded
        };

        let instance = match kind {
            MapKind::Unshared => MapInstance::Unshared(populated(UnsharedMap::init(base))),
            MapKind::Lock => MapInstance::Shared(Box::new(populated(GlobalLockMap::init(base)))),
            MapKind::Shard => {
                let map = ShardedLockMap::try_init(sharded()).map_err(|e| e.to_string())?;
                MapInstance::Shared(Box::new(populated(map)))
            }
            MapKind::Cow => {
                let map = CopyOnWriteShardedMap::try_init(sharded()).map_err(|e| e.to_string())?;
                // One snapshot per shard instead of one per key.
                map.put_all((0..=KEY_MASK).map(|i| (i, i)));
                MapInstance::Shared(Box::new(map))
            }
            MapKind::Native => {
                MapInstance::Shared(Box::new(populated(NativeConcurrentMap::init(base))))
            }
            MapKind::Actor => {
                let mut actor = ActorMapConfig {
                    base,
                    ..ActorMapConfig::default()
                };
                if let Some(capacity) = config.queue_capacity {
                    actor.queue_capacity = capacity;
                }
                MapInstance::Shared(Box::new(populated(ActorMap::init(actor))))
            }
            MapKind::Chain | MapKind::ChainCollide => {
                let buckets = if kind == MapKind::Chain {
                    CHAIN_BUCKETS
                } else {
                    CHAIN_COLLIDE_BUCKETS
                };
                let map = LockFreeChainMap::try_init(ChainMapConfig::new(buckets))
                    .map_err(|e| e.to_string())?;
                MapInstance::Shared(Box::new(populated(map)))
            }
        };
        Ok(instance)
    }

    /// Structural metrics of the underlying map.
    pub fn metrics(&self) -> BTreeMap<String, f64> {
        match self {
            MapInstance::Unshared(map) => map.metrics(),
            MapInstance::Shared(map) => map.metrics(),
        }
    }

    /// Algorithm name of the underlying map.
    pub fn algorithm_name(&self) -> &'static str {
        match self {
            MapInstance::Unshared(map) => map.algorithm_name(),
            MapInstance::Shared(map) => map.algorithm_name(),
        }
    }

    /// Checks `get(i) == i` over the populated range from `threads` readers.
    pub fn verify(&self, threads: usize) -> Result<(), String> {
        match self {
            MapInstance::Unshared(map) => verify_population(map, threads),
            MapInstance::Shared(map) => verify_population(&**map, threads),
        }
    }

    /// Runs one timed operation.
    ///
    /// Returns `None` if the map cannot run `op`.
    pub fn run_op(&mut self, op: Operation, threads: usize, ops: u64) -> Option<Duration> {
        let threads = if op.is_multi() { threads } else { 1 };
        let elapsed = match (self, op) {
            (MapInstance::Unshared(map), Operation::Get) => {
                time_single(|rng| get_loop(&*map, ops, rng))
            }
            (MapInstance::Unshared(map), Operation::Put) => time_single(|rng| {
                put_loop(map, ops, rng);
                0
            }),
            (MapInstance::Unshared(map), Operation::PutGet) => {
                time_single(|rng| putget_loop(map, ops, rng))
            }
            (MapInstance::Unshared(map), Operation::MultiGet) => {
                let map = &*map;
                time_parallel(threads, |rng| get_loop(map, ops, rng))
            }
            (MapInstance::Unshared(_), Operation::MultiPut | Operation::MultiPutGet) => {
                return None;
            }
            (MapInstance::Shared(map), op) => {
                let map: &dyn SharedBenchMap = &**map;
                match op {
                    Operation::Get => time_single(|rng| get_loop(map, ops, rng)),
                    Operation::Put => time_single(|rng| {
                        shared_put_loop(map, ops, rng);
                        0
                    }),
                    Operation::PutGet => time_single(|rng| shared_putget_loop(map, ops, rng)),
                    Operation::MultiGet => time_parallel(threads, |rng| get_loop(map, ops, rng)),
                    Operation::MultiPut => time_parallel(threads, |rng| {
                        shared_put_loop(map, ops, rng);
                        0
                    }),
                    Operation::MultiPutGet => {
                        time_parallel(threads, |rng| shared_putget_loop(map, ops, rng))
                    }
                }
            }
        };
        Some(elapsed)
    }
}

fn populated<M: IntMap>(mut map: M) -> M {
    for i in 0..=KEY_MASK {
        map.put(i, i);
    }
    map
}

fn verify_population<M: IntMap + Sync + ?Sized>(map: &M, threads: usize) -> Result<(), String> {
    let failures: Vec<String> = thread::scope(|s| {
        let readers: Vec<_> = (0..threads.max(1))
            .map(|_| {
                s.spawn(move || {
                    (0..=KEY_MASK).find_map(|key| match map.get(key) {
                        Some(value) if value == key => None,
                        other => Some(format!("get({key}) returned {other:?}, expected {key}")),
                    })
                })
            })
            .collect();
        readers
            .into_iter()
            .filter_map(|reader| match reader.join() {
                Ok(failure) => failure,
                Err(_) => Some("verification reader panicked".to_string()),
            })
            .collect()
    });

    match failures.into_iter().next() {
        Some(failure) => Err(failure),
        None => Ok(()),
    }
}

#[inline]
fn get_loop<M: IntMap + ?Sized>(map: &M, ops: u64, rng: &mut XorShift) -> Value {
    let mut sum: Value = 0;
    for _ in 0..ops {
        sum = sum.wrapping_add(map.get_or_absent(rng.next_key()));
    }
    sum
}

#[inline]
fn put_loop<M: IntMap + ?Sized>(map: &mut M, ops: u64, rng: &mut XorShift) {
    for _ in 0..ops {
        let r = rng.next_value();
        map.put(r & KEY_MASK, r);
    }
}

#[inline]
fn putget_loop<M: IntMap + ?Sized>(map: &mut M, ops: u64, rng: &mut XorShift) -> Value {
    let mut sum: Value = 0;
    for _ in 0..ops {
        let r = rng.next_value();
        map.put(r & KEY_MASK, r);
        sum = sum.wrapping_add(map.get_or_absent(rng.next_key()));
    }
    sum
}

#[inline]
fn shared_put_loop<M: ConcurrentIntMap + ?Sized>(map: &M, ops: u64, rng: &mut XorShift) {
    for _ in 0..ops {
        let r = rng.next_value();
        map.put_shared(r & KEY_MASK, r);
    }
}

#[inline]
fn shared_putget_loop<M: ConcurrentIntMap + ?Sized>(map: &M, ops: u64, rng: &mut XorShift) -> Value {
    let mut sum: Value = 0;
    for _ in 0..ops {
        let r = rng.next_value();
        map.put_shared(r & KEY_MASK, r);
        sum = sum.wrapping_add(map.get_or_absent(rng.next_key()));
    }
    sum
}

fn time_single<F>(work: F) -> Duration
where
    F: FnOnce(&mut XorShift) -> Value,
{
    let mut rng = XorShift::from_entropy();
    let start = Instant::now();
    black_box(work(&mut rng));
    start.elapsed()
}

fn time_parallel<F>(threads: usize, work: F) -> Duration
where
    F: Fn(&mut XorShift) -> Value + Sync,
{
    let work = &work;
    let start = Instant::now();
    // A panicking worker propagates out of the scope.
    thread::scope(|s| {
        for _ in 0..threads {
            s.spawn(move || {
                let mut rng = XorShift::from_entropy();
                black_box(work(&mut rng));
            });
        }
    });
    start.elapsed()
}

/// Runs the benchmark matrix described by a [`BenchConfig`].
pub struct BenchRunner {
    config: BenchConfig,
}

impl BenchRunner {
    pub fn new(config: BenchConfig) -> Self {
        Self { config }
    }

    /// Runs every (map, operation) pair and collects the results.
    pub fn run(&self) -> Result<BenchReport, String> {
        if self.config.threads == 0 {
            return Err("thread count must be greater than zero".to_string());
        }

        let mut report = BenchReport::new();
        for &kind in &self.config.maps {
            println!("populating {kind}...");
            let populate_start = Instant::now();
            let mut instance = MapInstance::build_populated(kind, &self.config)
                .map_err(|err| format!("cannot build {kind}: {err}"))?;
            tracing::info!(
                map = %kind,
                keys = KEY_MASK + 1,
                elapsed = ?populate_start.elapsed(),
                "populated map"
            );

            if self.config.verify {
                instance
                    .verify(self.config.threads)
                    .map_err(|err| format!("{kind} failed verification: {err}"))?;
                tracing::info!(map = %kind, readers = self.config.threads, "verified population");
            }

            for op in Operation::for_map(kind) {
                let threads = self.config.threads;
                let Some(elapsed) = instance.run_op(op, threads, self.config.ops_per_thread) else {
                    continue;
                };
                let result = OpResult {
                    map: kind,
                    op,
                    threads: if op.is_multi() { self.config.threads } else { 1 },
                    ops_per_thread: self.config.ops_per_thread,
                    elapsed,
                };
                tracing::debug!(
                    map = %kind,
                    op = %op,
                    ns_per_op = result.ns_per_op(),
                    "finished run"
                );
                report.record(result);
            }

            report.record_metrics(kind, instance.algorithm_name(), instance.metrics());
        }
        Ok(report)
    }
}
