//! Map Metrics System
//!
//! Provides BTreeMap-based structural metrics for every map variant. Each
//! variant reports the core metrics below plus whatever describes its own
//! concurrency strategy (shard counts, CAS failures, published snapshots, ...).
//!
//! # Why BTreeMap over HashMap?
//!
//! - **Deterministic ordering**: Metrics always appear in consistent order
//! - **Reproducible output**: Benchmark reports can be diffed run to run
//! - **Stable serialization**: CSV exports have predictable column ordering
//!
//! Metrics are computed on demand. Nothing here is touched by `get`; the few
//! counters that are updated on write paths are relaxed atomics.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics every map reports.
#[derive(Debug, Default, Clone)]
pub struct CoreMapMetrics {
    /// Number of distinct keys currently stored.
    pub entries: u64,

    /// Number of independently synchronized partitions (shards, buckets, or 1).
    pub partitions: u64,
}

impl CoreMapMetrics {
    /// Creates core metrics for a map holding `entries` keys across `partitions` partitions.
    pub fn new(entries: usize, partitions: usize) -> Self {
        Self {
            entries: entries as u64,
            partitions: partitions as u64,
        }
    }

    /// Average number of entries per partition, or 0.0 for a map without partitions.
    pub fn load_factor(&self) -> f64 {
        if self.partitions > 0 {
            self.entries as f64 / self.partitions as f64
        } else {
            0.0
        }
    }

    /// Convert core metrics to a BTreeMap for reporting.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();
        metrics.insert("entries".to_string(), self.entries as f64);
        metrics.insert("partitions".to_string(), self.partitions as f64);
        metrics.insert("load_factor".to_string(), self.load_factor());
        metrics
    }
}

/// Trait that all map variants implement for metrics reporting.
///
/// The benchmark driver uses it to print a structural summary next to the
/// timing results without depending on any map's internals.
pub trait MapMetrics {
    /// Returns all metrics as key-value pairs in deterministic order.
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Algorithm name for identification (e.g. "LockFreeChain").
    fn algorithm_name(&self) -> &'static str;
}

/// A monotonically increasing event counter shared between threads.
///
/// Uses relaxed ordering: the count is statistics, never synchronization.
#[derive(Debug, Default)]
pub struct EventCounter(AtomicU64);

impl EventCounter {
    /// Creates a counter starting at zero.
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Records one event.
    #[inline]
    pub fn incr(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Current count.
    #[inline]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_metrics_btreemap() {
        let metrics = CoreMapMetrics::new(100, 4).to_btreemap();
        assert_eq!(metrics.get("entries"), Some(&100.0));
        assert_eq!(metrics.get("partitions"), Some(&4.0));
        assert_eq!(metrics.get("load_factor"), Some(&25.0));
    }

    #[test]
    fn test_load_factor_without_partitions() {
        assert_eq!(CoreMapMetrics::new(10, 0).load_factor(), 0.0);
    }

    #[test]
    fn test_deterministic_key_order() {
        let keys: Vec<_> = CoreMapMetrics::new(1, 1)
            .to_btreemap()
            .into_keys()
            .collect();
        assert_eq!(keys, vec!["entries", "load_factor", "partitions"]);
    }

    #[test]
    fn test_event_counter_across_threads() {
        let counter = EventCounter::new();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        counter.incr();
                    }
                });
            }
        });
        assert_eq!(counter.get(), 4000);
    }
}
