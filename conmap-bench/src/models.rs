// Data models for map benchmarks

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default number of worker threads for the multi-threaded operations.
pub const DEFAULT_THREADS: usize = 8;

/// Default number of operations each worker performs per timed run.
pub const DEFAULT_OPS_PER_THREAD: u64 = 100_000;

/// Map variants the driver knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MapKind {
    Unshared,
    Lock,
    Shard,
    Cow,
    Native,
    Actor,
    /// Chain map with 1000000 requested buckets, so no collisions.
    Chain,
    /// Chain map with 256000 requested buckets, so about 4x collisions.
    ChainCollide,
}

impl MapKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MapKind::Unshared => "unshared",
            MapKind::Lock => "lock",
            MapKind::Shard => "shard",
            MapKind::Cow => "cow",
            MapKind::Native => "native",
            MapKind::Actor => "actor",
            MapKind::Chain => "chain",
            MapKind::ChainCollide => "chain-collide",
        }
    }

    /// Whether several threads may `put` at once.
    pub fn supports_shared_writes(&self) -> bool {
        !matches!(self, MapKind::Unshared)
    }

    /// Get all available maps
    pub fn all() -> Vec<MapKind> {
        vec![
            MapKind::Unshared,
            MapKind::Lock,
            MapKind::Shard,
            MapKind::Cow,
            MapKind::Native,
            MapKind::Actor,
            MapKind::Chain,
            MapKind::ChainCollide,
        ]
    }
}

impl fmt::Display for MapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MapKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        MapKind::all()
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| format!("unknown map '{s}'"))
    }
}

/// Timed operations, in the order they are run for each map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    /// Random gets from one thread.
    Get,
    /// Random puts from one thread.
    Put,
    /// Alternating random put and get from one thread.
    PutGet,
    /// Random gets from every worker thread.
    MultiGet,
    /// Random puts from every worker thread.
    MultiPut,
    /// Alternating puts and gets from every worker thread.
    MultiPutGet,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Get => "get",
            Operation::Put => "put",
            Operation::PutGet => "putget",
            Operation::MultiGet => "multiget",
            Operation::MultiPut => "multiput",
            Operation::MultiPutGet => "multiputget",
        }
    }

    /// Whether the operation runs on every worker thread.
    pub fn is_multi(&self) -> bool {
        matches!(
            self,
            Operation::MultiGet | Operation::MultiPut | Operation::MultiPutGet
        )
    }

    /// Whether several threads write at once.
    pub fn needs_shared_writes(&self) -> bool {
        matches!(self, Operation::MultiPut | Operation::MultiPutGet)
    }

    /// The operations that apply to `kind`.
    pub fn for_map(kind: MapKind) -> Vec<Operation> {
        Operation::all()
            .into_iter()
            .filter(|op| kind.supports_shared_writes() || !op.needs_shared_writes())
            .collect()
    }

    /// Get all operations
    pub fn all() -> Vec<Operation> {
        vec![
            Operation::Get,
            Operation::Put,
            Operation::PutGet,
            Operation::MultiGet,
            Operation::MultiPut,
            Operation::MultiPutGet,
        ]
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for a benchmark run
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Maps to benchmark, in order
    pub maps: Vec<MapKind>,
    /// Worker threads for the multi-threaded operations
    pub threads: usize,
    /// Operations per thread per timed run
    pub ops_per_thread: u64,
    /// Shard count for sharded maps (None = library default)
    pub shards: Option<usize>,
    /// Request queue capacity for the actor map (None = library default)
    pub queue_capacity: Option<usize>,
    /// Read back the populated range from every worker before timing
    pub verify: bool,
    /// Where to write CSV results, if anywhere
    pub output_csv: Option<PathBuf>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            maps: MapKind::all(),
            threads: DEFAULT_THREADS,
            ops_per_thread: DEFAULT_OPS_PER_THREAD,
            shards: None,
            queue_capacity: None,
            verify: false,
            output_csv: None,
        }
    }
}

/// Timing of one (map, operation) run
#[derive(Debug, Clone)]
pub struct OpResult {
    pub map: MapKind,
    pub op: Operation,
    /// Threads that performed the operation
    pub threads: usize,
    /// Operations performed by each thread
    pub ops_per_thread: u64,
    /// Wall-clock time of the whole run
    pub elapsed: Duration,
}

impl OpResult {
    /// Operations across all threads.
    pub fn total_ops(&self) -> u64 {
        self.ops_per_thread * self.threads as u64
    }

    /// Wall-clock nanoseconds per iteration of one thread's loop.
    ///
    /// With several threads this is the time for all of them to complete one
    /// operation each, which is how parallel results compare against the
    /// single-threaded ones.
    pub fn ns_per_op(&self) -> f64 {
        if self.ops_per_thread > 0 {
            self.elapsed.as_nanos() as f64 / self.ops_per_thread as f64
        } else {
            0.0
        }
    }

    /// Total operations per second across all threads.
    pub fn ops_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total_ops() as f64 / secs
        } else {
            0.0
        }
    }
}

/// CSV export row for benchmark results
#[derive(Debug, Serialize)]
pub struct CsvResultRow {
    pub map: String,
    pub operation: String,
    pub threads: usize,
    pub ops_per_thread: u64,
    pub total_ops: u64,
    pub elapsed_ns: u64,
    pub ns_per_op: f64,
    pub ops_per_sec: f64,
}

impl From<&OpResult> for CsvResultRow {
    fn from(result: &OpResult) -> Self {
        Self {
            map: result.map.as_str().to_string(),
            operation: result.op.as_str().to_string(),
            threads: result.threads,
            ops_per_thread: result.ops_per_thread,
            total_ops: result.total_ops(),
            elapsed_ns: u64::try_from(result.elapsed.as_nanos()).unwrap_or(u64::MAX),
            ns_per_op: result.ns_per_op(),
            ops_per_sec: result.ops_per_sec(),
        }
    }
}
