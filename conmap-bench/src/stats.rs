// Result collection and reporting for map benchmarks

use crate::models::{CsvResultRow, MapKind, OpResult, Operation};
use std::collections::BTreeMap;
use std::path::Path;

/// Structural metrics captured for one map after its runs.
#[derive(Debug, Clone)]
pub struct MapSnapshot {
    pub algorithm: &'static str,
    pub metrics: BTreeMap<String, f64>,
}

/// Collects and reports results from benchmark runs
#[derive(Debug, Default)]
pub struct BenchReport {
    /// Timings in the order they were recorded
    results: Vec<OpResult>,
    /// Metrics per map, captured after its last run
    metrics: BTreeMap<MapKind, MapSnapshot>,
}

impl BenchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one timed run
    pub fn record(&mut self, result: OpResult) {
        self.results.push(result);
    }

    /// Record a map's structural metrics
    pub fn record_metrics(
        &mut self,
        map: MapKind,
        algorithm: &'static str,
        metrics: BTreeMap<String, f64>,
    ) {
        self.metrics.insert(map, MapSnapshot { algorithm, metrics });
    }

    pub fn results(&self) -> &[OpResult] {
        &self.results
    }

    pub fn metrics_for(&self, map: MapKind) -> Option<&MapSnapshot> {
        self.metrics.get(&map)
    }

    /// Print the timing table
    pub fn print_summary(&self) {
        println!("\nMap Benchmark Summary");
        println!("=====================");
        println!(
            "{:<14} {:<12} {:>8} {:>14} {:>12} {:>14}",
            "Map", "Operation", "Threads", "TotalOps", "ns/op", "Ops/sec"
        );
        println!("{}", "-".repeat(80));

        for result in &self.results {
            println!(
                "{:<14} {:<12} {:>8} {:>14} {:>12.1} {:>14.0}",
                result.map.as_str(),
                result.op.as_str(),
                result.threads,
                result.total_ops(),
                result.ns_per_op(),
                result.ops_per_sec()
            );
        }
    }

    /// Print a grid of ns/op with one row per map and one column per operation
    pub fn print_comparison(&self) {
        let ops = Operation::all();

        print!("\n{:<14}", "ns/op");
        for op in &ops {
            print!(" {:>12}", op.as_str());
        }
        println!();
        println!("{}", "-".repeat(14 + 13 * ops.len()));

        let mut maps: Vec<MapKind> = self.results.iter().map(|r| r.map).collect();
        maps.sort();
        maps.dedup();

        for map in maps {
            print!("{:<14}", map.as_str());
            for op in &ops {
                match self.results.iter().find(|r| r.map == map && r.op == *op) {
                    Some(result) => print!(" {:>12.1}", result.ns_per_op()),
                    None => print!(" {:>12}", "-"),
                }
            }
            println!();
        }
    }

    /// Print the structural metrics of every map
    pub fn print_metrics(&self) {
        println!("\nMap Metrics");
        println!("===========");
        for (map, snapshot) in &self.metrics {
            println!("{} ({})", map.as_str(), snapshot.algorithm);
            for (name, value) in &snapshot.metrics {
                println!("  {name:<20} {value:>14.2}");
            }
        }
    }

    /// Export results to a CSV file
    pub fn export_csv(&self, path: &Path) -> Result<(), std::io::Error> {
        let mut writer = csv::Writer::from_path(path)?;
        for result in &self.results {
            writer.serialize(CsvResultRow::from(result))?;
        }
        writer.flush()?;
        Ok(())
    }
}
