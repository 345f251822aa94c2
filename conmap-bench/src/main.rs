use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use conmap_bench::models::{self, BenchConfig, MapKind};
use conmap_bench::runner::BenchRunner;

/// Concurrent map benchmark CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Maps to benchmark (unshared, lock, shard, cow, native, actor, chain, chain-collide)
    /// If not provided, all maps will be used
    #[arg(short, long, value_name = "MAPS", num_args = 1.., value_delimiter = ',')]
    maps: Option<Vec<String>>,

    /// Worker threads for the multi-threaded operations
    #[arg(short, long, default_value_t = models::DEFAULT_THREADS)]
    threads: usize,

    /// Operations per thread per timed run
    #[arg(short, long, default_value_t = models::DEFAULT_OPS_PER_THREAD)]
    ops: u64,

    /// Shard count for the shard and cow maps (default: based on CPU count)
    #[arg(long)]
    shards: Option<usize>,

    /// Request queue capacity for the actor map; 0 makes every send a rendezvous
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// After populating each map, read every key back from all worker threads
    #[arg(long)]
    verify: bool,

    /// Export results to CSV file
    #[arg(long, value_name = "PATH")]
    output_csv: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "conmap=info,conmap_bench=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = BenchConfig {
        maps: select_maps(args.maps.as_deref()),
        threads: args.threads,
        ops_per_thread: args.ops,
        shards: args.shards,
        queue_capacity: args.queue_capacity,
        verify: args.verify,
        output_csv: args.output_csv,
    };

    println!("Map Benchmark");
    println!("=============");
    println!(
        "Maps: {:?}",
        config.maps.iter().map(|m| m.as_str()).collect::<Vec<_>>()
    );
    println!("Worker threads: {}", config.threads);
    println!("Operations per thread: {}", config.ops_per_thread);
    if let Some(shards) = config.shards {
        println!("Shards: {shards}");
    }
    println!();

    run_benchmarks(config)
}

/// Parse map names, falling back to every map
fn select_maps(names: Option<&[String]>) -> Vec<MapKind> {
    let Some(names) = names.filter(|names| !names.is_empty()) else {
        return MapKind::all();
    };

    let mut selected = Vec::new();
    for name in names {
        match name.parse::<MapKind>() {
            Ok(kind) if !selected.contains(&kind) => selected.push(kind),
            Ok(_) => {}
            Err(err) => tracing::warn!(error = %err, "skipping map"),
        }
    }
    if selected.is_empty() {
        println!("No valid maps selected, using all available maps");
        MapKind::all()
    } else {
        selected
    }
}

/// Run the benchmarks with the given configuration
fn run_benchmarks(config: BenchConfig) -> Result<(), Box<dyn std::error::Error>> {
    let output_csv = config.output_csv.clone();
    let runner = BenchRunner::new(config);
    match runner.run() {
        Ok(report) => {
            report.print_summary();
            report.print_comparison();
            report.print_metrics();

            // Export to CSV if requested
            if let Some(csv_path) = output_csv {
                match report.export_csv(&csv_path) {
                    Ok(()) => println!("\nResults exported to: {}", csv_path.display()),
                    Err(e) => eprintln!("Failed to export CSV: {e}"),
                }
            }

            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "benchmark failed");
            Err(e.into())
        }
    }
}
