//! FlatDB Simulation CLI
//!
//! Run a mixed upsert / delete / compact / search workload in-process.
//!
//! Usage:
//!   cargo run --release --bin simulate -- --vectors 100000 --delete-fraction 0.2

use clap::Parser;
use flatdb::simulation::{SimulationConfig, SimulationRunner};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "flatdb-simulate")]
#[command(about = "Run FlatDB workload simulations")]
#[command(version)]
struct Args {
    /// Number of vectors to insert
    #[arg(long, default_value = "100000")]
    vectors: usize,

    /// Vector dimensions
    #[arg(long, default_value = "384")]
    dimensions: usize,

    /// Batch size for upserts
    #[arg(long, default_value = "1000")]
    batch_size: usize,

    /// Number of search queries to run
    #[arg(long, default_value = "1000")]
    search_queries: usize,

    /// Top-k results to retrieve
    #[arg(long, default_value = "10")]
    k: usize,

    /// Ceiling on results per query
    #[arg(long, default_value = "100")]
    max_top_k: usize,

    /// Fraction of each batch deleted after insertion (0.0 - 1.0)
    #[arg(long, default_value = "0.1")]
    delete_fraction: f64,

    /// Compact after this many batches (0 = only at the end)
    #[arg(long, default_value = "10")]
    compact_every: usize,

    /// RNG seed
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Enable verbose logging
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("flatdb={},simulate={}", log_level, log_level)),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SimulationConfig {
        vector_count: args.vectors,
        dimensions: args.dimensions,
        batch_size: args.batch_size,
        search_queries: args.search_queries,
        k: args.k,
        max_top_k: args.max_top_k,
        delete_fraction: args.delete_fraction,
        compact_every: args.compact_every,
        seed: args.seed,
    };

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                FLATDB WORKLOAD SIMULATION                    ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║ Vectors:              {:>10}                             ║", config.vector_count);
    println!("║ Dimensions:           {:>10}                             ║", config.dimensions);
    println!("║ Batch Size:           {:>10}                             ║", config.batch_size);
    println!("║ Search Queries:       {:>10}                             ║", config.search_queries);
    println!("║ Top-K:                {:>10}                             ║", config.k);
    println!("║ Delete Fraction:      {:>10.2}                             ║", config.delete_fraction);
    println!("║ Compact Every:        {:>10}                             ║", config.compact_every);
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let mut runner = SimulationRunner::new(config);
    let results = runner.run()?;

    results.print_summary();

    Ok(())
}
