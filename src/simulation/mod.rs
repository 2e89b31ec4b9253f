//! Workload simulation for FlatDB
//!
//! Drives a single engine through a mixed workload:
//! - Batched upserts of random vectors
//! - Deletes of a fraction of each batch
//! - Periodic compaction
//! - Search queries, checked against the set of deleted ids
//!
//! and reports per-operation latency percentiles.

use crate::config::EngineConfig;
use crate::engine::{IndexEngine, UpsertItem};
use crate::error::Result;
use crate::vectors::math;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::info;

/// Configuration for simulation
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Number of vectors to insert
    pub vector_count: usize,
    /// Vector dimensions
    pub dimensions: usize,
    /// Batch size for upserts
    pub batch_size: usize,
    /// Number of search queries to run
    pub search_queries: usize,
    /// Top-k results to retrieve
    pub k: usize,
    /// Ceiling on results per query
    pub max_top_k: usize,
    /// Fraction of each batch deleted right after it is inserted
    pub delete_fraction: f64,
    /// Compact after this many batches (0 disables periodic compaction)
    pub compact_every: usize,
    /// RNG seed
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            vector_count: 100_000,
            dimensions: 384,
            batch_size: 1000,
            search_queries: 1000,
            k: 10,
            max_top_k: 100,
            delete_fraction: 0.1,
            compact_every: 10,
            seed: 42,
        }
    }
}

/// Latency summary for one operation type
#[derive(Debug, Clone, Default)]
pub struct LatencyStats {
    pub count: usize,
    pub avg: Duration,
    pub p50: Duration,
    pub p99: Duration,
}

impl LatencyStats {
    fn from_samples(mut samples: Vec<Duration>) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        samples.sort();
        let total: Duration = samples.iter().sum();
        let count = samples.len();
        Self {
            count,
            avg: total.div_f64(count as f64),
            p50: samples[count / 2],
            p99: samples[((count as f64 * 0.99) as usize).min(count - 1)],
        }
    }
}

/// Results from a simulation run
#[derive(Debug, Clone)]
pub struct SimulationResults {
    /// Total vectors inserted
    pub vectors_inserted: usize,
    /// Total ids tombstoned
    pub vectors_deleted: usize,
    /// Rows left after the final compaction
    pub rows_remaining: usize,
    pub upsert: LatencyStats,
    pub delete: LatencyStats,
    pub compact: LatencyStats,
    pub search: LatencyStats,
    /// Search hits that named a deleted id
    pub deleted_hits: usize,
    /// Searches that returned fewer than k results
    pub short_pages: usize,
    /// Total simulation duration
    pub total_duration: Duration,
}

impl SimulationResults {
    /// Print results in a formatted way
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    SIMULATION RESULTS                        ║");
        println!("╠══════════════════════════════════════════════════════════════╣");
        println!("║ Vectors Inserted:     {:>10}                             ║", self.vectors_inserted);
        println!("║ Vectors Deleted:      {:>10}                             ║", self.vectors_deleted);
        println!("║ Rows Remaining:       {:>10}                             ║", self.rows_remaining);
        println!("║ Total Duration:       {:>10.2?}                         ║", self.total_duration);
        for (name, stats) in [
            ("UPSERT", &self.upsert),
            ("DELETE", &self.delete),
            ("COMPACT", &self.compact),
            ("SEARCH", &self.search),
        ] {
            println!("╠══════════════════════════════════════════════════════════════╣");
            println!("║ {:<8} ops: {:>8}                                        ║", name, stats.count);
            println!("║ Avg Latency:          {:>10.2?}                         ║", stats.avg);
            println!("║ P50 Latency:          {:>10.2?}                         ║", stats.p50);
            println!("║ P99 Latency:          {:>10.2?}                         ║", stats.p99);
        }
        println!("╠══════════════════════════════════════════════════════════════╣");
        println!("║ Deleted Ids Returned: {:>10}                             ║", self.deleted_hits);
        println!("║ Short Result Pages:   {:>10}                             ║", self.short_pages);
        println!("╚══════════════════════════════════════════════════════════════╝");
    }
}

/// Simulation runner
pub struct SimulationRunner {
    config: SimulationConfig,
    rng: StdRng,
}

impl SimulationRunner {
    /// Create a new simulation runner
    pub fn new(config: SimulationConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    /// Run the simulation
    pub fn run(&mut self) -> Result<SimulationResults> {
        let start_time = Instant::now();
        info!(config = ?self.config, "Starting simulation");

        let engine = IndexEngine::new(EngineConfig {
            dims: self.config.dimensions,
            max_top_k: self.config.max_top_k,
        })?;

        let batch_size = self.config.batch_size.max(1);
        let num_batches = self.config.vector_count / batch_size;
        let per_batch_deletes =
            ((batch_size as f64) * self.config.delete_fraction.clamp(0.0, 1.0)) as usize;

        let mut upsert_latencies = Vec::with_capacity(num_batches);
        let mut delete_latencies = Vec::with_capacity(num_batches);
        let mut compact_latencies = Vec::new();
        let mut deleted: HashSet<String> = HashSet::new();

        for batch_idx in 0..num_batches {
            let items: Vec<UpsertItem> = (0..batch_size)
                .map(|i| {
                    let id = format!("vec-{}", batch_idx * batch_size + i);
                    UpsertItem::new(id, self.random_vector())
                })
                .collect();

            let doomed: Vec<String> = items
                .iter()
                .take(per_batch_deletes)
                .map(|item| item.id.clone())
                .collect();

            let start = Instant::now();
            engine.upsert(items)?;
            upsert_latencies.push(start.elapsed());

            if !doomed.is_empty() {
                let start = Instant::now();
                engine.delete(doomed.iter().cloned());
                delete_latencies.push(start.elapsed());
                deleted.extend(doomed);
            }

            if self.config.compact_every > 0 && (batch_idx + 1) % self.config.compact_every == 0 {
                let start = Instant::now();
                let result = engine.compact();
                compact_latencies.push(start.elapsed());
                info!(
                    progress = format!("{}/{}", batch_idx + 1, num_batches),
                    removed = result.removed,
                    remaining = result.remaining,
                    "Compacted"
                );
            }
        }

        let mut search_latencies = Vec::with_capacity(self.config.search_queries);
        let mut deleted_hits = 0;
        let mut short_pages = 0;
        let expected = self.config.k.min(self.config.max_top_k);

        for i in 0..self.config.search_queries {
            let query = self.random_vector();

            let start = Instant::now();
            let results = engine.search(&query, self.config.k)?;
            search_latencies.push(start.elapsed());

            deleted_hits += results.iter().filter(|r| deleted.contains(&r.id)).count();
            // Live rows: every deleted id here was inserted exactly once
            let stats = engine.stats();
            let live_rows = stats.count.saturating_sub(stats.tombstones);
            if results.len() < expected.min(live_rows) {
                short_pages += 1;
            }

            if (i + 1) % 100 == 0 {
                info!(
                    progress = format!("{}/{}", i + 1, self.config.search_queries),
                    "Search progress"
                );
            }
        }

        let start = Instant::now();
        let final_compaction = engine.compact();
        compact_latencies.push(start.elapsed());

        Ok(SimulationResults {
            vectors_inserted: num_batches * batch_size,
            vectors_deleted: deleted.len(),
            rows_remaining: final_compaction.remaining,
            upsert: LatencyStats::from_samples(upsert_latencies),
            delete: LatencyStats::from_samples(delete_latencies),
            compact: LatencyStats::from_samples(compact_latencies),
            search: LatencyStats::from_samples(search_latencies),
            deleted_hits,
            short_pages,
            total_duration: start_time.elapsed(),
        })
    }

    /// Generate a random normalized vector
    fn random_vector(&mut self) -> Vec<f32> {
        let v: Vec<f32> = (0..self.config.dimensions)
            .map(|_| self.rng.gen::<f32>() * 2.0 - 1.0)
            .collect();
        math::normalize(&v)
    }
}
