//! Index Engine
//!
//! Composes the vector store, the tombstone set and the metadata table behind
//! one shared handle. All operations are bounded, synchronous CPU work.
//!
//! Lock order is always store -> tombstones -> metadata:
//! - `search` holds the store read lock while filtering tombstones and
//!   attaching metadata, so it sees a self-consistent generation.
//! - `upsert` holds the store write lock only for the append.
//! - `delete` touches the tombstone set only and never waits on the store.
//! - `compact` copies rows under the read lock, rebuilds off-lock, then swaps
//!   the store and drains the snapshotted tombstones under the write lock.

use crate::config::EngineConfig;
use crate::defaults::{OVERFETCH_FACTOR, OVERFETCH_SLACK};
use crate::error::{FlatDbError, Result};
use crate::metadata::{Metadata, MetadataTable};
use crate::tombstone::TombstoneSet;
use crate::vectors::{math, VectorStore};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Shared exact-search vector index
#[derive(Debug)]
pub struct IndexEngine {
    config: EngineConfig,
    store: RwLock<VectorStore>,
    tombstones: TombstoneSet,
    metadata: MetadataTable,
    /// Serializes compactions; never held by search, upsert or delete
    compaction: Mutex<()>,
}

impl IndexEngine {
    /// Create an empty engine
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            store: RwLock::new(VectorStore::new(config.dims)),
            tombstones: TombstoneSet::new(),
            metadata: MetadataTable::new(),
            compaction: Mutex::new(()),
            config,
        })
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Configured vector dimension
    pub fn dims(&self) -> usize {
        self.config.dims
    }

    /// Normalize and append a batch of vectors
    ///
    /// The whole batch is validated before anything is written: one bad item
    /// rejects the batch. Ids are not deduplicated; upserting an existing id
    /// adds another row and overwrites its metadata.
    pub fn upsert(&self, items: Vec<UpsertItem>) -> Result<usize> {
        if items.is_empty() {
            return Ok(0);
        }

        let dims = self.config.dims;
        for item in &items {
            if item.vector.len() != dims {
                warn!(
                    id = %item.id,
                    expected = dims,
                    actual = item.vector.len(),
                    "Rejecting upsert batch"
                );
                return Err(FlatDbError::dimension_mismatch(
                    item.id.as_str(),
                    dims,
                    item.vector.len(),
                ));
            }
            if !math::is_finite(&item.vector) {
                warn!(id = %item.id, "Rejecting upsert batch with non-finite vector");
                return Err(FlatDbError::NonFiniteComponent {
                    id: Some(item.id.clone()),
                });
            }
        }

        let count = items.len();
        let mut vectors = Vec::with_capacity(count);
        let mut ids = Vec::with_capacity(count);
        let mut payloads = Vec::with_capacity(count);
        for item in items {
            let mut vector = item.vector;
            math::normalize_in_place(&mut vector);
            vectors.push(vector);
            payloads.push((item.id.clone(), item.metadata.unwrap_or_default()));
            ids.push(item.id);
        }

        {
            let mut store = self.store.write();
            store.append(vectors, ids)?;
            self.metadata.put_many(payloads);
        }

        debug!(count, "Upserted vectors");
        Ok(count)
    }

    /// Tombstone ids, returns how many were newly marked
    ///
    /// Unknown and already-deleted ids are ignored.
    pub fn delete<I, S>(&self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let deleted = self.tombstones.mark(ids);
        debug!(deleted, pending = self.tombstones.len(), "Tombstoned ids");
        deleted
    }

    /// Physically remove tombstoned rows and their metadata
    pub fn compact(&self) -> CompactResult {
        let _guard = self.compaction.lock();
        let start = Instant::now();

        match self.plan_compaction() {
            Some(plan) => {
                let result = self.publish_compaction(plan);
                info!(
                    removed = result.removed,
                    remaining = result.remaining,
                    elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Compaction complete"
                );
                result
            }
            None => CompactResult {
                removed: 0,
                remaining: self.store.read().row_count(),
            },
        }
    }

    /// Copy the store and build its replacement without blocking searches
    fn plan_compaction(&self) -> Option<CompactionPlan> {
        let doomed = self.tombstones.snapshot();
        if doomed.is_empty() {
            return None;
        }

        let (vectors, ids) = {
            let store = self.store.read();
            if store.is_empty() {
                return None;
            }
            store.reconstruct_all()
        };
        let snapshot_rows = ids.len();

        let mut fresh = VectorStore::with_capacity(self.config.dims, snapshot_rows);
        let mut dropped_rows = 0;
        for (vector, id) in vectors.iter().zip(ids) {
            if doomed.contains(&id) {
                dropped_rows += 1;
            } else {
                fresh.push_row(vector, id);
            }
        }

        Some(CompactionPlan {
            doomed,
            snapshot_rows,
            fresh,
            dropped_rows,
        })
    }

    /// Swap in the rebuilt store and drain the tombstones it accounted for
    fn publish_compaction(&self, plan: CompactionPlan) -> CompactResult {
        let CompactionPlan {
            doomed,
            snapshot_rows,
            mut fresh,
            mut dropped_rows,
        } = plan;

        let mut store = self.store.write();

        // Rows appended after the snapshot was taken
        for (id, vector) in store.rows().skip(snapshot_rows) {
            if doomed.contains(id) {
                dropped_rows += 1;
            } else {
                fresh.push_row(vector, id.to_string());
            }
        }

        *store = fresh;
        let removed = self.tombstones.remove_all(doomed.iter());
        self.metadata.remove_many(doomed.iter());
        let remaining = store.row_count();
        drop(store);

        debug!(dropped_rows, "Compaction dropped rows");
        CompactResult { removed, remaining }
    }

    /// Top `top_k` live matches by cosine similarity, capped by `max_top_k`
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>> {
        self.search_with_cap(query, top_k, self.config.max_top_k)
    }

    /// Top `top_k` live matches with an explicit candidate ceiling
    ///
    /// Fetches `max(2 * top_k, top_k + 10)` raw candidates (bounded by
    /// `max_top_k` and the row count) and drops tombstoned ones. When many of
    /// the best candidates are tombstoned the page can come back short; it is
    /// not re-queried. A zero ceiling yields an empty page.
    pub fn search_with_cap(
        &self,
        query: &[f32],
        top_k: usize,
        max_top_k: usize,
    ) -> Result<Vec<SearchHit>> {
        let dims = self.config.dims;
        if query.len() != dims {
            return Err(FlatDbError::query_dimension_mismatch(dims, query.len()));
        }
        if !math::is_finite(query) {
            return Err(FlatDbError::NonFiniteComponent { id: None });
        }

        let top_k = top_k.max(1);
        let query = math::normalize(query);

        let store = self.store.read();
        let row_count = store.row_count();
        if row_count == 0 || max_top_k == 0 {
            return Ok(Vec::new());
        }

        let k_raw = candidate_count(top_k, max_top_k, row_count);
        let candidates = store.score_against(&query, k_raw)?;

        let live: Vec<(String, f32)> = self.tombstones.with_read(|dead| {
            candidates
                .into_iter()
                .filter_map(|(row, score)| {
                    let id = store.id(row)?;
                    (!dead.contains(id)).then(|| (id.to_string(), score))
                })
                .take(top_k)
                .collect()
        });

        let hits = live
            .into_iter()
            .map(|(id, score)| SearchHit {
                metadata: self.metadata.get(&id),
                id,
                score,
            })
            .collect();

        Ok(hits)
    }

    /// Row, dimension and pending-tombstone counts
    pub fn stats(&self) -> IndexStats {
        let count = self.store.read().row_count();
        IndexStats {
            count,
            dim: self.config.dims,
            tombstones: self.tombstones.len(),
        }
    }

    /// Run `f` against the current store generation under the read lock
    pub fn with_store<R>(&self, f: impl FnOnce(&VectorStore) -> R) -> R {
        f(&self.store.read())
    }

    /// Number of stored rows, including tombstoned ones
    pub fn len(&self) -> usize {
        self.store.read().row_count()
    }

    pub fn is_empty(&self) -> bool {
        self.store.read().is_empty()
    }
}

/// Raw candidates to score: `max(2k, k + 10)` clamped to `[1, min(cap, rows)]`
///
/// Callers guarantee a nonzero ceiling and at least one row.
fn candidate_count(top_k: usize, max_top_k: usize, row_count: usize) -> usize {
    let k_cap = max_top_k.min(row_count);
    debug_assert!(k_cap >= 1);
    top_k
        .saturating_mul(OVERFETCH_FACTOR)
        .max(top_k.saturating_add(OVERFETCH_SLACK))
        .clamp(1, k_cap)
}

/// Rebuilt store waiting to be published
struct CompactionPlan {
    doomed: HashSet<String>,
    snapshot_rows: usize,
    fresh: VectorStore,
    dropped_rows: usize,
}

/// One vector to insert
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertItem {
    pub id: String,
    pub vector: Vec<f32>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

impl UpsertItem {
    pub fn new(id: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            vector,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Search result
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    pub metadata: Metadata,
}

/// Compaction result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompactResult {
    /// Tombstoned ids drained by this compaction
    pub removed: usize,
    /// Row count after compaction
    pub remaining: usize,
}

/// Index statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub count: usize,
    pub dim: usize,
    pub tombstones: usize,
}
