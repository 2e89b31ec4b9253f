//! Flat, row-indexed vector storage
//!
//! Layout:
//! ┌──────────────────────────────────────────────────────────────┐
//! │ data: Vec<f32>  row-major, `dims` floats per row             │
//! │   row 0: [f32; dims]                                         │
//! │   row 1: [f32; dims]                                         │
//! │   ...                                                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │ ids: Vec<String>  parallel to rows, `ids[row]` owns row      │
//! └──────────────────────────────────────────────────────────────┘
//!
//! The store is append-only. Rows are only reordered or removed by building
//! a fresh store during compaction. It carries no locking or deletion policy
//! of its own; the engine owns both.

pub mod math;

use crate::error::{FlatDbError, Result};
use std::cmp::Ordering;

/// Contiguous in-memory vector storage with a row -> id mapping
#[derive(Debug, Clone)]
pub struct VectorStore {
    dims: usize,
    data: Vec<f32>,
    ids: Vec<String>,
}

impl VectorStore {
    /// Create an empty store
    ///
    /// # Panics
    /// Panics if `dims` is zero.
    pub fn new(dims: usize) -> Self {
        Self::with_capacity(dims, 0)
    }

    /// Create an empty store with room for `rows` vectors
    ///
    /// # Panics
    /// Panics if `dims` is zero.
    pub fn with_capacity(dims: usize, rows: usize) -> Self {
        assert!(dims > 0, "vector dimension must be positive");
        Self {
            dims,
            data: Vec::with_capacity(dims * rows),
            ids: Vec::with_capacity(rows),
        }
    }

    /// Append a batch of rows in order
    ///
    /// Every vector is checked before anything is written, so a failing batch
    /// leaves the store unchanged.
    pub fn append(&mut self, vectors: Vec<Vec<f32>>, ids: Vec<String>) -> Result<()> {
        if vectors.len() != ids.len() {
            return Err(FlatDbError::invalid_input(format!(
                "{} vectors but {} ids",
                vectors.len(),
                ids.len()
            )));
        }

        for (vector, id) in vectors.iter().zip(ids.iter()) {
            if vector.len() != self.dims {
                return Err(FlatDbError::dimension_mismatch(
                    id.as_str(),
                    self.dims,
                    vector.len(),
                ));
            }
        }

        self.data.reserve(vectors.len() * self.dims);
        for vector in &vectors {
            self.data.extend_from_slice(vector);
        }
        self.ids.extend(ids);

        debug_assert_eq!(self.data.len(), self.ids.len() * self.dims);
        Ok(())
    }

    /// Append one row already known to have length `dims`
    pub(crate) fn push_row(&mut self, vector: &[f32], id: String) {
        debug_assert_eq!(vector.len(), self.dims);
        self.data.extend_from_slice(vector);
        self.ids.push(id);
    }

    /// Copy every row out, in row order
    pub fn reconstruct_all(&self) -> (Vec<Vec<f32>>, Vec<String>) {
        let vectors = self
            .data
            .chunks_exact(self.dims)
            .map(|row| row.to_vec())
            .collect();
        (vectors, self.ids.clone())
    }

    /// Score `query` against every row and keep the best `k`
    ///
    /// Results are sorted by descending inner product, ties broken by
    /// ascending row index. Returns `min(k, row_count)` entries.
    pub fn score_against(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if query.len() != self.dims {
            return Err(FlatDbError::query_dimension_mismatch(self.dims, query.len()));
        }

        let k = k.min(self.row_count());
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dims)
            .map(|row| math::dot(query, row))
            .enumerate()
            .collect();

        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, rank);
            scored.truncate(k);
        }
        scored.sort_unstable_by(rank);

        Ok(scored)
    }

    /// Get a row's vector
    pub fn get(&self, row: usize) -> Option<&[f32]> {
        if row >= self.ids.len() {
            return None;
        }
        let start = row * self.dims;
        Some(&self.data[start..start + self.dims])
    }

    /// Get the id that owns a row
    pub fn id(&self, row: usize) -> Option<&str> {
        self.ids.get(row).map(String::as_str)
    }

    /// Row ids in row order
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Iterate `(id, vector)` pairs in row order
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[f32])> {
        self.ids
            .iter()
            .map(String::as_str)
            .zip(self.data.chunks_exact(self.dims))
    }

    /// Number of stored rows
    pub fn row_count(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Get dimensions
    pub fn dims(&self) -> usize {
        self.dims
    }
}

/// Descending score, then ascending row
#[inline]
fn rank(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}
