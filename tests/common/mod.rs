//! Shared test utilities for FlatDB testing
//!
//! This module provides:
//! - Random and seeded vector generation with normalization
//! - Engine constructors with small dimensions
//! - Result page assertions

#![allow(dead_code)]

use flatdb::{EngineConfig, IndexEngine, SearchHit, UpsertItem};
use rand::Rng;

/// Create an engine with the given dimension and ceiling
pub fn test_engine(dims: usize, max_top_k: usize) -> IndexEngine {
    IndexEngine::new(EngineConfig { dims, max_top_k }).unwrap()
}

/// Generate a random normalized vector
pub fn random_vector(dims: usize) -> Vec<f32> {
    let mut rng = rand::thread_rng();
    let v: Vec<f32> = (0..dims).map(|_| rng.gen::<f32>() * 2.0 - 1.0).collect();
    normalize(&v)
}

/// Generate a deterministic vector based on seed
pub fn seeded_vector(dims: usize, seed: u64) -> Vec<f32> {
    use rand::SeedableRng;
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let v: Vec<f32> = (0..dims).map(|_| rng.gen::<f32>() * 2.0 - 1.0).collect();
    normalize(&v)
}

/// Normalize a vector to unit length
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}

/// Cosine similarity (dot product for normalized vectors)
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Seeded items named `{prefix}{i}` for i in `range`
pub fn seeded_items(dims: usize, prefix: &str, range: std::ops::Range<u64>) -> Vec<UpsertItem> {
    range
        .map(|i| UpsertItem::new(format!("{prefix}{i}"), seeded_vector(dims, i)))
        .collect()
}

/// Ids of a result page, in order
pub fn hit_ids(hits: &[SearchHit]) -> Vec<String> {
    hits.iter().map(|h| h.id.clone()).collect()
}

/// Assert a result page is sorted by descending score and every score is sane
pub fn assert_well_formed(hits: &[SearchHit]) {
    for pair in hits.windows(2) {
        assert!(
            pair[0].score >= pair[1].score,
            "results out of order: {} before {}",
            pair[0].score,
            pair[1].score
        );
    }
    for hit in hits {
        assert!(hit.score.is_finite(), "non-finite score for {}", hit.id);
        assert!(hit.score <= 1.0 + 1e-4, "score above 1 for {}: {}", hit.id, hit.score);
        assert!(hit.score >= -1.0 - 1e-4, "score below -1 for {}: {}", hit.id, hit.score);
    }
}
