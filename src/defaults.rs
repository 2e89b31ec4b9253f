//! Centralized default values and constants
//!
//! This module consolidates the magic numbers used by the engine, the
//! configuration loader and the HTTP layer.

// ============================================================================
// Vector Dimensions
// ============================================================================

/// Default vector dimensionality (common for sentence embeddings like all-MiniLM-L6-v2)
pub const DEFAULT_DIMENSIONS: usize = 384;

// ============================================================================
// Search Parameters
// ============================================================================

/// Default number of results to return when a request omits `top_k`
pub const DEFAULT_TOP_K: usize = 10;

/// Default ceiling on `top_k`, and on the raw candidate count per query
pub const DEFAULT_MAX_TOP_K: usize = 100;

/// Raw candidates fetched per requested result, to survive tombstone filtering
pub const OVERFETCH_FACTOR: usize = 2;

/// Minimum number of extra raw candidates fetched beyond `top_k`
pub const OVERFETCH_SLACK: usize = 10;

// ============================================================================
// Server Configuration
// ============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_PORT: u16 = 8080;
