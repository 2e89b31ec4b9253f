//! # FlatDB
//!
//! An in-memory, exact nearest-neighbor vector index with cosine scoring,
//! soft deletes and online compaction.
//!
//! ## Architecture
//!
//! ```text
//! HTTP API (Axum)
//!     │
//!     ▼
//! IndexEngine (shared via Arc, internal locking)
//!     ├── VectorStore   (flat rows + row -> id, behind RwLock)
//!     ├── TombstoneSet  (deleted ids awaiting compaction)
//!     └── MetadataTable (id -> JSON payload)
//! ```
//!
//! ## Features
//!
//! - **Exact search**: brute-force inner product over unit-normalized rows
//! - **Soft deletes**: deletes only tombstone ids, search filters them out
//! - **Online compaction**: rebuild off-lock, swap under a brief write lock
//!
//! ## Quick Start
//!
//! ```ignore
//! use flatdb::{EngineConfig, IndexEngine, UpsertItem};
//!
//! let engine = IndexEngine::new(EngineConfig::new(4))?;
//! engine.upsert(vec![UpsertItem::new("a", vec![1.0, 0.0, 0.0, 0.0])])?;
//! let hits = engine.search(&[1.0, 0.0, 0.0, 0.0], 5)?;
//! ```

pub mod api;
pub mod config;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod metadata;
pub mod simulation;
pub mod tombstone;
pub mod vectors;

pub use config::{Config, EngineConfig};
pub use defaults::*;
pub use engine::{CompactResult, IndexEngine, IndexStats, SearchHit, UpsertItem};
pub use error::{FlatDbError, Result};
pub use metadata::Metadata;
