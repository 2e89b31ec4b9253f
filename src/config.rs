//! Configuration module
//!
//! Everything is read from environment variables:
//! - `EMBEDDING_DIM` - vector dimension, fixed for the index lifetime
//! - `MAX_TOP_K` - ceiling on `top_k` and on raw candidates per query
//! - `API_HOST` / `API_PORT` - listen address

use crate::defaults::{DEFAULT_DIMENSIONS, DEFAULT_HOST, DEFAULT_MAX_TOP_K, DEFAULT_PORT};
use crate::error::{FlatDbError, Result};

/// Main configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub engine: EngineConfig,
    pub api: ApiConfig,
}

impl Config {
    /// Load config from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load config through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let engine = EngineConfig {
            dims: parse_or(&lookup, "EMBEDDING_DIM", DEFAULT_DIMENSIONS)?,
            max_top_k: parse_or(&lookup, "MAX_TOP_K", DEFAULT_MAX_TOP_K)?,
        };
        engine.validate()?;

        let api = ApiConfig {
            host: lookup("API_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(&lookup, "API_PORT", DEFAULT_PORT)?,
        };

        Ok(Self { engine, api })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {}={:?}: {}", key, raw, e)),
        None => Ok(default),
    }
}

/// Engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Embedding dimension
    pub dims: usize,
    /// Maximum results per query
    pub max_top_k: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dims: DEFAULT_DIMENSIONS,
            max_top_k: DEFAULT_MAX_TOP_K,
        }
    }
}

impl EngineConfig {
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            ..Self::default()
        }
    }

    /// Reject zero dimension or zero ceiling
    pub fn validate(&self) -> Result<()> {
        if self.dims == 0 {
            return Err(FlatDbError::config("embedding dimension must be positive"));
        }
        if self.max_top_k == 0 {
            return Err(FlatDbError::config("max_top_k must be positive"));
        }
        Ok(())
    }
}

/// API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}
