//! FlatDB Server Entry Point

use flatdb::{api, Config, IndexEngine};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,flatdb=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting FlatDB server...");

    // Load config
    let config = Config::from_env()?;
    tracing::info!("Loaded config: {:?}", config);

    // Create engine
    let engine = Arc::new(IndexEngine::new(config.engine)?);
    tracing::info!(
        dims = config.engine.dims,
        max_top_k = config.engine.max_top_k,
        "Index engine initialized"
    );

    // Start API server
    api::serve(engine, config.api).await?;

    Ok(())
}
