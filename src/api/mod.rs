//! HTTP API
//!
//! REST endpoints:
//! - GET /health - Liveness plus row count and dimension
//! - POST /upsert - Insert vectors
//! - POST /delete - Tombstone ids
//! - POST /compact - Reclaim tombstoned rows
//! - POST /search - k-NN by cosine similarity
//! - GET /stats - Row, dimension and tombstone counts

use crate::config::ApiConfig;
use crate::defaults::DEFAULT_TOP_K;
use crate::engine::{IndexEngine, SearchHit, UpsertItem};
use crate::error::FlatDbError;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// API state
pub struct ApiState {
    pub engine: Arc<IndexEngine>,
}

/// Build the router over a shared engine
pub fn router(engine: Arc<IndexEngine>) -> Router {
    let state = Arc::new(ApiState { engine });

    Router::new()
        .route("/health", get(health))
        .route("/upsert", post(upsert))
        .route("/delete", post(delete))
        .route("/compact", post(compact))
        .route("/search", post(search))
        .route("/stats", get(get_stats))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API
pub async fn serve(engine: Arc<IndexEngine>, config: ApiConfig) -> anyhow::Result<()> {
    let app = router(engine);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// HANDLERS
// ============================================================================

/// Health check
async fn health(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        count: state.engine.len(),
        dim: state.engine.dims(),
        timestamp: chrono::Utc::now(),
    })
}

/// Upsert vectors
#[axum::debug_handler]
async fn upsert(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<UpsertRequest>,
) -> Result<Json<UpsertResponse>, ApiError> {
    let start = Instant::now();

    let added = state.engine.upsert(request.items)?;

    tracing::debug!(added, latency_ms = start.elapsed().as_secs_f64() * 1000.0, "upsert");
    Ok(Json(UpsertResponse { added }))
}

/// Tombstone ids
async fn delete(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<DeleteRequest>,
) -> Json<DeleteResponse> {
    let deleted = state.engine.delete(request.ids);
    Json(DeleteResponse { deleted })
}

/// Compact the index
async fn compact(State(state): State<Arc<ApiState>>) -> Json<CompactResponse> {
    let result = state.engine.compact();
    Json(CompactResponse {
        compacted: result.removed,
        remaining: result.remaining,
    })
}

/// Search for similar vectors
#[axum::debug_handler]
async fn search(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Vec<SearchHit>>, ApiError> {
    let start = Instant::now();

    let top_k = clamp_top_k(request.top_k);
    let results = state.engine.search(&request.query, top_k)?;

    tracing::debug!(
        top_k,
        returned = results.len(),
        latency_ms = start.elapsed().as_secs_f64() * 1000.0,
        "search"
    );
    Ok(Json(results))
}

/// Get index stats
#[axum::debug_handler]
async fn get_stats(State(state): State<Arc<ApiState>>) -> Json<StatsResponse> {
    let stats = state.engine.stats();
    Json(StatsResponse {
        count: stats.count,
        dim: stats.dim,
        tombstones: stats.tombstones,
    })
}

/// Missing means the default; zero or negative means one
fn clamp_top_k(requested: Option<i64>) -> usize {
    match requested {
        None => DEFAULT_TOP_K,
        Some(k) => usize::try_from(k.max(1)).unwrap_or(usize::MAX),
    }
}

// ============================================================================
// REQUEST/RESPONSE TYPES
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    count: usize,
    dim: usize,
    timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize)]
struct UpsertRequest {
    items: Vec<UpsertItem>,
}

#[derive(Serialize)]
struct UpsertResponse {
    added: usize,
}

#[derive(Deserialize)]
struct DeleteRequest {
    ids: Vec<String>,
}

#[derive(Serialize)]
struct DeleteResponse {
    deleted: usize,
}

#[derive(Serialize)]
struct CompactResponse {
    compacted: usize,
    remaining: usize,
}

#[derive(Deserialize)]
struct SearchRequest {
    query: Vec<f32>,
    top_k: Option<i64>,
}

#[derive(Serialize)]
struct StatsResponse {
    count: usize,
    dim: usize,
    tombstones: usize,
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl From<FlatDbError> for ApiError {
    fn from(e: FlatDbError) -> Self {
        if e.is_client_error() {
            ApiError::BadRequest(e.to_string())
        } else {
            ApiError::Internal(e.to_string())
        }
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}
