//! HTTP front end for the batch sorters.

pub mod config;
pub mod error;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
};
use batch_sort_engine::{BatchSorter, CollectOrder, ConcurrentSorter, SequentialSorter};
use batch_sort_model::{SortRequest, SortResponse};
use tower_http::trace::TraceLayer;

use config::ServerConfig;
use error::ApiError;

/// Sorters shared by every request. They hold no per-request state.
#[derive(Clone, Copy)]
struct AppState {
    sequential: SequentialSorter,
    concurrent: ConcurrentSorter,
    concurrent_ordered: ConcurrentSorter,
}

impl Default for AppState {
    fn default() -> Self {
        AppState {
            sequential: SequentialSorter,
            concurrent: ConcurrentSorter::new(CollectOrder::Completion),
            concurrent_ordered: ConcurrentSorter::new(CollectOrder::Input),
        }
    }
}

/// Builds the application router with all routes and middleware.
pub fn create_app(config: &ServerConfig) -> Router {
    Router::new()
        .route("/process-single", post(process_single))
        .route("/process-concurrent", post(process_concurrent))
        .route("/process-concurrent-ordered", post(process_concurrent_ordered))
        .route("/health", get(health))
        .with_state(AppState::default())
        .layer(DefaultBodyLimit::max(config.body_limit))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str {
    "ok"
}

async fn process_single(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SortResponse>, ApiError> {
    sort_with(&state.sequential, &body).await
}

/// Output positions follow task completion, not submission.
async fn process_concurrent(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SortResponse>, ApiError> {
    sort_with(&state.concurrent, &body).await
}

async fn process_concurrent_ordered(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SortResponse>, ApiError> {
    sort_with(&state.concurrent_ordered, &body).await
}

async fn sort_with<S: BatchSorter>(
    sorter: &S,
    body: &[u8],
) -> Result<Json<SortResponse>, ApiError> {
    let request: SortRequest = serde_json::from_slice(body)?;
    let batch = request.into_batch();

    tracing::info!(
        strategy = S::STRATEGY,
        sequences = batch.len(),
        values = batch.total_values(),
        "Processing sort request"
    );

    let report = sorter.sort_batch(batch).await;
    Ok(Json(report.into()))
}
