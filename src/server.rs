// 🌐 REST API with Axum
// POST /receipts/process, GET /receipts/:id/points, GET /receipts, GET /health

use crate::error::ReceiptError;
use crate::processor::{ProcessedReceipt, ReceiptProcessor};
use crate::receipt::{Receipt, StoredReceipt};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub processor: ReceiptProcessor,
}

#[derive(Serialize)]
struct PointsResponse {
    points: u64,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /health - Health check
async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Run store work off the async workers; SQLite I/O is blocking
async fn run_blocking<T, F>(work: F) -> Result<T, ReceiptError>
where
    F: FnOnce() -> Result<T, ReceiptError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ReceiptError::Storage(format!("store task failed: {e}")))?
}

/// POST /receipts/process - Validate, score and store a receipt
async fn process_receipt(
    State(state): State<AppState>,
    payload: Result<Json<Receipt>, JsonRejection>,
) -> Result<Json<ProcessedReceipt>, Response> {
    let Json(receipt) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection, "undecodable receipt body");
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid receipt format" })),
        )
            .into_response()
    })?;

    let processor = state.processor.clone();
    run_blocking(move || processor.process(receipt))
        .await
        .map(Json)
        .map_err(IntoResponse::into_response)
}

/// GET /receipts/:id/points - Points awarded to one receipt
async fn get_points(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PointsResponse>, ReceiptError> {
    let processor = state.processor.clone();
    let points = run_blocking(move || processor.points(&id)).await?;
    Ok(Json(PointsResponse { points }))
}

/// GET /receipts - All receipts, newest first
async fn list_receipts(State(state): State<AppState>) -> Result<Json<Vec<StoredReceipt>>, ReceiptError> {
    let processor = state.processor.clone();
    let receipts = run_blocking(move || processor.list()).await.map_err(|e| {
        tracing::error!(error = %e, "failed to list receipts");
        e
    })?;
    Ok(Json(receipts))
}

// ============================================================================
// Router
// ============================================================================

pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn router(processor: ReceiptProcessor) -> Router {
    let state = AppState { processor };

    Router::new()
        .route("/health", get(health_check))
        .route("/receipts/process", post(process_receipt))
        .route("/receipts/:id/points", get(get_points))
        .route("/receipts", get(list_receipts))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}
