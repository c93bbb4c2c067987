//! Axum HTTP API
//!
//! Endpoints:
//! - POST   /predict
//! - GET    /history?limit=&offset=
//! - DELETE /history/{id}
//! - GET    /health

mod error;
mod handlers;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::commands::predict::Services;

pub use handlers::PredictResponse;

/// Room for multipart framing on top of the file itself, so oversized
/// files reach the upload policy and get a JSON 413
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared state for all handlers, immutable after startup
pub struct AppState {
    pub services: Services,
    pub max_upload_bytes: usize,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/predict", post(handlers::predict))
        .route("/history", get(handlers::list_history))
        .route("/history/{id}", delete(handlers::delete_history))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
