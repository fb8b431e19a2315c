//! HTTP route handlers
//!
//! All endpoints answer HTTP 200; prediction failures are signaled in the
//! response body, not via status codes.

pub mod health;
pub mod predict;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::state::SharedState;

/// Body of the root endpoint
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: String,
}

/// GET / - Root endpoint
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Crop Stress API is running".to_string(),
    })
}

/// Build the API router with all routes attached.
pub fn api_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health::health_check))
        .route("/api/predict", post(predict::predict))
        .with_state(state)
}
