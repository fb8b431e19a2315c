//! Health check endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
}

/// GET /api/health - Health check endpoint
///
/// Stays alive even when the model artifacts failed to load, so the process
/// can report its degraded state.
pub async fn health_check(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model_loaded: state.store.model_loaded(),
    })
}
