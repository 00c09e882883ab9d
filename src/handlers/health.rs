use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub tools: usize,
}

impl HealthResponse {
    fn new(status: &'static str, state: &AppState) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            tools: state.catalog.len(),
        }
    }
}

/// GET /health - Liveness probe
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse::new("healthy", &state))
}

/// GET /ready - Readiness probe (fails once shutdown has begun)
pub async fn ready_handler(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    if state.is_ready() {
        (StatusCode::OK, Json(HealthResponse::new("ready", &state)))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse::new("not_ready", &state)),
        )
    }
}
