//! docsearch-mcp - Document search tools over JSON-RPC
//!
//! This library exposes the server's components so integration tests can
//! drive the router and pipeline with fake upstream services.

pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod pipeline;
pub mod protocol;
pub mod services;
pub mod state;

// Re-export key types for convenience
pub use catalog::{Tool, ToolCatalog};
pub use config::Config;
pub use error::{AppError, Result};
pub use handlers::{dispatch, health_handler, ready_handler, rpc_handler, sse_handler};
pub use pipeline::{ToolPipeline, ToolResult};
pub use services::{GenerationService, SearchService};
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Build the application router without the `/metrics` route, which needs
/// the process-wide Prometheus handle.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(handlers::MCP_PATH, post(rpc_handler))
        .route(handlers::SSE_PATH, get(sse_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
