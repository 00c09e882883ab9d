//! JSON-RPC dispatcher for the `POST /mcp` endpoint.
//!
//! Every outcome, including malformed bodies and panics inside a handler, is
//! answered with a JSON-RPC envelope; transport-level failures never leak to
//! the client as HTTP errors.

use crate::catalog::ToolCatalog;
use crate::protocol::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallParams, ToolCallResult,
    JSONRPC_VERSION,
};
use crate::state::AppState;
use axum::{body::Bytes, extract::State, Json};
use futures::FutureExt;
use serde_json::{json, Value};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::Instrument;

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "docsearch-mcp";

/// Label shared by every method or tool name outside the known set.
const UNKNOWN_LABEL: &str = "unknown";

/// POST /mcp - JSON-RPC 2.0 endpoint.
pub async fn rpc_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Json<JsonRpcResponse> {
    let request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected malformed JSON-RPC body");
            metrics::counter!("rpc_requests_total", "method" => "invalid").increment(1);
            return Json(JsonRpcResponse::error(None, JsonRpcError::parse_error()));
        }
    };

    Json(dispatch(&state, request).await)
}

/// Route one request by method and shape the response envelope.
pub async fn dispatch(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("rpc", %request_id, method = %request.method);
    let id = request.id.clone();

    if request.jsonrpc != JSONRPC_VERSION {
        tracing::debug!(version = %request.jsonrpc, "Non-2.0 JSON-RPC version, handling anyway");
    }
    metrics::counter!("rpc_requests_total", "method" => method_label(&request.method))
        .increment(1);

    let outcome = AssertUnwindSafe(route(state, &request).instrument(span))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(result)) => JsonRpcResponse::success(id, result),
        Ok(Err(error)) => JsonRpcResponse::error(id, error),
        Err(panic) => {
            let detail = panic_message(panic.as_ref());
            tracing::error!(method = %request.method, error = %detail, "Dispatch panicked");
            JsonRpcResponse::error(id, JsonRpcError::internal_error(detail))
        }
    }
}

async fn route(state: &AppState, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
    match request.method.as_str() {
        "initialize" => Ok(initialize_result()),
        "tools/list" => Ok(list_tools(&state.catalog)),
        "tools/call" => {
            let params = ToolCallParams::from_params(request.params.as_ref());
            call_tool(state, params).await
        }
        other => {
            tracing::debug!(method = other, "Unknown method");
            Err(JsonRpcError::method_not_found(other))
        }
    }
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": {}
        },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

fn list_tools(catalog: &ToolCatalog) -> Value {
    json!({ "tools": catalog.definitions() })
}

async fn call_tool(state: &AppState, params: ToolCallParams) -> Result<Value, JsonRpcError> {
    let start = std::time::Instant::now();
    let result = state.pipeline.execute(&params.name, &params.arguments).await;
    let elapsed = start.elapsed();

    let outcome = if result.is_error { "error" } else { "success" };
    tracing::info!(
        tool = %params.name,
        outcome,
        total_ms = elapsed.as_millis() as u64,
        "Tool call completed"
    );
    let tool = tool_label(&state.catalog, &params.name);
    metrics::counter!("tool_calls_total", "tool" => tool, "outcome" => outcome).increment(1);
    metrics::histogram!("tool_call_latency_ms").record(elapsed.as_millis() as f64);

    serde_json::to_value(ToolCallResult::from(result)).map_err(JsonRpcError::internal_error)
}

/// Metric label for a method. Client-chosen names map onto a fixed set.
fn method_label(method: &str) -> &'static str {
    match method {
        "initialize" => "initialize",
        "tools/list" => "tools/list",
        "tools/call" => "tools/call",
        _ => UNKNOWN_LABEL,
    }
}

/// Metric label for a tool: its catalog name, or `unknown` when the client
/// named a tool the catalog does not have.
fn tool_label(catalog: &ToolCatalog, name: &str) -> String {
    match catalog.get(name) {
        Some(tool) => tool.name.clone(),
        None => UNKNOWN_LABEL.to_string(),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}
