use crate::handlers::MCP_PATH;
use axum::response::sse::{Event, Sse};
use futures::stream::{self, Stream};
use serde_json::json;
use std::convert::Infallible;

/// GET /sse - Announce the JSON-RPC endpoint to streaming clients.
///
/// Emits a single `endpoint` event whose data names the path to POST
/// requests to, then ends the stream.
pub async fn sse_handler() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let data = json!({ "url": MCP_PATH }).to_string();
    tracing::debug!(endpoint = MCP_PATH, "SSE client connected");

    Sse::new(stream::once(async move {
        Ok(Event::default().event("endpoint").data(data))
    }))
}
