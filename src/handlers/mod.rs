pub mod health;
pub mod rpc;
pub mod sse;

pub use health::{health_handler, ready_handler};
pub use rpc::{dispatch, rpc_handler};
pub use sse::sse_handler;

/// Path of the JSON-RPC endpoint.
pub const MCP_PATH: &str = "/mcp";
/// Path of the endpoint-discovery event stream.
pub const SSE_PATH: &str = "/sse";
