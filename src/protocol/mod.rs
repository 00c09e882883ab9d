pub mod request;
pub mod response;

pub use request::{JsonRpcRequest, ToolCallParams, JSONRPC_VERSION};
pub use response::{JsonRpcError, JsonRpcResponse, ToolCallResult, ToolResultContent};
