use serde::Deserialize;
use serde_json::{Map, Value};

/// The only protocol version this server speaks.
pub const JSONRPC_VERSION: &str = "2.0";

fn default_jsonrpc() -> String {
    JSONRPC_VERSION.to_string()
}

/// JSON-RPC 2.0 request envelope.
///
/// `id` is echoed back verbatim, whatever JSON type the client used.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default = "default_jsonrpc")]
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
    #[serde(default)]
    pub id: Option<Value>,
}

/// Parameters of `tools/call`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolCallParams {
    pub name: String,
    pub arguments: Map<String, Value>,
}

impl ToolCallParams {
    /// Read `name` and `arguments` leniently: a missing or malformed part is
    /// treated as empty rather than rejected, so the pipeline reports it as a
    /// tool-level error.
    pub fn from_params(params: Option<&Value>) -> Self {
        let Some(params) = params else {
            return Self::default();
        };

        let name = params
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let arguments = params
            .get("arguments")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        Self { name, arguments }
    }
}
