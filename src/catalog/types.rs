//! Type definitions for the tool catalog.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Name of the one tool kind the pipeline implements.
pub const SEARCH_DOCUMENTS: &str = "search_documents";

/// A tool exposed over `tools/list` and invocable through `tools/call`.
///
/// Created once at startup and never mutated; `name` is unique within a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,
    pub description: String,
    /// Identifier of the data store this tool searches. May be blank when
    /// the deployment has not configured one.
    #[serde(default)]
    pub data_store_id: String,
    /// Instructions prepended to the answer prompt for this tool.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

/// The implementations a catalog entry can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    /// Extract a query, search the data store, synthesize an answer.
    SearchDocuments,
    /// Listed in the catalog, but no implementation exists.
    Unsupported,
}

impl Tool {
    /// The built-in document search tool.
    pub fn search_documents(data_store_id: impl Into<String>) -> Self {
        Self {
            name: SEARCH_DOCUMENTS.to_string(),
            description: "Search internal documents (PDF and shared drive files) and return a \
                          summarized answer with the source documents it was based on."
                .to_string(),
            data_store_id: data_store_id.into(),
            system_prompt: None,
        }
    }

    pub fn kind(&self) -> ToolKind {
        match self.name.as_str() {
            SEARCH_DOCUMENTS => ToolKind::SearchDocuments,
            _ => ToolKind::Unsupported,
        }
    }

    /// Every tool takes a single required string argument, `query`.
    pub fn input_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search keywords or the question to answer"
                }
            },
            "required": ["query"]
        })
    }

    /// The `tools/list` rendering of this tool.
    pub fn to_definition(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": Self::input_schema(),
        })
    }
}
