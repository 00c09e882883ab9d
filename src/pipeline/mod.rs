//! Tool execution pipeline.
//!
//! One `tools/call` runs these stages strictly in sequence, each consuming the
//! previous stage's output:
//!
//! 1. [`QueryExtractor`] turns the question into a [`StructuredQuery`]
//! 2. [`SearchClient`] retrieves documents from the tool's data store
//! 3. [`AnswerSynthesizer`] answers from those documents (skipped when none)
//! 4. [`format_answer`] renders the result text
//!
//! Every failure is converted into an error [`ToolResult`] here, so callers
//! always receive a value.

pub mod documents;
pub mod extractor;
pub mod format;
pub mod prompt;
pub mod search;
pub mod synthesizer;
pub mod types;

pub use extractor::QueryExtractor;
pub use format::format_answer;
pub use prompt::PromptTemplate;
pub use search::SearchClient;
pub use synthesizer::AnswerSynthesizer;
pub use types::{RetrievedDocument, SearchOutcome, StructuredQuery, ToolResult};

use crate::catalog::{Tool, ToolCatalog, ToolKind};
use crate::error::Result;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Number of results requested from the search service.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

pub const MISSING_QUERY_MESSAGE: &str = "Error: the query parameter is required.";
pub const MISSING_DATA_STORE_MESSAGE: &str =
    "Error: no search engine ID is configured for this tool (SEARCH_ENGINE_ID).";
pub const NO_RESULTS_MESSAGE: &str = "No search results were found.";

pub struct ToolPipeline {
    catalog: Arc<ToolCatalog>,
    extractor: QueryExtractor,
    searcher: SearchClient,
    synthesizer: AnswerSynthesizer,
}

impl ToolPipeline {
    pub fn new(
        catalog: Arc<ToolCatalog>,
        extractor: QueryExtractor,
        searcher: SearchClient,
        synthesizer: AnswerSynthesizer,
    ) -> Self {
        Self {
            catalog,
            extractor,
            searcher,
            synthesizer,
        }
    }

    /// Run the named tool. Never fails: problems come back as error results
    /// so the calling agent can read them as tool output.
    pub async fn execute(&self, tool_name: &str, arguments: &Map<String, Value>) -> ToolResult {
        let Some(tool) = self.catalog.get(tool_name) else {
            return ToolResult::error(format!("Unknown tool: {}", tool_name));
        };

        match tool.kind() {
            ToolKind::SearchDocuments => {}
            ToolKind::Unsupported => {
                return ToolResult::error(format!("Unsupported tool: {}", tool_name));
            }
        }

        let Some(query) = arguments
            .get("query")
            .and_then(Value::as_str)
            .filter(|q| !q.trim().is_empty())
        else {
            return ToolResult::error(MISSING_QUERY_MESSAGE);
        };

        match self.search_and_answer(tool, query).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(tool = %tool.name, error = %e, "Tool execution failed");
                ToolResult::error(format!("Search error: {}", e))
            }
        }
    }

    async fn search_and_answer(&self, tool: &Tool, query: &str) -> Result<ToolResult> {
        let structured = self.extractor.extract(query).await?;

        if tool.data_store_id.trim().is_empty() {
            return Ok(ToolResult::error(MISSING_DATA_STORE_MESSAGE));
        }

        let outcome = self
            .searcher
            .search(&tool.data_store_id, &structured, DEFAULT_PAGE_SIZE)
            .await?;

        if outcome.is_empty() {
            return Ok(ToolResult::success(NO_RESULTS_MESSAGE));
        }

        let answer = self
            .synthesizer
            .synthesize(query, &outcome.documents, tool.system_prompt.as_deref())
            .await?;

        Ok(ToolResult::success(format_answer(
            &answer,
            &structured,
            &outcome.documents,
        )))
    }
}
