//! Wire types exchanged with the search and generation services.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A search request addressed to one data store's serving target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub serving_config: String,
    pub query: String,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    pub content_search_spec: ContentSearchSpec,
    pub query_expansion_spec: QueryExpansionSpec,
    pub spell_correction_spec: SpellCorrectionSpec,
}

impl SearchRequest {
    /// The same request with the filter and order-by expressions removed.
    pub fn without_constraints(&self) -> Self {
        Self {
            filter: None,
            order_by: None,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSearchSpec {
    pub snippet_spec: SnippetSpec,
    pub extractive_content_spec: ExtractiveContentSpec,
}

impl Default for ContentSearchSpec {
    fn default() -> Self {
        Self {
            snippet_spec: SnippetSpec {
                return_snippet: true,
                max_snippet_count: 3,
            },
            extractive_content_spec: ExtractiveContentSpec {
                max_extractive_answer_count: 2,
                max_extractive_segment_count: 3,
                num_previous_segments: 1,
                num_next_segments: 1,
                return_extractive_segment_score: true,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetSpec {
    pub return_snippet: bool,
    pub max_snippet_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractiveContentSpec {
    pub max_extractive_answer_count: u32,
    pub max_extractive_segment_count: u32,
    pub num_previous_segments: u32,
    pub num_next_segments: u32,
    pub return_extractive_segment_score: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryExpansionSpec {
    pub condition: &'static str,
}

impl Default for QueryExpansionSpec {
    fn default() -> Self {
        Self { condition: "AUTO" }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpellCorrectionSpec {
    pub mode: &'static str,
}

impl Default for SpellCorrectionSpec {
    fn default() -> Self {
        Self { mode: "AUTO" }
    }
}

/// First page of a search response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub results: Vec<SearchHit>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub document: Option<SearchDocument>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDocument {
    /// Service-derived fields: title, link, snippets, extractive content.
    #[serde(default)]
    pub derived_struct_data: Option<Map<String, Value>>,
}

/// Body of a `generateContent` call.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, if any.
    pub fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Error body returned by the upstream REST APIs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}
