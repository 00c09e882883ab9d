//! Turns a free-text question into a [`StructuredQuery`].
//!
//! The generation service is asked for a JSON object with `query`, `filter`
//! and `order_by`. Anything unusable in its reply degrades to searching for
//! the user's own words; only a failed service call is reported upstream.

use crate::error::Result;
use crate::pipeline::prompt::PromptTemplate;
use crate::pipeline::types::StructuredQuery;
use crate::services::GenerationService;
use serde_json::Value;
use std::sync::Arc;

pub struct QueryExtractor {
    generation: Arc<dyn GenerationService>,
    model: String,
    template: PromptTemplate,
}

impl QueryExtractor {
    pub fn new(
        generation: Arc<dyn GenerationService>,
        model: impl Into<String>,
        template: PromptTemplate,
    ) -> Self {
        Self {
            generation,
            model: model.into(),
            template,
        }
    }

    pub async fn extract(&self, user_query: &str) -> Result<StructuredQuery> {
        let current_date = chrono::Local::now().format("%Y-%m-%d").to_string();
        let prompt = self
            .template
            .render(&[("current_date", current_date.as_str()), ("user_query", user_query)]);

        let reply = self.generation.generate(&self.model, &prompt).await?;
        let Some(reply) = reply.filter(|r| !r.trim().is_empty()) else {
            tracing::warn!("Search parameter extraction returned no text, using original query");
            metrics::counter!("query_extraction_fallbacks_total").increment(1);
            return Ok(StructuredQuery::new(user_query));
        };

        let query = parse_search_params(&reply, user_query);
        tracing::debug!(
            query = %query.query_text,
            filter = ?query.filter_expression,
            order_by = ?query.sort_expression,
            "Search parameters extracted"
        );
        Ok(query)
    }
}

/// Parse the generation reply into a [`StructuredQuery`], falling back to
/// `user_query` with no filter or sort when the reply is not a JSON object.
pub fn parse_search_params(reply: &str, user_query: &str) -> StructuredQuery {
    let json_text = strip_code_fence(reply);

    let object = match serde_json::from_str::<Value>(json_text) {
        Ok(Value::Object(object)) => object,
        Ok(other) => {
            tracing::warn!(
                kind = json_kind(&other),
                "Search parameters are not a JSON object, using original query"
            );
            metrics::counter!("query_extraction_fallbacks_total").increment(1);
            return StructuredQuery::new(user_query);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to parse search parameters, using original query");
            metrics::counter!("query_extraction_fallbacks_total").increment(1);
            return StructuredQuery::new(user_query);
        }
    };

    let field = |key: &str| object.get(key).and_then(scalar_text);

    let query_text = field("query")
        .filter(|q| !q.trim().is_empty())
        .unwrap_or_else(|| user_query.to_string());

    StructuredQuery::new(query_text)
        .with_filter(field("filter"))
        .with_sort(field("order_by"))
}

/// Text of a scalar field. Models sometimes emit a bare number or boolean
/// (`{"query": 2024}`); those are kept as their JSON text.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(_) | Value::Bool(_) => Some(value.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Remove an optional leading ```` ```json ```` / ```` ``` ```` marker and an
/// optional trailing ```` ``` ````, then trim.
fn strip_code_fence(reply: &str) -> &str {
    let mut text = reply.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    }
    if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedGeneration {
        reply: Option<String>,
        fail: bool,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGeneration {
        fn replying(reply: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.map(str::to_string),
                fail: false,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl GenerationService for ScriptedGeneration {
        async fn generate(&self, _model: &str, prompt: &str) -> Result<Option<String>> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self.fail {
                return Err(AppError::GenerationError("503 unavailable".to_string()));
            }
            Ok(self.reply.clone())
        }
    }

    fn extractor(generation: Arc<ScriptedGeneration>) -> QueryExtractor {
        QueryExtractor::new(
            generation,
            "test-model",
            PromptTemplate::new("t", "{{current_date}}|{{user_query}}"),
        )
    }

    #[test]
    fn test_parse_plain_json() {
        let reply = r#"{
            "query": "expense report",
            "filter": "date >= \"2024-01-01\"",
            "order_by": "date desc"
        }"#;
        let query = parse_search_params(reply, "original");

        assert_eq!(query.query_text, "expense report");
        assert_eq!(query.filter_expression.as_deref(), Some("date >= \"2024-01-01\""));
        assert_eq!(query.sort_expression.as_deref(), Some("date desc"));
    }

    #[test]
    fn test_parse_fenced_json() {
        let reply = r#"```json
{"query": "travel rules", "filter": "", "order_by": ""}
```"#;
        let query = parse_search_params(reply, "original");

        assert_eq!(query, StructuredQuery::new("travel rules"));
    }

    #[test]
    fn test_parse_bare_fence() {
        let reply = "```\n{\"query\": \"travel rules\"}\n```";
        assert_eq!(parse_search_params(reply, "original").query_text, "travel rules");
    }

    #[test]
    fn test_prose_falls_back_to_original() {
        let reply = "Sure! Here are the parameters you asked for.";
        let query = parse_search_params(reply, "original question");
        assert_eq!(query, StructuredQuery::new("original question"));
    }

    #[test]
    fn test_non_object_json_falls_back_to_original() {
        assert_eq!(
            parse_search_params("[\"a\", \"b\"]", "original"),
            StructuredQuery::new("original")
        );
    }

    #[test]
    fn test_blank_query_field_uses_original() {
        let reply = r#"{"query": "  ", "order_by": "date desc"}"#;
        let query = parse_search_params(reply, "original");

        assert_eq!(query.query_text, "original");
        assert_eq!(query.sort_expression.as_deref(), Some("date desc"));
    }

    #[test]
    fn test_null_fields_are_absent() {
        let reply = r#"{"query": "q", "filter": null, "order_by": null}"#;
        assert_eq!(parse_search_params(reply, "original"), StructuredQuery::new("q"));
    }

    #[test]
    fn test_scalar_fields_are_kept_as_text() {
        let query = parse_search_params(r#"{"query": 2024, "filter": 5}"#, "original");

        assert_eq!(query.query_text, "2024");
        assert_eq!(query.filter_expression.as_deref(), Some("5"));
        assert_eq!(query.sort_expression, None);
    }

    #[test]
    fn test_structured_fields_are_absent() {
        let reply = r#"{"query": ["a"], "filter": {"date": "2024"}, "order_by": true}"#;
        let query = parse_search_params(reply, "original");

        assert_eq!(query.query_text, "original");
        assert_eq!(query.filter_expression, None);
        assert_eq!(query.sort_expression.as_deref(), Some("true"));
    }

    #[test]
    fn test_strip_code_fence_variants() {
        assert_eq!(strip_code_fence("```json {} ```"), "{}");
        assert_eq!(strip_code_fence("  {}  "), "{}");
        assert_eq!(strip_code_fence("```{}"), "{}");
    }

    #[tokio::test]
    async fn test_extract_renders_prompt_with_query() {
        let generation = ScriptedGeneration::replying(Some(r#"{"query": "kw"}"#));
        let query = extractor(Arc::clone(&generation)).extract("what is kw?").await.unwrap();

        assert_eq!(query.query_text, "kw");
        let prompts = generation.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].ends_with("|what is kw?"));
        assert!(!prompts[0].contains("{{current_date}}"));
    }

    #[tokio::test]
    async fn test_extract_without_reply_uses_original() {
        let generation = ScriptedGeneration::replying(None);
        let query = extractor(generation).extract("raw question").await.unwrap();

        assert_eq!(query, StructuredQuery::new("raw question"));
    }

    #[tokio::test]
    async fn test_extract_propagates_service_failure() {
        let generation = Arc::new(ScriptedGeneration {
            reply: None,
            fail: true,
            prompts: Mutex::new(Vec::new()),
        });

        assert!(extractor(generation).extract("q").await.is_err());
    }
}
