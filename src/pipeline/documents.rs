//! Flattening of raw search hits into [`RetrievedDocument`]s.

use crate::pipeline::types::{RetrievedDocument, SearchOutcome};
use crate::services::SearchPage;
use serde_json::{Map, Value};

pub const UNTITLED: &str = "(untitled)";
pub const NO_CONTENT: &str = "(no content)";

/// Excerpt lists in the order their text is concatenated.
const SOURCE_FIELDS: [&str; 3] = ["extractive_segments", "extractive_answers", "snippets"];

/// Preferred text fields of a single excerpt.
const TEXT_FIELDS: [&str; 4] = ["content", "snippet", "htmlSnippet", "text"];

/// Minimum length for the any-string fallback to accept a field.
const MIN_FALLBACK_CHARS: usize = 10;

/// Convert the first result page into a [`SearchOutcome`]. Hits without a
/// document or without derived data are skipped.
pub fn parse_search_page(page: SearchPage) -> SearchOutcome {
    let documents = page
        .results
        .into_iter()
        .filter_map(|hit| hit.document?.derived_struct_data)
        .map(|fields| to_document(&fields))
        .collect();

    SearchOutcome { documents }
}

fn to_document(fields: &Map<String, Value>) -> RetrievedDocument {
    let title = fields
        .get("title")
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(UNTITLED)
        .to_string();

    let url = fields
        .get("link")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let parts: Vec<String> = SOURCE_FIELDS
        .iter()
        .filter_map(|key| fields.get(*key).and_then(Value::as_array))
        .flatten()
        .filter_map(extract_text_from_source)
        .collect();

    let content = parts.join("\n\n");
    let content = if content.trim().is_empty() {
        NO_CONTENT.to_string()
    } else {
        content
    };

    RetrievedDocument {
        title,
        content,
        url,
    }
}

/// Best text of one excerpt: the first non-blank preferred field, otherwise
/// the longest string value over [`MIN_FALLBACK_CHARS`] characters.
pub fn extract_text_from_source(source: &Value) -> Option<String> {
    let fields = source.as_object()?;

    let preferred = TEXT_FIELDS
        .iter()
        .filter_map(|key| fields.get(*key).and_then(Value::as_str))
        .find(|text| !text.trim().is_empty());
    if let Some(text) = preferred {
        return Some(clean_text(text));
    }

    // Payload shapes vary between excerpt kinds; keep this heuristic literal.
    let mut longest: Option<&str> = None;
    let mut longest_chars = 0;
    for text in fields.values().filter_map(Value::as_str) {
        let chars = text.chars().count();
        if !text.trim().is_empty() && chars > MIN_FALLBACK_CHARS && chars > longest_chars {
            longest = Some(text);
            longest_chars = chars;
        }
    }
    longest.map(clean_text)
}

/// Strip bold highlight markup and fold newlines into spaces.
fn clean_text(text: &str) -> String {
    text.replace("<b>", "")
        .replace("</b>", "")
        .replace('\n', " ")
}
