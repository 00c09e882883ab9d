//! Rendering of a successful tool call as markdown text.

use crate::pipeline::types::{RetrievedDocument, StructuredQuery};

/// Maximum number of documents listed under the references heading.
pub const MAX_REFERENCED_DOCUMENTS: usize = 10;

/// Format the answer, the search conditions actually sent (if any), and the
/// referenced documents.
pub fn format_answer(
    answer: &str,
    query: &StructuredQuery,
    documents: &[RetrievedDocument],
) -> String {
    let mut lines: Vec<String> = vec![
        "## Answer".to_string(),
        String::new(),
        answer.to_string(),
        String::new(),
        "---".to_string(),
        String::new(),
    ];

    if query.has_constraints() {
        lines.push("### Search conditions".to_string());
        if let Some(filter) = &query.filter_expression {
            lines.push(format!("- Filter: {}", filter));
        }
        if let Some(order_by) = &query.sort_expression {
            lines.push(format!("- Sort: {}", order_by));
        }
        lines.push(String::new());
    }

    lines.push("### Referenced documents".to_string());
    for (i, doc) in documents.iter().take(MAX_REFERENCED_DOCUMENTS).enumerate() {
        lines.push(format!("{}. **{}**", i + 1, doc.title));
        if !doc.url.trim().is_empty() {
            lines.push(format!("   - URL: {}", doc.url));
        }
    }
    lines.push(String::new());

    lines.join("\n")
}
