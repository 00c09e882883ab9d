//! Values passed between pipeline stages.

/// Search parameters extracted from a free-text question.
///
/// `query_text` is never empty; blank filter and sort expressions are stored
/// as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredQuery {
    pub query_text: String,
    pub filter_expression: Option<String>,
    pub sort_expression: Option<String>,
}

impl StructuredQuery {
    /// A plain text query with no filter or sort.
    pub fn new(query_text: impl Into<String>) -> Self {
        Self {
            query_text: query_text.into(),
            filter_expression: None,
            sort_expression: None,
        }
    }

    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter_expression = non_blank(filter);
        self
    }

    pub fn with_sort(mut self, sort: Option<String>) -> Self {
        self.sort_expression = non_blank(sort);
        self
    }

    /// True when a filter or sort will be sent with the search.
    pub fn has_constraints(&self) -> bool {
        self.filter_expression.is_some() || self.sort_expression.is_some()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// One matched document, flattened for prompting and display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedDocument {
    pub title: String,
    pub content: String,
    /// Empty when the service returned no link.
    pub url: String,
}

/// Documents returned by one search, in service rank order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    pub documents: Vec<RetrievedDocument>,
}

impl SearchOutcome {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Terminal value of one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub text: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}
