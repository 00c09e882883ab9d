use crate::error::{AppError, Result};
use std::collections::HashMap;
use std::path::Path;

const SEARCH_PARAMS: &str = include_str!("../../prompts/search_params.txt");
const ANSWER_FROM_CONTEXT: &str = include_str!("../../prompts/answer_from_context.txt");

/// A prompt with `{{name}}` placeholders, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    name: &'static str,
    text: String,
}

impl PromptTemplate {
    pub fn new(name: &'static str, text: impl Into<String>) -> Self {
        Self {
            name,
            text: text.into(),
        }
    }

    /// Template used to turn a question into search parameters.
    /// Placeholders: `current_date`, `user_query`.
    pub fn search_params() -> Self {
        Self::new("search_params", SEARCH_PARAMS)
    }

    /// Template used to answer from retrieved documents.
    /// Placeholders: `context`, `query`.
    pub fn answer_from_context() -> Self {
        Self::new("answer_from_context", ANSWER_FROM_CONTEXT)
    }

    /// Replace the built-in text with `<dir>/<name>.txt` when that file exists.
    pub fn with_override(self, dir: Option<&Path>) -> Result<Self> {
        let Some(dir) = dir else {
            return Ok(self);
        };

        let path = dir.join(format!("{}.txt", self.name));
        if !path.is_file() {
            return Ok(self);
        }

        let text = std::fs::read_to_string(&path).map_err(|e| {
            AppError::ConfigError(format!("Failed to read prompt {}: {}", path.display(), e))
        })?;
        tracing::info!(prompt = self.name, path = %path.display(), "Prompt template overridden");
        Ok(Self::new(self.name, text))
    }

    /// Substitute placeholders in a single pass. Substituted values are not
    /// scanned again, and unknown placeholders are left as they are.
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        let mut out = String::with_capacity(self.text.len());
        let mut rest = self.text.as_str();

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let key = after[..end].trim();
                    match vars.get(key) {
                        Some(value) => out.push_str(value),
                        None => out.push_str(&rest[start..start + 2 + end + 2]),
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}
