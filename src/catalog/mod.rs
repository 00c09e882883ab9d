//! Static registry of the tools this server exposes.
//!
//! The catalog is built once at startup, either from the built-in
//! `search_documents` tool or from a JSON file, and is read-only afterwards,
//! so it is shared across requests without synchronization.

pub mod types;

pub use types::{Tool, ToolKind, SEARCH_DOCUMENTS};

use crate::config::Config;
use crate::error::{AppError, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: Vec<Tool>,
}

impl ToolCatalog {
    /// Build a catalog, rejecting duplicate tool names.
    pub fn new(tools: Vec<Tool>) -> Result<Self> {
        let mut seen = HashSet::new();
        for tool in &tools {
            if tool.name.trim().is_empty() {
                return Err(AppError::ConfigError("Tool name cannot be empty".to_string()));
            }
            if !seen.insert(tool.name.as_str()) {
                return Err(AppError::ConfigError(format!(
                    "Duplicate tool name: {}",
                    tool.name
                )));
            }
        }
        Ok(Self { tools })
    }

    /// Catalog for the running configuration: the tools file when one is
    /// configured, otherwise the built-in `search_documents` tool.
    pub fn from_config(config: &Config) -> Result<Self> {
        let catalog = match &config.tools_path {
            Some(path) => Self::load(path)?,
            None => Self::new(vec![Tool::search_documents(&config.search_engine_id)])?,
        };

        for tool in &catalog.tools {
            if tool.data_store_id.trim().is_empty() {
                tracing::warn!(tool = %tool.name, "Tool has no data store configured");
            }
        }
        tracing::info!(tools = catalog.len(), "Tool catalog loaded");
        Ok(catalog)
    }

    /// Load tools from a JSON array of `{name, description, dataStoreId, systemPrompt?}`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(format!("Failed to read tools file {}: {}", path.display(), e))
        })?;
        let tools: Vec<Tool> = serde_json::from_str(&raw).map_err(|e| {
            AppError::ConfigError(format!("Invalid tools file {}: {}", path.display(), e))
        })?;
        Self::new(tools)
    }

    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|tool| tool.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tool> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool definitions in catalog order, as returned by `tools/list`.
    pub fn definitions(&self) -> Vec<Value> {
        self.tools.iter().map(Tool::to_definition).collect()
    }
}
