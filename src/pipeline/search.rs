use crate::error::Result;
use crate::pipeline::documents::parse_search_page;
use crate::pipeline::types::{SearchOutcome, StructuredQuery};
use crate::services::types::{ContentSearchSpec, QueryExpansionSpec, SpellCorrectionSpec};
use crate::services::{SearchRequest, SearchService};
use std::sync::Arc;

/// Number of characters of an upstream error message kept in logs.
const LOGGED_ERROR_CHARS: usize = 200;

const DEFAULT_SERVING_CONFIG: &str = "servingConfigs/default_serving_config";

/// Runs structured queries against a tool's data store.
pub struct SearchClient {
    service: Arc<dyn SearchService>,
    project_id: String,
    location: String,
}

impl SearchClient {
    pub fn new(
        service: Arc<dyn SearchService>,
        project_id: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            service,
            project_id: project_id.into(),
            location: location.into(),
        }
    }

    /// Fully-qualified serving target for a data store.
    pub fn serving_config(&self, data_store_id: &str) -> String {
        format!(
            "projects/{}/locations/{}/collections/default_collection/engines/{}/{}",
            self.project_id, self.location, data_store_id, DEFAULT_SERVING_CONFIG
        )
    }

    pub fn build_request(
        &self,
        data_store_id: &str,
        query: &StructuredQuery,
        page_size: u32,
    ) -> SearchRequest {
        SearchRequest {
            serving_config: self.serving_config(data_store_id),
            query: query.query_text.clone(),
            page_size,
            filter: query.filter_expression.clone(),
            order_by: query.sort_expression.clone(),
            content_search_spec: ContentSearchSpec::default(),
            query_expansion_spec: QueryExpansionSpec::default(),
            spell_correction_spec: SpellCorrectionSpec::default(),
        }
    }

    /// Search one data store and return the first page of documents.
    ///
    /// A rejection caused by the filter or sort syntax is retried exactly
    /// once without either; every other failure is returned as is.
    pub async fn search(
        &self,
        data_store_id: &str,
        query: &StructuredQuery,
        page_size: u32,
    ) -> Result<SearchOutcome> {
        let request = self.build_request(data_store_id, query, page_size);
        if let Some(filter) = &request.filter {
            tracing::debug!(filter = %filter, "Search filter");
        }
        if let Some(order_by) = &request.order_by {
            tracing::debug!(order_by = %order_by, "Search order");
        }

        let page = match self.service.search(&request).await {
            Ok(page) => page,
            Err(e) if e.is_filter_syntax_error() => {
                let message: String = e.to_string().chars().take(LOGGED_ERROR_CHARS).collect();
                tracing::warn!(error = %message, "Filter/sort rejected, retrying without them");
                metrics::counter!("search_filter_retries_total").increment(1);
                self.service.search(&request.without_constraints()).await?
            }
            Err(e) => return Err(e),
        };

        // Only the first page is read.
        let more_pages = page.next_page_token.is_some();
        let outcome = parse_search_page(page);
        tracing::debug!(
            data_store = data_store_id,
            documents = outcome.documents.len(),
            more_pages,
            "Search completed"
        );
        Ok(outcome)
    }
}
