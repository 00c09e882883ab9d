use crate::config::Config;
use crate::error::{AppError, Result};
use crate::services::types::{SearchPage, SearchRequest};
use crate::services::{build_http_client, parse_api_error, LazyClient, SearchService};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

/// Search service backed by the Discovery Engine `:search` REST API.
pub struct DiscoveryEngineClient {
    http: LazyClient<reqwest::Client>,
    base_url: String,
}

impl DiscoveryEngineClient {
    pub fn new(config: &Config) -> Self {
        let token = config.access_token.clone();
        let timeout = Duration::from_secs(config.upstream_timeout_secs);

        Self {
            http: LazyClient::new("search", move || {
                build_http_client(token.as_deref(), timeout)
            }),
            base_url: config.search_base_url(),
        }
    }

    fn search_url(&self, serving_config: &str) -> String {
        format!("{}/v1/{}:search", self.base_url, serving_config)
    }
}

#[async_trait]
impl SearchService for DiscoveryEngineClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
        let client = self.http.get()?;
        let response = client
            .post(self.search_url(&request.serving_config))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }

        // Only the first page is consumed; nextPageToken is never followed.
        response
            .json::<SearchPage>()
            .await
            .map_err(|e| AppError::InvalidResponse(e.to_string()))
    }

    fn shutdown(&self) {
        self.http.shutdown();
    }
}

fn classify_failure(status: StatusCode, body: &str) -> AppError {
    let (api_status, message) = parse_api_error(body);
    if status == StatusCode::BAD_REQUEST || api_status.as_deref() == Some("INVALID_ARGUMENT") {
        AppError::InvalidArgument { message }
    } else {
        AppError::SearchError {
            status: status.as_u16(),
            message,
        }
    }
}
