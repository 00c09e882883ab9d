//! Seams to the two external collaborators: the generation service that turns
//! a prompt into text, and the search service that runs a structured query
//! against a document index.

pub mod discovery;
pub mod gemini;
pub mod lazy;
pub mod types;

pub use discovery::DiscoveryEngineClient;
pub use gemini::GeminiClient;
pub use lazy::LazyClient;
pub use types::{SearchPage, SearchRequest};

use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::time::Duration;
use types::ApiErrorBody;

/// Turns a prompt into text.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// `Ok(None)` means the service answered but produced no text.
    async fn generate(&self, model: &str, prompt: &str) -> Result<Option<String>>;

    /// Release the underlying connection. Called once during process teardown.
    fn shutdown(&self) {}
}

/// Executes a structured query against a data store.
#[async_trait]
pub trait SearchService: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage>;

    /// Release the underlying connection. Called once during process teardown.
    fn shutdown(&self) {}
}

/// Build an authenticated HTTP client for the upstream REST APIs.
///
/// Fails when no access token is configured, so a process without
/// credentials can still start and report the problem per call.
pub(crate) fn build_http_client(
    access_token: Option<&str>,
    timeout: Duration,
) -> Result<reqwest::Client> {
    let token = access_token.ok_or_else(|| {
        AppError::CredentialsError("GOOGLE_OAUTH_ACCESS_TOKEN is not set".to_string())
    })?;

    let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| AppError::CredentialsError(format!("Invalid access token: {}", e)))?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);

    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()?)
}

/// Extract `(status, message)` from an upstream error body, falling back to
/// the raw body when it is not the usual JSON shape.
pub(crate) fn parse_api_error(body: &str) -> (Option<String>, String) {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) if !parsed.error.message.is_empty() => {
            (parsed.error.status, parsed.error.message)
        }
        _ => (None, body.trim().to_string()),
    }
}
