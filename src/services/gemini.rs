use crate::config::Config;
use crate::error::{AppError, Result};
use crate::services::types::{GenerateContentRequest, GenerateContentResponse};
use crate::services::{build_http_client, parse_api_error, GenerationService, LazyClient};
use async_trait::async_trait;
use std::time::Duration;

/// Generation service backed by the Vertex AI `generateContent` REST API.
pub struct GeminiClient {
    http: LazyClient<reqwest::Client>,
    base_url: String,
    project_id: String,
    region: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        let token = config.access_token.clone();
        let timeout = Duration::from_secs(config.upstream_timeout_secs);

        Self {
            http: LazyClient::new("generation", move || {
                build_http_client(token.as_deref(), timeout)
            }),
            base_url: config.generation_base_url(),
            project_id: config.gemini_project_id.clone(),
            region: config.gemini_region().to_string(),
        }
    }

    fn model_url(&self, model: &str) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            self.base_url, self.project_id, self.region, model
        )
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<Option<String>> {
        if self.project_id.trim().is_empty() {
            return Err(AppError::ConfigError(
                "GEMINI_PROJECT_ID (or SEARCH_PROJECT_ID) is not set".to_string(),
            ));
        }

        let client = self.http.get()?;
        let response = client
            .post(self.model_url(model))
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let (_, message) = parse_api_error(&body);
            return Err(AppError::GenerationError(format!(
                "{} {}",
                status.as_u16(),
                message
            )));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::InvalidResponse(e.to_string()))?;

        let text = body.first_text();
        tracing::debug!(
            model,
            prompt_chars = prompt.len(),
            reply_chars = text.as_deref().map_or(0, str::len),
            "Generation completed"
        );
        Ok(text)
    }

    fn shutdown(&self) {
        self.http.shutdown();
    }
}
