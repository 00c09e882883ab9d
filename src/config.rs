use std::env;
use std::path::PathBuf;

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines (default).
    Pretty,
    /// One JSON object per event, for log shippers.
    Json,
}

impl LogFormat {
    pub fn from_env() -> Self {
        match env::var("LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
    /// Project that owns the search data stores.
    pub search_project_id: String,
    /// Search location. `global` selects the global endpoint.
    pub search_location: String,
    /// Data store searched by the built-in `search_documents` tool.
    pub search_engine_id: String,
    pub gemini_project_id: String,
    /// Generation region. `global` is not served regionally and falls back to `us-central1`.
    pub gemini_location: String,
    pub gemini_model: String,
    /// Bearer token for both upstream services. Only required once a client is first used.
    pub access_token: Option<String>,
    /// Transport timeout applied to every upstream call.
    pub upstream_timeout_secs: u64,
    /// Override for the search endpoint base URL.
    pub search_api_base: Option<String>,
    /// Override for the generation endpoint base URL.
    pub generation_api_base: Option<String>,
    /// Optional JSON file describing the tool catalog.
    pub tools_path: Option<PathBuf>,
    /// Optional directory overriding the built-in prompt templates.
    pub prompts_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout_secs: 5,
            search_project_id: String::new(),
            search_location: "global".to_string(),
            search_engine_id: String::new(),
            gemini_project_id: String::new(),
            gemini_location: "us-central1".to_string(),
            gemini_model: "gemini-2.0-flash".to_string(),
            access_token: None,
            upstream_timeout_secs: 60,
            search_api_base: None,
            generation_api_base: None,
            tools_path: None,
            prompts_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// `GEMINI_PROJECT_ID` falls back to `SEARCH_PROJECT_ID` when unset, so a
    /// single-project deployment only has to name its project once.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let search_project_id = env::var("SEARCH_PROJECT_ID").unwrap_or_default();

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()?,
            shutdown_timeout_secs: env::var("SHUTDOWN_TIMEOUT")
                .unwrap_or_else(|_| defaults.shutdown_timeout_secs.to_string())
                .parse()?,
            gemini_project_id: env::var("GEMINI_PROJECT_ID")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| search_project_id.clone()),
            search_project_id,
            search_location: env::var("SEARCH_LOCATION").unwrap_or(defaults.search_location),
            search_engine_id: env::var("SEARCH_ENGINE_ID").unwrap_or_default(),
            gemini_location: env::var("GEMINI_LOCATION").unwrap_or(defaults.gemini_location),
            gemini_model: env::var("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            access_token: non_empty_var("GOOGLE_OAUTH_ACCESS_TOKEN"),
            upstream_timeout_secs: env::var("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or_else(|_| defaults.upstream_timeout_secs.to_string())
                .parse()?,
            search_api_base: non_empty_var("SEARCH_API_BASE"),
            generation_api_base: non_empty_var("GENERATION_API_BASE"),
            tools_path: non_empty_var("TOOLS_PATH").map(PathBuf::from),
            prompts_dir: non_empty_var("PROMPTS_DIR").map(PathBuf::from),
        })
    }

    /// Base URL of the search service for the configured location.
    pub fn search_base_url(&self) -> String {
        if let Some(base) = &self.search_api_base {
            return base.trim_end_matches('/').to_string();
        }
        if self.search_location == "global" {
            "https://discoveryengine.googleapis.com".to_string()
        } else {
            format!("https://{}-discoveryengine.googleapis.com", self.search_location)
        }
    }

    /// Region used for generation calls.
    pub fn gemini_region(&self) -> &str {
        if self.gemini_location == "global" {
            "us-central1"
        } else {
            &self.gemini_location
        }
    }

    /// Base URL of the generation service for the configured region.
    pub fn generation_base_url(&self) -> String {
        match &self.generation_api_base {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{}-aiplatform.googleapis.com", self.gemini_region()),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
