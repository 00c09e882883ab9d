use crate::catalog::ToolCatalog;
use crate::config::Config;
use crate::pipeline::{
    AnswerSynthesizer, PromptTemplate, QueryExtractor, SearchClient, ToolPipeline,
};
use crate::services::{DiscoveryEngineClient, GeminiClient, GenerationService, SearchService};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Application state shared across all request handlers.
///
/// The catalog is immutable; the only shared mutable resources are the two
/// upstream clients, which synchronize their own lazy construction.
pub struct AppState {
    pub catalog: Arc<ToolCatalog>,
    pub pipeline: ToolPipeline,
    generation: Arc<dyn GenerationService>,
    search: Arc<dyn SearchService>,
    /// Cleared once shutdown begins.
    pub ready: AtomicBool,
    shut_down: AtomicBool,
}

impl AppState {
    /// Build production state: catalog and prompts from configuration,
    /// REST clients for both upstream services.
    ///
    /// No upstream connection is opened here; clients are created on first
    /// use so the process can start without credentials.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let catalog = ToolCatalog::from_config(&config)?;
        let generation: Arc<dyn GenerationService> = Arc::new(GeminiClient::new(&config));
        let search: Arc<dyn SearchService> = Arc::new(DiscoveryEngineClient::new(&config));
        Self::with_services(config, catalog, generation, search)
    }

    /// Build state around caller-supplied service implementations.
    pub fn with_services(
        config: Config,
        catalog: ToolCatalog,
        generation: Arc<dyn GenerationService>,
        search: Arc<dyn SearchService>,
    ) -> anyhow::Result<Self> {
        let prompts_dir = config.prompts_dir.as_deref();
        let search_params = PromptTemplate::search_params().with_override(prompts_dir)?;
        let answer = PromptTemplate::answer_from_context().with_override(prompts_dir)?;

        let catalog = Arc::new(catalog);
        let pipeline = ToolPipeline::new(
            Arc::clone(&catalog),
            QueryExtractor::new(Arc::clone(&generation), &config.gemini_model, search_params),
            SearchClient::new(
                Arc::clone(&search),
                &config.search_project_id,
                &config.search_location,
            ),
            AnswerSynthesizer::new(Arc::clone(&generation), &config.gemini_model, answer),
        );

        Ok(Self {
            catalog,
            pipeline,
            generation,
            search,
            ready: AtomicBool::new(true),
            shut_down: AtomicBool::new(false),
        })
    }

    /// Check if the service is ready to handle requests.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Stop reporting ready so load balancers drain traffic.
    pub fn begin_shutdown(&self) {
        self.ready.store(false, Ordering::SeqCst);
    }

    /// Release both upstream clients. Only the first call has any effect.
    pub fn shutdown(&self) {
        self.begin_shutdown();
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        self.generation.shutdown();
        self.search.shutdown();
        tracing::info!("Upstream clients shut down");
    }
}
