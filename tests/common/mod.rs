//! Shared fixtures for integration tests: scripted upstream services and
//! request helpers for driving the router.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use docsearch_mcp::{
    error::{AppError, Result},
    services::{SearchPage, SearchRequest},
    AppState, Config, GenerationService, SearchService, Tool, ToolCatalog,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// One scripted generation outcome.
pub enum Reply {
    Text(Option<String>),
    Fail(AppError),
    Panic,
}

impl Reply {
    pub fn text(text: &str) -> Self {
        Reply::Text(Some(text.to_string()))
    }
}

/// Generation service that replays queued replies. An empty queue yields
/// no text.
#[derive(Default)]
pub struct FakeGeneration {
    replies: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<String>>,
    shutdowns: AtomicUsize,
}

impl FakeGeneration {
    pub fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationService for FakeGeneration {
    async fn generate(&self, _model: &str, prompt: &str) -> Result<Option<String>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(e)) => Err(e),
            Some(Reply::Panic) => panic!("generation backend exploded"),
            None => Ok(None),
        }
    }

    fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}

/// Search service that replays queued pages and records every request.
/// An empty queue yields an empty page.
#[derive(Default)]
pub struct FakeSearch {
    responses: Mutex<VecDeque<Result<SearchPage>>>,
    requests: Mutex<Vec<SearchRequest>>,
    shutdowns: AtomicUsize,
}

impl FakeSearch {
    pub fn new(responses: Vec<Result<SearchPage>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            ..Default::default()
        })
    }

    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchService for FakeSearch {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(SearchPage::default()))
    }

    fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn test_config() -> Config {
    Config {
        search_project_id: "test-project".to_string(),
        gemini_project_id: "test-project".to_string(),
        search_engine_id: "engine-1".to_string(),
        ..Config::default()
    }
}

pub fn default_catalog() -> ToolCatalog {
    ToolCatalog::new(vec![Tool::search_documents("engine-1")]).unwrap()
}

pub fn build_state(
    catalog: ToolCatalog,
    generation: Arc<FakeGeneration>,
    search: Arc<FakeSearch>,
) -> Arc<AppState> {
    let state = AppState::with_services(test_config(), catalog, generation, search).unwrap();
    Arc::new(state)
}

/// A page whose hits carry a title, a link and one extractive answer each.
pub fn page_of(documents: &[(&str, &str, &str)]) -> SearchPage {
    let results: Vec<Value> = documents
        .iter()
        .map(|(title, link, content)| {
            json!({
                "id": title,
                "document": {
                    "name": format!("documents/{}", title),
                    "derivedStructData": {
                        "title": title,
                        "link": link,
                        "extractive_answers": [{ "content": content }]
                    }
                }
            })
        })
        .collect();
    serde_json::from_value(json!({ "results": results })).unwrap()
}

pub fn filter_syntax_error() -> AppError {
    AppError::InvalidArgument {
        message: "Unsupported field \"date\" in filter".to_string(),
    }
}

/// POST a raw body to a path and decode the JSON reply.
pub async fn post_raw(app: Router, uri: &str, body: String) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    send(app, req).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    post_raw(app, uri, body.to_string()).await
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!({}));

    (status, body)
}

/// Build a `tools/call` request envelope.
pub fn tool_call(id: i64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments }
    })
}
