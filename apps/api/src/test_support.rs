//! Test doubles and request helpers shared by handler and router tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use bytes::Bytes;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use crate::config::Config;
use crate::credentials::ResolvedCredentials;
use crate::llm_client::{CompletionGateway, CompletionResult, Sampling};
use crate::reader::extract::{ExtractError, PageExtractor};
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

/// One call seen by `ScriptedGateway`.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub system: String,
    pub user: String,
    pub sampling: Sampling,
}

/// Replays scripted results in order and records every call.
#[derive(Default)]
pub struct ScriptedGateway {
    script: Mutex<VecDeque<CompletionResult>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedGateway {
    pub fn new(results: impl IntoIterator<Item = CompletionResult>) -> Self {
        Self {
            script: Mutex::new(results.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn replying<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(texts.into_iter().map(|t| CompletionResult::Success {
            text: t.to_string(),
        }))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionGateway for ScriptedGateway {
    async fn complete(
        &self,
        credentials: &ResolvedCredentials,
        system: &str,
        user: &str,
        sampling: Sampling,
    ) -> CompletionResult {
        self.calls.lock().unwrap().push(RecordedCall {
            api_key: credentials.api_key.clone(),
            base_url: credentials.base_url.clone(),
            model: credentials.model.as_str().to_string(),
            system: system.to_string(),
            user: user.to_string(),
            sampling,
        });
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(CompletionResult::Failure {
                reason: "no scripted reply left".to_string(),
            })
    }
}

/// Returns fixed pages, or fails when built with `failing`.
pub struct StubExtractor {
    pages: Option<Vec<String>>,
}

impl StubExtractor {
    pub fn with_pages(pages: &[&str]) -> Self {
        Self {
            pages: Some(pages.iter().map(|p| p.to_string()).collect()),
        }
    }

    pub fn failing() -> Self {
        Self { pages: None }
    }
}

#[async_trait]
impl PageExtractor for StubExtractor {
    async fn pages(&self, _bytes: Bytes) -> Result<Vec<String>, ExtractError> {
        self.pages
            .clone()
            .ok_or_else(|| ExtractError::Parse("invalid PDF header".to_string()))
    }
}

pub fn test_config(default_api_key: Option<&str>) -> Config {
    Config {
        default_api_key: default_api_key.map(String::from),
        default_base_url: "https://api.deepseek.com".to_string(),
        port: 0,
        rust_log: "debug".to_string(),
        session_ttl: std::time::Duration::from_secs(2 * 60 * 60),
        session_sweep_interval: std::time::Duration::from_secs(5 * 60),
    }
}

pub fn test_state(gateway: Arc<ScriptedGateway>, extractor: StubExtractor) -> AppState {
    AppState {
        config: test_config(Some("sk-system-default-key")),
        sessions: SessionStore::new(),
        llm: gateway,
        extractor: Arc::new(extractor),
    }
}

pub fn test_app(gateway: Arc<ScriptedGateway>, extractor: StubExtractor) -> Router {
    build_router(test_state(gateway, extractor))
}

pub fn json_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Multipart upload with a single `file` field.
pub fn upload_request(uri: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let boundary = "quill-test-boundary";
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn send_raw(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body)
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, _, body) = send_raw(app, request).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

/// Creates a session through the API and returns its id.
pub async fn create_session(app: &Router) -> String {
    let (status, body) = send(app, json_request(Method::POST, "/api/v1/sessions", None)).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}
