//! Test doubles shared by the integration specs.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use curriculum_wizard::error::AppError;
use curriculum_wizard::gateway::{CompletionBackend, CompletionRequest};
use curriculum_wizard::provider::{ProviderClient, ProviderConfig};

pub const TEST_KEY: &str = "sk-test";

/// A stand-in for the provider's messages endpoint.
///
/// Replies depend on the prompt: `trigger <status>` answers with that status,
/// `trigger empty` answers with no text blocks, anything else is echoed.
pub struct Upstream {
    pub url: String,
    pub hits: Arc<AtomicUsize>,
}

impl Upstream {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn provider(&self) -> ProviderClient {
        provider_for(&self.url, Some(TEST_KEY))
    }
}

pub fn provider_for(url: &str, api_key: Option<&str>) -> ProviderClient {
    ProviderClient::new(ProviderConfig {
        base_url: url.to_string(),
        api_key: api_key.map(str::to_string),
        ..ProviderConfig::default()
    })
    .expect("provider client builds")
}

async fn fake_messages(
    State(hits): State<Arc<AtomicUsize>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    hits.fetch_add(1, Ordering::SeqCst);

    if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some(TEST_KEY) {
        return (StatusCode::UNAUTHORIZED, "invalid x-api-key").into_response();
    }
    if headers.get("anthropic-version").is_none() {
        return (StatusCode::BAD_REQUEST, "missing anthropic-version").into_response();
    }

    let prompt = body["messages"][0]["content"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    match prompt.strip_prefix("trigger ") {
        Some("empty") => Json(json!({ "content": [] })).into_response(),
        Some(code) => {
            let status = code
                .parse::<u16>()
                .ok()
                .and_then(|c| StatusCode::from_u16(c).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, format!("upstream says {}", code)).into_response()
        }
        None => Json(json!({
            "content": [
                { "type": "text", "text": "echo: " },
                { "type": "text", "text": prompt }
            ]
        }))
        .into_response(),
    }
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server runs");
    });
    addr
}

pub async fn spawn_upstream() -> Upstream {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/v1/messages", post(fake_messages))
        .with_state(hits.clone());
    let addr = serve(app).await;
    Upstream {
        url: format!("http://{}", addr),
        hits,
    }
}

/// Serve any router on a local port and return its base URL.
pub async fn spawn_router(app: Router) -> String {
    format!("http://{}", serve(app).await)
}

/// A URL nothing is listening on.
pub async fn closed_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    drop(listener);
    format!("http://{}", addr)
}

/// Backend answering from a fixed script, recording every request.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String, AppError>>>,
    pub seen: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<Result<String, AppError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AppError> {
        self.seen.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()))
    }
}
