//! Fake Consul KV HTTP API for integration tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1. Serves:
//! - `GET /v1/kv/{prefix}?recurse=true` — matching entries with base64 values
//! - `GET /v1/kv/{prefix}?recurse=true&keys=true` — matching keys only
//!
//! Unknown prefixes get a 404, like a real agent. Every KV request is counted
//! so tests can assert how often the cache let a search skip the network.
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn demo() {
//! let api = FakeConsulApi::start().await.unwrap();
//! api.put("app/db/host", "10.0.0.1").await;
//! let settings = api.settings(cache_dir.path());
//! # }
//! ```

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use consul_search_core::Settings;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// State shared between the router and test code.
#[derive(Default)]
struct ApiState {
    /// Entries in insertion order; `None` is a key without a value.
    entries: Vec<(String, Option<Vec<u8>>)>,
    /// Number of KV reads served.
    requests: usize,
    /// When set, requests without this `X-Consul-Token` get a 403.
    token: Option<String>,
    /// Artificial latency before answering.
    delay: Option<Duration>,
    /// Answer every request with this status instead.
    fail_with: Option<StatusCode>,
}

/// Handle to the running fake Consul API server.
pub struct FakeConsulApi {
    addr: SocketAddr,
    state: Arc<Mutex<ApiState>>,
}

impl FakeConsulApi {
    /// Start the fake API on a random port. Returns once it is listening.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(ApiState::default()));

        let app = Router::new()
            .route("/v1/kv/", get(read_kv))
            .route("/v1/kv/{*prefix}", get(read_kv))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(Self { addr, state })
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Settings pointing at this server with the cache under `cache_dir`.
    pub fn settings(&self, cache_dir: &Path) -> Settings {
        let mut settings = Settings::defaults();
        settings.consul.host = Some("127.0.0.1".to_string());
        settings.consul.port = Some(self.port());
        settings.search.cache = cache_dir.to_path_buf();
        settings
    }

    /// A TOML config file body equivalent to [`FakeConsulApi::settings`].
    pub fn config_toml(&self, cache_dir: &Path) -> String {
        format!(
            "[consul]\nhost = \"127.0.0.1\"\nport = {}\n\n[search]\ncache = {:?}\n",
            self.port(),
            cache_dir.display().to_string()
        )
    }

    /// Store a text value.
    pub async fn put(&self, key: &str, value: &str) {
        self.put_raw(key, Some(value.as_bytes().to_vec())).await;
    }

    /// Store raw bytes, or a key with no value.
    pub async fn put_raw(&self, key: &str, value: Option<Vec<u8>>) {
        let mut state = self.state.lock().await;
        match state.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => state.entries.push((key.to_string(), value)),
        }
    }

    pub async fn require_token(&self, token: &str) {
        self.state.lock().await.token = Some(token.to_string());
    }

    pub async fn delay(&self, delay: Duration) {
        self.state.lock().await.delay = Some(delay);
    }

    pub async fn fail_with(&self, status: StatusCode) {
        self.state.lock().await.fail_with = Some(status);
    }

    /// How many KV reads the server has answered.
    pub async fn requests(&self) -> usize {
        self.state.lock().await.requests
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

async fn read_kv(
    uri: Uri,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<Mutex<ApiState>>>,
) -> Response {
    let prefix = uri
        .path()
        .strip_prefix("/v1/kv/")
        .unwrap_or_default()
        .replace("%20", " ");

    let (delay, body) = {
        let mut state = state.lock().await;
        state.requests += 1;

        if let Some(status) = state.fail_with {
            return status.into_response();
        }
        if let Some(token) = &state.token {
            let sent = headers.get("X-Consul-Token").and_then(|v| v.to_str().ok());
            if sent != Some(token.as_str()) {
                return StatusCode::FORBIDDEN.into_response();
            }
        }

        let matching: Vec<_> = state
            .entries
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .collect();

        let body = if matching.is_empty() {
            None
        } else if params.contains_key("keys") {
            Some(serde_json::json!(matching
                .iter()
                .map(|(key, _)| key.clone())
                .collect::<Vec<_>>()))
        } else {
            Some(serde_json::Value::Array(
                matching
                    .iter()
                    .enumerate()
                    .map(|(i, (key, value))| {
                        serde_json::json!({
                            "LockIndex": 0,
                            "Key": key,
                            "Flags": 0,
                            "Value": value.as_ref().map(|v| STANDARD.encode(v)),
                            "CreateIndex": 100 + i,
                            "ModifyIndex": 100 + i,
                        })
                    })
                    .collect(),
            ))
        };
        (state.delay, body)
    };

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    match body {
        Some(body) => axum::Json(body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
