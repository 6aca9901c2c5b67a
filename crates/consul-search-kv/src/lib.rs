//! consul-search-kv — Consul KV adapter for consul-search.
//!
//! [`ConsulClient`] reads a whole subtree through the agent's HTTP API
//! (`GET /v1/kv/<root>?recurse=true`) and hands it to the search engine as a
//! [`CachePayload`]. Values come back base64 encoded and are decoded to text
//! where they are valid UTF-8, raw bytes otherwise.

pub mod response;

use bytes::Bytes;
use consul_search_core::config::ConsulConfig;
use consul_search_core::{CachePayload, KvError, KvSource};
use http_body_util::{BodyExt, Empty};
use hyper::{StatusCode, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::time::Duration;

/// Characters left as-is in a KV path. `/` separates key segments.
const KEY_PATH: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const TOKEN_HEADER: &str = "X-Consul-Token";

/// HTTP client for one Consul agent.
pub struct ConsulClient {
    http: Client<HttpConnector, Empty<Bytes>>,
    base_url: String,
    token: Option<String>,
    datacenter: Option<String>,
    timeout: Duration,
}

impl ConsulClient {
    /// Build a client for the agent described by `consul`. Only plain `http`
    /// is supported.
    pub fn new(consul: &ConsulConfig) -> Result<Self, KvError> {
        if !consul.scheme.eq_ignore_ascii_case("http") {
            return Err(KvError::InvalidTarget(format!(
                "scheme {:?} is not supported, point consul.scheme at a plain http agent",
                consul.scheme
            )));
        }
        let (host, port) = consul.agent_address();
        let base_url = format!("http://{host}:{port}");
        base_url
            .parse::<Uri>()
            .map_err(|err| KvError::InvalidTarget(format!("{base_url}: {err}")))?;

        Ok(Self {
            http: Client::builder(TokioExecutor::new()).build_http(),
            base_url,
            token: consul.token.clone().filter(|t| !t.is_empty()),
            datacenter: consul.datacenter.clone().filter(|dc| !dc.is_empty()),
            timeout: Duration::from_secs(consul.timeout_secs),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The request URI for a recursive read of `root`.
    pub fn kv_uri(&self, root: &str, keys_only: bool) -> Result<Uri, KvError> {
        let mut uri = format!(
            "{}/v1/kv/{}?recurse=true",
            self.base_url,
            utf8_percent_encode(root, KEY_PATH)
        );
        if keys_only {
            uri.push_str("&keys=true");
        }
        if let Some(dc) = &self.datacenter {
            uri.push_str("&dc=");
            uri.extend(utf8_percent_encode(dc, NON_ALPHANUMERIC));
        }
        uri.parse()
            .map_err(|err| KvError::InvalidTarget(format!("{uri}: {err}")))
    }

    /// Perform the read and return the response body, or `None` when the
    /// subtree does not exist.
    async fn get(&self, root: &str, keys_only: bool) -> Result<Option<Bytes>, KvError> {
        let uri = self.kv_uri(root, keys_only)?;
        let path = uri.path().to_string();

        let mut request = hyper::Request::get(uri);
        if let Some(token) = &self.token {
            request = request.header(TOKEN_HEADER, token.as_str());
        }
        let request = request
            .body(Empty::new())
            .map_err(|err| KvError::InvalidTarget(err.to_string()))?;

        tracing::debug!(path = %path, keys_only, "consul kv read");

        let exchange = async {
            let response = self.http.request(request).await.map_err(|err| self.transport(err))?;
            let status = response.status();
            let body = response
                .into_body()
                .collect()
                .await
                .map_err(|err| self.transport(err))?
                .to_bytes();
            Ok::<_, KvError>((status, body))
        };

        let (status, body) = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| KvError::Timeout {
                target: self.base_url.clone(),
                secs: self.timeout.as_secs(),
            })??;

        match status {
            StatusCode::NOT_FOUND => {
                tracing::debug!(path = %path, "subtree not found");
                Ok(None)
            }
            status if status.is_success() => Ok(Some(body)),
            status => Err(KvError::Status {
                status: status.as_u16(),
                path,
            }),
        }
    }

    fn transport(&self, err: impl std::error::Error + Send + Sync + 'static) -> KvError {
        KvError::Transport {
            target: self.base_url.clone(),
            source: Box::new(err),
        }
    }
}

impl KvSource for ConsulClient {
    async fn fetch(&self, root: &str, keys_only: bool) -> Result<CachePayload, KvError> {
        let body = self.get(root, keys_only).await?.unwrap_or_default();
        if keys_only {
            Ok(CachePayload::Keys(response::decode_keys(&body)?))
        } else {
            Ok(CachePayload::Entries(response::decode_entries(&body)?))
        }
    }
}
