// Upstream origin client

use crate::config::UpstreamConfig;
use crate::error::{GatewayError, Result};
use crate::metrics;
use crate::store::RequestIdentity;
use bytes::Bytes;
use reqwest::{Client, Method};
use std::time::Duration;
use tracing::debug;

/// Hop-by-hop headers never copied into a snapshot or forwarded response.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "content-length",
];

/// A response fetched from the network, with its body fully read.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    /// Whether the response came from the configured origin. Cross-origin
    /// responses are never cached, mirroring opaque-response handling.
    pub same_origin: bool,
}

/// Client for the static site origin.
pub struct UpstreamClient {
    http_client: Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    /// Create a new upstream client with connection pooling and keep-alive.
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .build()
            .map_err(|e| GatewayError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config: config.clone(),
        })
    }

    pub fn origin(&self) -> &str {
        &self.config.origin
    }

    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts
    }

    /// Join a request path (with query) onto the configured origin.
    pub fn url_for(&self, path_and_query: &str) -> String {
        format!(
            "{}{}",
            self.config.origin.trim_end_matches('/'),
            path_and_query
        )
    }

    /// Whether an absolute URL points at the configured origin.
    pub fn is_same_origin(&self, url: &str) -> bool {
        url.starts_with(self.config.origin.trim_end_matches('/'))
    }

    /// Fetch a request from the network.
    pub async fn fetch(&self, identity: &RequestIdentity) -> Result<FetchedResponse> {
        debug!("Fetching {} {}", identity.method, identity.url);

        let method = Method::from_bytes(identity.method.as_bytes())
            .map_err(|e| GatewayError::InvalidRequest(format!("Bad method: {}", e)))?;

        let response = self
            .http_client
            .request(method, &identity.url)
            .send()
            .await
            .map_err(|e| {
                metrics::record_upstream("fetch", "error");
                classify_fetch_error(e)
            })?;

        let status = response.status().as_u16();
        let headers = copy_headers(response.headers());
        let body = response.bytes().await.map_err(classify_fetch_error)?;

        metrics::record_upstream("fetch", "ok");
        Ok(FetchedResponse {
            status,
            headers,
            body,
            same_origin: self.is_same_origin(&identity.url),
        })
    }

    /// Forward a request untouched, headers and body included. Used for
    /// the non-intercepted path; errors propagate raw.
    pub async fn pass_through(
        &self,
        method: &str,
        url: &str,
        headers: &reqwest::header::HeaderMap,
        body: Bytes,
    ) -> Result<FetchedResponse> {
        debug!("Passing through {} {}", method, url);

        let method = Method::from_bytes(method.as_bytes())
            .map_err(|e| GatewayError::InvalidRequest(format!("Bad method: {}", e)))?;

        let mut request = self.http_client.request(method, url).body(body);
        for (name, value) in headers {
            // Host is the upstream's; hop-by-hop headers never cross
            if name == reqwest::header::HOST || HOP_BY_HOP.contains(&name.as_str()) {
                continue;
            }
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(|e| {
            metrics::record_upstream("pass_through", "error");
            classify_fetch_error(e)
        })?;

        let status = response.status().as_u16();
        let headers = copy_headers(response.headers());
        let body = response.bytes().await.map_err(classify_fetch_error)?;

        metrics::record_upstream("pass_through", "ok");
        Ok(FetchedResponse {
            status,
            headers,
            body,
            same_origin: self.is_same_origin(url),
        })
    }

    /// POST a JSON payload to an origin endpoint, returning the status.
    pub async fn post_json(&self, path: &str, payload: &serde_json::Value) -> Result<u16> {
        let url = self.url_for(path);
        let response = self
            .http_client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                metrics::record_upstream("post", "error");
                classify_fetch_error(e)
            })?;
        metrics::record_upstream("post", "ok");
        Ok(response.status().as_u16())
    }

    /// GET an origin endpoint, returning status and body text.
    pub async fn get_text(&self, path: &str) -> Result<(u16, String)> {
        let url = self.url_for(path);
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| {
                metrics::record_upstream("get", "error");
                classify_fetch_error(e)
            })?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify_fetch_error)?;
        metrics::record_upstream("get", "ok");
        Ok((status, body))
    }
}

/// Copy response headers, dropping hop-by-hop ones and values that are
/// not valid UTF-8.
fn copy_headers(headers: &reqwest::header::HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter(|(name, _)| !HOP_BY_HOP.contains(&name.as_str()))
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

/// Map transport failures (no connectivity, DNS, timeout) to
/// `NetworkUnreachable` so the resolver can apply offline fallbacks;
/// everything else stays an upstream error.
fn classify_fetch_error(e: reqwest::Error) -> GatewayError {
    if e.is_connect() || e.is_timeout() {
        GatewayError::NetworkUnreachable(e.to_string())
    } else {
        GatewayError::Upstream(e.to_string())
    }
}
