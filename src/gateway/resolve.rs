// Per-request resolution: cache, network, or fallback

use crate::config::CacheConfig;
use crate::error::{GatewayError, Result};
use crate::gateway::classify::{self, RequestClass};
use crate::gateway::fallback;
use crate::metrics;
use crate::store::{RequestIdentity, ResponseSnapshot, Tier};
use crate::upstream::{FetchedResponse, UpstreamClient};
use axum::http::HeaderMap;
use bytes::Bytes;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// What the requester intends to do with the response, derived from the
/// `Sec-Fetch-Dest` header with `Accept` as a fallback. Decides which
/// offline fallback applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestDestination {
    Document,
    Image,
    Other,
}

impl RequestDestination {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        if let Some(dest) = headers.get("sec-fetch-dest").and_then(|v| v.to_str().ok()) {
            return match dest {
                "document" => Self::Document,
                "image" => Self::Image,
                _ => Self::Other,
            };
        }

        if let Some(accept) = headers.get("accept").and_then(|v| v.to_str().ok()) {
            if accept.contains("text/html") {
                return Self::Document;
            }
            if accept.starts_with("image/") {
                return Self::Image;
            }
        }

        Self::Other
    }
}

/// A request intercepted by the gateway. Headers and body are only used
/// when the request passes through uncached.
#[derive(Debug, Clone)]
pub struct InterceptedRequest {
    pub identity: RequestIdentity,
    pub destination: RequestDestination,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl InterceptedRequest {
    /// A bare GET with no body, as issued by tests and internal lookups.
    pub fn get(url: impl Into<String>, destination: RequestDestination) -> Self {
        Self {
            identity: RequestIdentity::get(url),
            destination,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }
}

/// Where a resolved response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    CacheHit,
    Network,
    OfflinePage,
    PlaceholderImage,
    PassThrough,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CacheHit => "cache",
            Self::Network => "network",
            Self::OfflinePage => "offline_page",
            Self::PlaceholderImage => "placeholder_image",
            Self::PassThrough => "pass_through",
        }
    }
}

/// A resolved response ready to be returned to the requester.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub source: ResponseSource,
}

impl GatewayResponse {
    fn from_snapshot(snapshot: ResponseSnapshot, source: ResponseSource) -> Self {
        Self {
            status: snapshot.status,
            headers: snapshot.headers,
            body: Bytes::from(snapshot.body),
            source,
        }
    }

    fn from_network(fetched: FetchedResponse, source: ResponseSource) -> Self {
        Self {
            status: fetched.status,
            headers: fetched.headers,
            body: fetched.body,
            source,
        }
    }
}

/// The cache gateway. Owns the two current tiers and mediates every
/// intercepted request through them.
pub struct CacheGateway {
    static_tier: Arc<Tier>,
    dynamic_tier: Arc<Tier>,
    upstream: Arc<UpstreamClient>,
    config: CacheConfig,
}

impl CacheGateway {
    pub fn new(
        static_tier: Arc<Tier>,
        dynamic_tier: Arc<Tier>,
        upstream: Arc<UpstreamClient>,
        config: CacheConfig,
    ) -> Self {
        Self {
            static_tier,
            dynamic_tier,
            upstream,
            config,
        }
    }

    /// Version string reported over the message channel.
    pub fn version(&self) -> String {
        self.config.gateway_version()
    }

    /// Resolve one intercepted request. Priority order, first match wins:
    ///
    /// 1. Non-GET or non-http(s): pass through untouched.
    /// 2. Tier-agnostic cache lookup; a hit is returned with no network
    ///    access and no freshness check.
    /// 3. Cache miss: network fetch. Valid same-origin 200s matching a
    ///    dynamic pattern are stored into the dynamic tier off the
    ///    request path; the response is returned either way.
    /// 4. Network failure: offline page for navigations, placeholder
    ///    image for images, propagated error otherwise.
    pub async fn resolve(&self, request: InterceptedRequest) -> Result<GatewayResponse> {
        if !classify::is_intercepted(&request.identity.method, &request.identity.url) {
            let fetched = self
                .upstream
                .pass_through(
                    &request.identity.method,
                    &request.identity.url,
                    &request.headers,
                    request.body,
                )
                .await?;
            return Ok(GatewayResponse::from_network(
                fetched,
                ResponseSource::PassThrough,
            ));
        }

        if let Some(snapshot) = self.match_any(&request.identity).await? {
            debug!("Serving from cache: {}", request.identity.url);
            metrics::record_cache_hit();
            return Ok(GatewayResponse::from_snapshot(
                snapshot,
                ResponseSource::CacheHit,
            ));
        }
        metrics::record_cache_miss();

        match self.upstream.fetch(&request.identity).await {
            Ok(fetched) => {
                // Do not cache errors or opaque responses
                if fetched.status == 200 && fetched.same_origin {
                    self.maybe_store_dynamic(&request.identity, &fetched);
                }
                Ok(GatewayResponse::from_network(
                    fetched,
                    ResponseSource::Network,
                ))
            }
            Err(GatewayError::NetworkUnreachable(reason)) => {
                warn!("Fetch failed for {}: {}", request.identity.url, reason);
                self.offline_fallback(&request, reason).await
            }
            Err(e) => Err(e),
        }
    }

    /// Look the identity up in either tier, static first.
    async fn match_any(&self, identity: &RequestIdentity) -> Result<Option<ResponseSnapshot>> {
        if let Some(snapshot) = self.static_tier.match_entry(identity).await? {
            return Ok(Some(snapshot));
        }
        self.dynamic_tier.match_entry(identity).await
    }

    /// Store a dynamic-candidate response into the dynamic tier off the
    /// request path. Best effort: store failures are logged, never
    /// surfaced to the requester.
    fn maybe_store_dynamic(
        &self,
        identity: &RequestIdentity,
        fetched: &FetchedResponse,
    ) -> Option<JoinHandle<()>> {
        let class = classify::classify(
            &identity.method,
            &identity.url,
            &self.config.static_manifest,
            &self.config.dynamic_prefixes,
        );
        if class != RequestClass::DynamicCandidate {
            return None;
        }

        let snapshot = ResponseSnapshot::new(
            fetched.status,
            fetched.headers.clone(),
            fetched.body.to_vec(),
        );
        let tier = Arc::clone(&self.dynamic_tier);
        let identity = identity.clone();

        Some(tokio::spawn(async move {
            match tier.put(&identity, &snapshot).await {
                Ok(()) => {
                    debug!("Cached dynamic entry: {}", identity.url);
                    metrics::record_cache_store();
                    metrics::update_tier_entries("dynamic", tier.entry_count().await);
                }
                Err(e) => {
                    warn!("Dynamic store failed for {}: {}", identity.url, e);
                    metrics::record_cache_store_error();
                }
            }
        }))
    }

    /// Convert a network failure into a fallback response where one
    /// applies, otherwise propagate it.
    async fn offline_fallback(
        &self,
        request: &InterceptedRequest,
        reason: String,
    ) -> Result<GatewayResponse> {
        match request.destination {
            RequestDestination::Document => {
                let offline =
                    RequestIdentity::get(self.upstream.url_for(&self.config.offline_path));
                if let Some(snapshot) = self.static_tier.match_entry(&offline).await? {
                    metrics::record_fallback("offline_page");
                    return Ok(GatewayResponse::from_snapshot(
                        snapshot,
                        ResponseSource::OfflinePage,
                    ));
                }
                metrics::record_fallback("propagated");
                Err(GatewayError::NetworkUnreachable(reason))
            }
            RequestDestination::Image => {
                metrics::record_fallback("placeholder_image");
                Ok(fallback::placeholder_image())
            }
            RequestDestination::Other => {
                metrics::record_fallback("propagated");
                Err(GatewayError::NetworkUnreachable(reason))
            }
        }
    }
}
