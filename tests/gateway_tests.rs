// Gateway resolution tests - cache hits, dynamic caching and offline fallbacks

use axum::http::{HeaderMap, HeaderValue};
use bytes::Bytes;
use cachefront::config::{CacheConfig, UpstreamConfig};
use cachefront::error::GatewayError;
use cachefront::gateway::{
    CacheGateway, InterceptedRequest, RequestDestination, ResponseSource,
};
use cachefront::store::{CacheStore, RequestIdentity, ResponseSnapshot, Tier};
use cachefront::upstream::UpstreamClient;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

struct Fixture {
    gateway: CacheGateway,
    static_tier: Arc<Tier>,
    dynamic_tier: Arc<Tier>,
}

async fn fixture(origin: &str, store_dir: &std::path::Path) -> Fixture {
    let config = CacheConfig {
        store_dir: store_dir.to_string_lossy().to_string(),
        ..CacheConfig::default()
    };
    let store = CacheStore::open(store_dir).await.unwrap();
    let static_tier = Arc::new(store.open_tier(&config.static_tier()).await.unwrap());
    let dynamic_tier = Arc::new(store.open_tier(&config.dynamic_tier()).await.unwrap());
    let upstream = Arc::new(
        UpstreamClient::new(&UpstreamConfig {
            origin: origin.to_string(),
            ..UpstreamConfig::default()
        })
        .unwrap(),
    );

    Fixture {
        gateway: CacheGateway::new(
            Arc::clone(&static_tier),
            Arc::clone(&dynamic_tier),
            upstream,
            config,
        ),
        static_tier,
        dynamic_tier,
    }
}

fn html_snapshot(body: &str) -> ResponseSnapshot {
    ResponseSnapshot::new(
        200,
        vec![("content-type".to_string(), "text/html".to_string())],
        body.as_bytes().to_vec(),
    )
}

#[tokio::test]
async fn test_cached_request_is_served_without_network() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new_async().await;
    let fx = fixture(&server.url(), dir.path()).await;

    let url = format!("{}/index.html", server.url());
    fx.static_tier
        .put(&RequestIdentity::get(&url), &html_snapshot("<html>cached</html>"))
        .await
        .unwrap();

    // The origin must never be contacted for a cache hit
    let network = server
        .mock("GET", "/index.html")
        .expect(0)
        .create_async()
        .await;

    let resolved = fx
        .gateway
        .resolve(InterceptedRequest::get(&url, RequestDestination::Document))
        .await
        .unwrap();

    assert_eq!(resolved.source, ResponseSource::CacheHit);
    assert_eq!(resolved.status, 200);
    assert_eq!(&resolved.body[..], b"<html>cached</html>");
    network.assert_async().await;
}

#[tokio::test]
async fn test_dynamic_pattern_is_cached_after_one_fetch() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new_async().await;
    let fx = fixture(&server.url(), dir.path()).await;

    let network = server
        .mock("GET", "/images/photo.webp")
        .with_status(200)
        .with_header("content-type", "image/webp")
        .with_body("webp-bytes")
        .expect(1)
        .create_async()
        .await;

    let url = format!("{}/images/photo.webp", server.url());
    let first = fx
        .gateway
        .resolve(InterceptedRequest::get(&url, RequestDestination::Image))
        .await
        .unwrap();
    assert_eq!(first.source, ResponseSource::Network);
    assert_eq!(&first.body[..], b"webp-bytes");

    // The dynamic store happens off the request path
    let identity = RequestIdentity::get(&url);
    let mut stored = false;
    for _ in 0..100 {
        if fx.dynamic_tier.match_entry(&identity).await.unwrap().is_some() {
            stored = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(stored, "dynamic tier never received the entry");

    let second = fx
        .gateway
        .resolve(InterceptedRequest::get(&url, RequestDestination::Image))
        .await
        .unwrap();
    assert_eq!(second.source, ResponseSource::CacheHit);
    assert_eq!(&second.body[..], b"webp-bytes");

    // Exactly one network fetch across both requests
    network.assert_async().await;
}

#[tokio::test]
async fn test_non_200_response_is_returned_uncached() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new_async().await;
    let fx = fixture(&server.url(), dir.path()).await;

    server
        .mock("GET", "/images/missing.webp")
        .with_status(404)
        .create_async()
        .await;

    let url = format!("{}/images/missing.webp", server.url());
    let resolved = fx
        .gateway
        .resolve(InterceptedRequest::get(&url, RequestDestination::Image))
        .await
        .unwrap();

    assert_eq!(resolved.source, ResponseSource::Network);
    assert_eq!(resolved.status, 404);
    // Errors are never stored, so nothing is spawned and the tier stays empty
    assert_eq!(fx.dynamic_tier.entry_count().await, 0);
}

#[tokio::test]
async fn test_non_get_passes_through_untouched() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new_async().await;
    let fx = fixture(&server.url(), dir.path()).await;

    let network = server
        .mock("POST", "/api/contact")
        .with_status(200)
        .with_body("accepted")
        .expect(1)
        .create_async()
        .await;

    let mut headers = HeaderMap::new();
    headers.insert("content-type", HeaderValue::from_static("application/json"));

    let url = format!("{}/api/contact", server.url());
    let request = InterceptedRequest {
        identity: RequestIdentity::new("POST", &url),
        destination: RequestDestination::Other,
        headers,
        body: Bytes::from_static(b"{\"name\":\"x\"}"),
    };

    let resolved = fx.gateway.resolve(request).await.unwrap();
    assert_eq!(resolved.source, ResponseSource::PassThrough);
    assert_eq!(resolved.status, 200);
    assert_eq!(fx.dynamic_tier.entry_count().await, 0);
    network.assert_async().await;
}

#[tokio::test]
async fn test_pass_through_forwards_request_headers() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new_async().await;
    let fx = fixture(&server.url(), dir.path()).await;

    // The mock only matches when the credential header arrives intact
    let network = server
        .mock("POST", "/api/contact")
        .match_header("authorization", "Bearer tok")
        .match_header("x-custom", "v1")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let mut headers = HeaderMap::new();
    headers.insert("authorization", HeaderValue::from_static("Bearer tok"));
    headers.insert("x-custom", HeaderValue::from_static("v1"));
    // Hop-by-hop and host headers stay behind
    headers.insert("connection", HeaderValue::from_static("keep-alive"));
    headers.insert("host", HeaderValue::from_static("portfolio.example"));

    let url = format!("{}/api/contact", server.url());
    let request = InterceptedRequest {
        identity: RequestIdentity::new("POST", &url),
        destination: RequestDestination::Other,
        headers,
        body: Bytes::from_static(b"{}"),
    };

    let resolved = fx.gateway.resolve(request).await.unwrap();
    assert_eq!(resolved.status, 200);
    network.assert_async().await;
}

#[tokio::test]
async fn test_navigation_failure_serves_offline_page() {
    let dir = TempDir::new().unwrap();
    // Nothing listens here; every fetch fails with a connect error
    let origin = "http://127.0.0.1:1";
    let fx = fixture(origin, dir.path()).await;

    fx.static_tier
        .put(
            &RequestIdentity::get(format!("{}/offline.html", origin)),
            &html_snapshot("<html>you are offline</html>"),
        )
        .await
        .unwrap();

    let resolved = fx
        .gateway
        .resolve(InterceptedRequest::get(
            format!("{}/projects", origin),
            RequestDestination::Document,
        ))
        .await
        .unwrap();

    assert_eq!(resolved.source, ResponseSource::OfflinePage);
    assert_eq!(&resolved.body[..], b"<html>you are offline</html>");
}

#[tokio::test]
async fn test_image_failure_returns_placeholder() {
    let dir = TempDir::new().unwrap();
    let origin = "http://127.0.0.1:1";
    let fx = fixture(origin, dir.path()).await;

    let resolved = fx
        .gateway
        .resolve(InterceptedRequest::get(
            format!("{}/images/photo.webp", origin),
            RequestDestination::Image,
        ))
        .await
        .unwrap();

    assert_eq!(resolved.source, ResponseSource::PlaceholderImage);
    assert_eq!(
        resolved.headers,
        vec![("content-type".to_string(), "image/svg+xml".to_string())]
    );
    let markup = std::str::from_utf8(&resolved.body).unwrap();
    assert!(markup.contains("صورة غير متاحة"));
}

#[tokio::test]
async fn test_other_failure_propagates() {
    let dir = TempDir::new().unwrap();
    let origin = "http://127.0.0.1:1";
    let fx = fixture(origin, dir.path()).await;

    let result = fx
        .gateway
        .resolve(InterceptedRequest::get(
            format!("{}/api/updates", origin),
            RequestDestination::Other,
        ))
        .await;

    assert!(matches!(result, Err(GatewayError::NetworkUnreachable(_))));
}
