// Control surface tests - message channel, sync triggers, push payloads

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use cachefront::config::{AppConfig, CacheConfig, UpstreamConfig};
use cachefront::gateway::CacheGateway;
use cachefront::server::{create_router, AppState};
use cachefront::store::{CacheStore, RequestIdentity, ResponseSnapshot};
use cachefront::upstream::UpstreamClient;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

async fn app_fixture(origin: &str, store_dir: &std::path::Path) -> (Router, AppState) {
    let config = AppConfig {
        upstream: UpstreamConfig {
            origin: origin.to_string(),
            ..UpstreamConfig::default()
        },
        cache: CacheConfig {
            store_dir: store_dir.to_string_lossy().to_string(),
            ..CacheConfig::default()
        },
        ..AppConfig::default()
    };

    let store = Arc::new(CacheStore::open(store_dir).await.unwrap());
    let static_tier = Arc::new(store.open_tier(&config.cache.static_tier()).await.unwrap());
    let dynamic_tier = Arc::new(store.open_tier(&config.cache.dynamic_tier()).await.unwrap());
    let upstream = Arc::new(UpstreamClient::new(&config.upstream).unwrap());
    let gateway = Arc::new(CacheGateway::new(
        Arc::clone(&static_tier),
        Arc::clone(&dynamic_tier),
        Arc::clone(&upstream),
        config.cache.clone(),
    ));

    let state = AppState {
        config,
        gateway,
        store,
        static_tier,
        dynamic_tier,
        upstream,
    };
    (create_router(state.clone()).unwrap(), state)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_get_version_replies_with_tier_version() {
    let dir = TempDir::new().unwrap();
    let (app, state) = app_fixture("http://127.0.0.1:1", dir.path()).await;

    let response = app
        .oneshot(post_json("/control/message", json!({"type": "GET_VERSION"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["version"], state.config.cache.gateway_version());
    assert_eq!(body["version"], "portfolio-v1.0.0");
}

#[tokio::test]
async fn test_skip_waiting_reclaims_stale_tiers() {
    let dir = TempDir::new().unwrap();
    let (app, state) = app_fixture("http://127.0.0.1:1", dir.path()).await;

    state.store.open_tier("static-v0.9.0").await.unwrap();

    let response = app
        .oneshot(post_json("/control/message", json!({"type": "SKIP_WAITING"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["ok"], true);
    assert!(!state.store.tier_exists("static-v0.9.0").await);
}

#[tokio::test]
async fn test_unknown_message_type_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (app, _state) = app_fixture("http://127.0.0.1:1", dir.path()).await;

    let response = app
        .oneshot(post_json("/control/message", json!({"type": "REFRESH"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_push_builds_notification_payload() {
    let dir = TempDir::new().unwrap();
    let (app, state) = app_fixture("http://127.0.0.1:1", dir.path()).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/control/push")
                .body(Body::from("New project online"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["title"], state.config.notify.title);
    assert_eq!(body["body"], "New project online");
    assert_eq!(body["vibrate"], json!([200, 100, 200]));
    assert_eq!(body["actions"][0]["action"], "open");
    assert_eq!(body["actions"][1]["action"], "close");
    assert_eq!(body["data"]["url"], "/");
}

#[tokio::test]
async fn test_notification_click_open_and_close() {
    let dir = TempDir::new().unwrap();
    let (app, _state) = app_fixture("http://127.0.0.1:1", dir.path()).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/control/notification-click",
            json!({"action": "open", "url": "/projects"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["open"], "/projects");

    let response = app
        .oneshot(post_json(
            "/control/notification-click",
            json!({"action": "close"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_contact_form_sync_replays_and_deletes() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new_async().await;
    let (app, state) = app_fixture(&server.url(), dir.path()).await;

    let contact = server
        .mock("POST", "/api/contact")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let identity = RequestIdentity::get(format!("{}/form-data", server.url()));
    state
        .dynamic_tier
        .put(
            &identity,
            &ResponseSnapshot::new(
                200,
                vec![("content-type".to_string(), "application/json".to_string())],
                br#"{"name":"Firas","message":"hello"}"#.to_vec(),
            ),
        )
        .await
        .unwrap();

    let response = app
        .oneshot(post_json("/control/sync", json!({"tag": "contact-form-sync"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    contact.assert_async().await;
    // The persisted submission is gone once the origin accepted it
    assert!(state
        .dynamic_tier
        .match_entry(&identity)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_sync_failures_are_swallowed() {
    let dir = TempDir::new().unwrap();
    // Dead origin: the replay itself cannot reach the network
    let (app, state) = app_fixture("http://127.0.0.1:1", dir.path()).await;

    let identity = RequestIdentity::get("http://127.0.0.1:1/form-data");
    state
        .dynamic_tier
        .put(
            &identity,
            &ResponseSnapshot::new(200, vec![], br#"{"name":"x"}"#.to_vec()),
        )
        .await
        .unwrap();

    let response = app
        .oneshot(post_json("/control/sync", json!({"tag": "contact-form-sync"})))
        .await
        .unwrap();

    // Acknowledged anyway, and the submission is kept for the next attempt
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert!(state
        .dynamic_tier
        .match_entry(&identity)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_periodic_sync_polls_updates_endpoint() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new_async().await;
    let (app, _state) = app_fixture(&server.url(), dir.path()).await;

    let updates = server
        .mock("GET", "/api/updates")
        .with_status(200)
        .with_body(r#"{"posts":[]}"#)
        .expect(1)
        .create_async()
        .await;

    let response = app
        .oneshot(post_json("/control/periodic-sync", json!({"tag": "content-sync"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    updates.assert_async().await;
}

#[tokio::test]
async fn test_pass_through_keeps_caller_headers() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new_async().await;
    let (app, _state) = app_fixture(&server.url(), dir.path()).await;

    let contact = server
        .mock("POST", "/api/contact")
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/contact")
                .header("authorization", "Bearer tok")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"name":"x"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    contact.assert_async().await;
}

#[tokio::test]
async fn test_intercepted_route_serves_from_cache() {
    let dir = TempDir::new().unwrap();
    let (app, state) = app_fixture("http://127.0.0.1:1", dir.path()).await;

    let identity = RequestIdentity::get("http://127.0.0.1:1/index.html");
    state
        .static_tier
        .put(
            &identity,
            &ResponseSnapshot::new(
                200,
                vec![("content-type".to_string(), "text/html".to_string())],
                b"<html>cached</html>".to_vec(),
            ),
        )
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/index.html")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"<html>cached</html>");
}
