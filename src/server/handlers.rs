// HTTP request handlers

use super::routes::AppState;
use crate::error::GatewayError;
use crate::gateway::{InterceptedRequest, RequestDestination};
use crate::metrics;
use crate::notify;
use crate::store::RequestIdentity;
use crate::sync;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header::CONTENT_TYPE, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Largest body accepted on the intercepted path; the router's body
/// limit layer enforces the same bound.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub checks: HashMap<String, HealthCheck>,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    pub message: String,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut checks = HashMap::new();
    let mut overall_status = HealthStatus::Healthy;

    // Check static tier population
    let static_entries = state.static_tier.entry_count().await;
    let manifest_len = state.config.cache.static_manifest.len();
    let static_check = if static_entries == 0 {
        overall_status = HealthStatus::Unhealthy;
        HealthCheck {
            status: "error".to_string(),
            message: "Static tier is empty".to_string(),
        }
    } else if static_entries < manifest_len {
        overall_status = HealthStatus::Degraded;
        HealthCheck {
            status: "warning".to_string(),
            message: format!(
                "Static tier holds {} of {} manifest entries",
                static_entries, manifest_len
            ),
        }
    } else {
        HealthCheck {
            status: "ok".to_string(),
            message: format!("{} entries in {}", static_entries, state.static_tier.name()),
        }
    };
    checks.insert("static_tier".to_string(), static_check);

    // Check dynamic tier
    let dynamic_check = HealthCheck {
        status: "ok".to_string(),
        message: format!(
            "{} entries in {}",
            state.dynamic_tier.entry_count().await,
            state.dynamic_tier.name()
        ),
    };
    checks.insert("dynamic_tier".to_string(), dynamic_check);

    // Check configuration
    let config_check = HealthCheck {
        status: "ok".to_string(),
        message: format!("Origin: {}", state.upstream.origin()),
    };
    checks.insert("configuration".to_string(), config_check);

    Json(HealthResponse {
        status: overall_status,
        version: state.gateway.version(),
        checks,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        metrics::gather_metrics(),
    )
}

/// Message channel accepted from the hosting page.
#[derive(Debug, Deserialize)]
pub struct ControlMessage {
    #[serde(rename = "type")]
    pub kind: String,
}

/// Handler for the `/control/message` channel: `SKIP_WAITING` forces an
/// immediate activation, `GET_VERSION` replies with the current
/// tier-version string.
pub async fn message_handler(
    State(state): State<AppState>,
    Json(message): Json<ControlMessage>,
) -> Result<Json<serde_json::Value>, GatewayError> {
    match message.kind.as_str() {
        "SKIP_WAITING" => {
            info!("SKIP_WAITING received, activating now");
            crate::lifecycle::reclaim(&state.store, &state.config.cache).await?;
            Ok(Json(json!({ "ok": true })))
        }
        "GET_VERSION" => Ok(Json(json!({ "version": state.gateway.version() }))),
        other => Err(GatewayError::InvalidRequest(format!(
            "Unknown message type: {}",
            other
        ))),
    }
}

/// A tag-identified sync trigger.
#[derive(Debug, Deserialize)]
pub struct SyncTrigger {
    pub tag: String,
}

/// Handler for background sync triggers. Sync failures are logged and
/// swallowed; the trigger is always acknowledged.
pub async fn sync_handler(
    State(state): State<AppState>,
    Json(trigger): Json<SyncTrigger>,
) -> StatusCode {
    match trigger.tag.as_str() {
        sync::CONTACT_FORM_TAG => {
            match sync::forms::sync_contact_form(
                &state.dynamic_tier,
                &state.upstream,
                &state.config.sync,
            )
            .await
            {
                Ok(true) => metrics::record_sync(sync::CONTACT_FORM_TAG, "success"),
                Ok(false) => metrics::record_sync(sync::CONTACT_FORM_TAG, "empty"),
                Err(e) => {
                    warn!("Contact form sync failed: {}", e);
                    metrics::record_sync(sync::CONTACT_FORM_TAG, "failure");
                }
            }
        }
        other => debug!("Ignoring unknown sync tag: {}", other),
    }

    StatusCode::ACCEPTED
}

/// Handler for periodic sync triggers. Same swallow-and-acknowledge
/// contract as `sync_handler`.
pub async fn periodic_sync_handler(
    State(state): State<AppState>,
    Json(trigger): Json<SyncTrigger>,
) -> StatusCode {
    match trigger.tag.as_str() {
        sync::CONTENT_TAG => {
            match sync::content::sync_content(&state.upstream, &state.config.sync).await {
                Ok(()) => metrics::record_sync(sync::CONTENT_TAG, "success"),
                Err(e) => {
                    warn!("Content sync failed: {}", e);
                    metrics::record_sync(sync::CONTENT_TAG, "failure");
                }
            }
        }
        other => debug!("Ignoring unknown periodic sync tag: {}", other),
    }

    StatusCode::ACCEPTED
}

/// Handler for push message delivery: builds the fixed notification
/// payload from the optional push text and returns it.
pub async fn push_handler(State(state): State<AppState>, body: String) -> Json<notify::Notification> {
    let payload = if body.trim().is_empty() { None } else { Some(body) };
    let notification = notify::build_push_notification(payload, &state.config.notify);

    info!("Displaying notification: {}", notification.title);
    Json(notification)
}

#[derive(Debug, Deserialize)]
pub struct NotificationClick {
    pub action: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Handler for notification clicks: `open` replies with the URL to open;
/// anything else just closes the notification.
pub async fn notification_click_handler(
    State(state): State<AppState>,
    Json(click): Json<NotificationClick>,
) -> Response {
    if click.action == "open" {
        let url = click
            .url
            .unwrap_or_else(|| state.config.notify.target_url.clone());
        Json(json!({ "open": url })).into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

/// The request interceptor: every non-control request lands here and is
/// resolved through the cache gateway.
pub async fn gateway_handler(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, GatewayError> {
    let (parts, body) = request.into_parts();

    let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| GatewayError::InvalidRequest(format!("Failed to read body: {}", e)))?;

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = state.upstream.url_for(path_and_query);

    let intercepted = InterceptedRequest {
        identity: RequestIdentity::new(parts.method.as_str(), url),
        destination: RequestDestination::from_headers(&parts.headers),
        headers: parts.headers,
        body,
    };

    let method = intercepted.identity.method.clone();
    let start = Instant::now();
    let resolved = state.gateway.resolve(intercepted).await?;
    metrics::record_request(
        &method,
        resolved.source.as_str(),
        resolved.status,
        start.elapsed().as_secs_f64(),
    );

    let mut builder = Response::builder().status(resolved.status);
    for (name, value) in &resolved.headers {
        builder = builder.header(name, value);
    }
    builder
        .body(Body::from(resolved.body))
        .map_err(|e| GatewayError::Internal(format!("Failed to build response: {}", e)))
}
