// HTTP routes configuration

use super::handlers::{
    gateway_handler, health_handler, message_handler, metrics_handler,
    notification_click_handler, periodic_sync_handler, push_handler, sync_handler,
};
use super::middleware::request_id_layers;
use crate::config::AppConfig;
use crate::error::Result;
use crate::gateway::CacheGateway;
use crate::store::{CacheStore, Tier};
use crate::upstream::UpstreamClient;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub gateway: Arc<CacheGateway>,
    pub store: Arc<CacheStore>,
    pub static_tier: Arc<Tier>,
    pub dynamic_tier: Arc<Tier>,
    pub upstream: Arc<UpstreamClient>,
}

pub fn create_router(state: AppState) -> Result<Router> {
    let (set_request_id, propagate_request_id) = request_id_layers();

    // /control is the gateway's own surface; everything else is
    // intercepted and resolved through the cache tiers.
    let app = Router::new()
        .route("/control/health", get(health_handler))
        .route("/control/metrics", get(metrics_handler))
        .route("/control/message", post(message_handler))
        .route("/control/sync", post(sync_handler))
        .route("/control/periodic-sync", post(periodic_sync_handler))
        .route("/control/push", post(push_handler))
        .route("/control/notification-click", post(notification_click_handler))
        .fallback(gateway_handler)
        // Pass-through POST bodies (e.g. form submissions) stay small
        .layer(tower_http::limit::RequestBodyLimitLayer::new(10 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id)
        .layer(set_request_id)
        .with_state(state);

    Ok(app)
}
