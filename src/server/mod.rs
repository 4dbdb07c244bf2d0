//! Axum-based HTTP server for the cachefront gateway.
//!
//! The catch-all fallback route is the request interceptor: every path not
//! claimed by the control surface is resolved through the cache gateway.
//! The `/control` routes carry the auxiliary channels: the message channel
//! (skip-waiting, version query), sync triggers, push payloads and
//! notification clicks.
//!
//! # Components
//!
//! - `handlers`: Implementation of the interceptor and control endpoints.
//! - `middleware`: Request ID layers.
//! - `routes`: The main router configuration that ties everything together.

mod handlers;
mod middleware;
mod routes;

pub use routes::{create_router, AppState};
