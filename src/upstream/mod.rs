//! HTTP client for the origin being fronted.
//!
//! All network access goes through this module: install-time manifest
//! fetches, per-request cache-miss fetches, pass-through forwarding and
//! the background sync endpoints.

mod client;

pub use client::{FetchedResponse, UpstreamClient};
