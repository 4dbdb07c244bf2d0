//! The cache gateway: fetch interception and cache-tier selection.
//!
//! This is the decision core of the system. Everything else is plumbing
//! around the three operations it supports:
//!
//! - `classify`: derive whether a request is a static, dynamic or
//!   uncacheable candidate from its method and URL.
//! - `resolve`: per-request cache-or-network selection with offline
//!   fallbacks.
//! - `fallback`: synthesized responses for requests that fail offline.

pub mod classify;
pub mod fallback;
pub mod resolve;

pub use classify::{classify, RequestClass};
pub use resolve::{
    CacheGateway, GatewayResponse, InterceptedRequest, RequestDestination, ResponseSource,
};
