//! Utility functions and helpers for the cachefront gateway.
//!
//! This module provides cross-cutting concerns like structured logging
//! and retry logic with backoff.
//!
//! # Submodules
//!
//! - `logging`: Tracing and logging initialization.
//! - `retry`: Retry mechanisms that respect upstream `Retry-After` hints.

pub mod logging;
pub mod retry;
