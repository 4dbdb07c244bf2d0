// Metrics module for Prometheus observability

mod registry;

pub use registry::{
    gather_metrics, CACHE_OPERATIONS, FALLBACKS_TOTAL, LIFECYCLE_RUNS, REQUESTS_TOTAL,
    REQUEST_DURATION, SYNC_RUNS, TIER_ENTRIES, UPSTREAM_REQUESTS,
};

/// Helper to record request metrics
pub fn record_request(method: &str, source: &str, status_code: u16, duration_secs: f64) {
    REQUESTS_TOTAL
        .with_label_values(&[method, source, &status_code.to_string()])
        .inc();

    REQUEST_DURATION
        .with_label_values(&[method, source])
        .observe(duration_secs);
}

/// Helpers to record cache operations
pub fn record_cache_hit() {
    CACHE_OPERATIONS.with_label_values(&["hit"]).inc();
}

pub fn record_cache_miss() {
    CACHE_OPERATIONS.with_label_values(&["miss"]).inc();
}

pub fn record_cache_store() {
    CACHE_OPERATIONS.with_label_values(&["store"]).inc();
}

pub fn record_cache_store_error() {
    CACHE_OPERATIONS.with_label_values(&["store_error"]).inc();
}

/// Helper to record a request sent to the origin
pub fn record_upstream(kind: &str, outcome: &str) {
    UPSTREAM_REQUESTS.with_label_values(&[kind, outcome]).inc();
}

pub fn update_tier_entries(tier: &str, count: usize) {
    TIER_ENTRIES.with_label_values(&[tier]).set(count as f64);
}

/// Helper to record an offline fallback response
pub fn record_fallback(kind: &str) {
    FALLBACKS_TOTAL.with_label_values(&[kind]).inc();
}

/// Helper to record a lifecycle phase run
pub fn record_lifecycle(phase: &str, status: &str) {
    LIFECYCLE_RUNS.with_label_values(&[phase, status]).inc();
}

/// Helper to record a background sync run
pub fn record_sync(tag: &str, status: &str) {
    SYNC_RUNS.with_label_values(&[tag, status]).inc();
}
