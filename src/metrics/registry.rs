// Prometheus metrics registry and collectors

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec_with_registry, register_gauge_vec_with_registry,
    register_histogram_vec_with_registry, CounterVec, Encoder, GaugeVec, HistogramVec, Opts,
    Registry, TextEncoder,
};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // REQUEST METRICS
    // ============================================================================

    /// Total intercepted requests by resolution source
    pub static ref REQUESTS_TOTAL: CounterVec = register_counter_vec_with_registry!(
        Opts::new("requests_total", "Total intercepted requests"),
        &["method", "source", "status_code"],
        REGISTRY
    ).unwrap();

    /// Request resolution duration histogram
    pub static ref REQUEST_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("request_duration_seconds", "Request resolution duration in seconds")
            .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["method", "source"],
        REGISTRY
    ).unwrap();

    /// Requests sent to the origin
    pub static ref UPSTREAM_REQUESTS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("upstream_requests_total", "Total requests sent to the origin"),
        &["kind", "outcome"], // kind: fetch, pass_through, post, get; outcome: ok, error
        REGISTRY
    ).unwrap();

    // ============================================================================
    // CACHE METRICS
    // ============================================================================

    /// Cache operations
    pub static ref CACHE_OPERATIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("cache_operations_total", "Total cache operations"),
        &["operation"], // operation: hit, miss, store, store_error
        REGISTRY
    ).unwrap();

    /// Current entries per tier
    pub static ref TIER_ENTRIES: GaugeVec = register_gauge_vec_with_registry!(
        Opts::new("tier_entries_current", "Current number of entries per cache tier"),
        &["tier"], // tier: static, dynamic
        REGISTRY
    ).unwrap();

    // ============================================================================
    // FALLBACK METRICS
    // ============================================================================

    /// Offline fallbacks by kind
    pub static ref FALLBACKS_TOTAL: CounterVec = register_counter_vec_with_registry!(
        Opts::new("fallbacks_total", "Total offline fallback responses"),
        &["kind"], // kind: offline_page, placeholder_image, propagated
        REGISTRY
    ).unwrap();

    // ============================================================================
    // LIFECYCLE METRICS
    // ============================================================================

    /// Install/activate runs
    pub static ref LIFECYCLE_RUNS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("lifecycle_runs_total", "Total lifecycle phase runs"),
        &["phase", "status"], // phase: install, activate; status: success, failure
        REGISTRY
    ).unwrap();

    // ============================================================================
    // SYNC METRICS
    // ============================================================================

    /// Background sync runs by tag
    pub static ref SYNC_RUNS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("sync_runs_total", "Total background sync runs"),
        &["tag", "status"], // status: success, failure, empty
        REGISTRY
    ).unwrap();
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        // Just verify metrics are registered without panicking
        CACHE_OPERATIONS.with_label_values(&["hit"]).inc();
        FALLBACKS_TOTAL.with_label_values(&["offline_page"]).inc();

        let metrics = gather_metrics();
        assert!(metrics.contains("cache_operations_total"));
        assert!(metrics.contains("fallbacks_total"));
    }
}
