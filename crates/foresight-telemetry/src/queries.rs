//! PromQL expressions for the watched metrics.
//!
//! The expressions are opaque to the rest of the loop; only the
//! `rate()` window varies between the long, short, and fast latency
//! variants.

/// p95 latency in milliseconds over the given rate window.
pub fn latency_p95(window: &str) -> String {
    format!(
        "histogram_quantile(0.95, sum(rate(http_request_duration_seconds_bucket[{window}])) by (le)) * 1000"
    )
}

/// Error fraction over the last five minutes. The tiny addend keeps
/// the denominator non-zero on idle services.
pub fn error_rate() -> String {
    "(sum(increase(http_request_errors_total[5m])))/(sum(increase(http_requests_total[5m]))+1e-9)"
        .to_string()
}

/// Resident memory of the protected process, in bytes.
pub fn resident_memory() -> String {
    "process_resident_memory_bytes".to_string()
}
