//! Prometheus metrics for the HTTP API.
//!
//! Recording goes through the `metrics` facade, so every helper here is a
//! no-op until [`init_metrics`] installs the exporter.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use polyglot_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("POST", "/auth/login", 200);
//! metrics::login_attempts_total(true);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Auth Metrics
// ============================================================================

fn result_label(success: bool) -> &'static str {
    if success { "success" } else { "failure" }
}

/// Increment login attempts counter.
pub fn login_attempts_total(success: bool) {
    metrics::counter!("auth_login_attempts_total", "result" => result_label(success)).increment(1);
}

/// Increment registrations counter.
pub fn registrations_total(success: bool) {
    metrics::counter!("auth_registrations_total", "result" => result_label(success)).increment(1);
}

/// Increment the counter of requests turned away by the auth middleware.
pub fn rejected_requests_total() {
    metrics::counter!("auth_rejected_requests_total").increment(1);
}
