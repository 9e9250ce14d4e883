//! Structured logging configuration.
//!
//! Installs the tracing subscriber (which also receives the library crate's
//! `log` records) and provides helpers for request and security events.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn";

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var.
///
/// # Example
///
/// ```no_run
/// use polyglot_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    // try_init also bridges `log` records into tracing.
    if tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("Logging was already initialized");
        return;
    }

    tracing::info!("Structured logging initialized");
}

/// Log security event with structured data
///
/// # Arguments
///
/// * `event_type` - Type of security event
/// * `subject` - Username or user id involved, if known
/// * `request_id` - Correlation id of the request
/// * `message` - Event message
///
/// # Example
///
/// ```
/// use polyglot_server::logging::log_security_event;
///
/// log_security_event(
///     "failed_login",
///     Some("alice1234"),
///     Some("0b6f3c2e-1f7a-4d2b-9a51-6a7c1d2e3f40"),
///     "Password did not match"
/// );
/// ```
pub fn log_security_event(
    event_type: &str,
    subject: Option<&str>,
    request_id: Option<&str>,
    message: &str,
) {
    tracing::warn!(
        event_type = event_type,
        subject = subject,
        request_id = request_id,
        "SECURITY: {}",
        message
    );
}

/// Log API request/response
///
/// # Arguments
///
/// * `request_id` - Correlation id of the request
/// * `method` - HTTP method
/// * `path` - Route pattern or request path
/// * `status_code` - Response status code
/// * `duration_ms` - Request duration in milliseconds
pub fn log_api_request(
    request_id: &str,
    method: &str,
    path: &str,
    status_code: u16,
    duration_ms: u64,
) {
    if status_code >= 500 {
        tracing::error!(
            request_id = request_id,
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            "API request failed"
        );
    } else {
        tracing::info!(
            request_id = request_id,
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            "API request completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice() {
        init();
        init();
    }

    #[test]
    fn test_log_security_event() {
        // Just ensure it doesn't panic
        log_security_event("test_event", Some("alice1234"), None, "Test message");
        log_security_event("test_event", None, Some("req-1"), "Test message");
    }

    #[test]
    fn test_log_api_request() {
        log_api_request("req-1", "GET", "/languages", 200, 45);
        log_api_request("req-2", "POST", "/auth/login", 500, 120);
    }
}
