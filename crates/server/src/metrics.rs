//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the clipfetch server:
//! - HTTP request metrics (latency, counts)
//! - WebSocket connection metrics
//! - Job counts by status and tool readiness (collected dynamically)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec,
    Opts, Registry, TextEncoder,
};
use tracing::error;

use clipfetch_core::JobStatus;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "clipfetch_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
        ]),
        &["group", "method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("clipfetch_http_requests_total", "Total HTTP requests"),
        &["group", "method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "clipfetch_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// WebSocket Metrics
// =============================================================================

/// Active WebSocket connections.
pub static WS_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "clipfetch_ws_connections_active",
        "Number of active WebSocket connections",
    )
    .unwrap()
});

/// Total WebSocket connections (cumulative).
pub static WS_CONNECTIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "clipfetch_ws_connections_total",
        "Total WebSocket connections since startup",
    )
    .unwrap()
});

/// WebSocket messages sent by type.
pub static WS_MESSAGES_SENT: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("clipfetch_ws_messages_sent_total", "WebSocket messages sent"),
        &["type"],
    )
    .unwrap()
});

/// WebSocket lag events (when client falls behind).
pub static WS_LAG_EVENTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "clipfetch_ws_lag_events_total",
        "WebSocket lag events (client fell behind)",
    )
    .unwrap()
});

// =============================================================================
// Job Metrics (collected dynamically)
// =============================================================================

/// Jobs by current status.
pub static JOBS_BY_STATUS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("clipfetch_jobs_by_status", "Current job count by status"),
        &["status"],
    )
    .unwrap()
});

/// Whether yt-dlp is usable (1) or not (0).
pub static TOOL_INSTALLED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "clipfetch_tool_installed",
        "Whether the download tool is installed (1) or missing (0)",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // WebSocket
    registry
        .register(Box::new(WS_CONNECTIONS_ACTIVE.clone()))
        .unwrap();
    registry
        .register(Box::new(WS_CONNECTIONS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(WS_MESSAGES_SENT.clone()))
        .unwrap();
    registry.register(Box::new(WS_LAG_EVENTS.clone())).unwrap();

    // Jobs
    registry
        .register(Box::new(JOBS_BY_STATUS.clone()))
        .unwrap();
    registry
        .register(Box::new(TOOL_INSTALLED.clone()))
        .unwrap();

    // Core metrics (registry, prober, runner)
    for metric in clipfetch_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so the gauges reflect the registry and toolchain
/// as they are right now.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let status = state.registry().status().await;
    for (job_status, count) in [
        (JobStatus::Pending, status.pending),
        (JobStatus::Starting, status.starting),
        (JobStatus::Probing, status.probing),
        (JobStatus::Downloading, status.downloading),
        (JobStatus::Processing, status.processing),
        (JobStatus::Completed, status.completed),
        (JobStatus::Failed, status.failed),
        (JobStatus::Cancelled, status.cancelled),
    ] {
        JOBS_BY_STATUS
            .with_label_values(&[job_status.as_str()])
            .set(count as i64);
    }

    let tools = state.toolchain().ensure_ready().await;
    TOOL_INSTALLED.set(if tools.tool_installed { 1 } else { 0 });
}

static UUID_SEGMENT: Lazy<regex_lite::Regex> = Lazy::new(|| {
    regex_lite::Regex::new(
        r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
    )
    .unwrap()
});

/// Coarse API area of a request path, used as the `group` label.
pub fn route_group(path: &str) -> &'static str {
    let rest = path.strip_prefix("/api/v1").unwrap_or(path);
    let first = rest.trim_start_matches('/').split('/').next().unwrap_or_default();
    match first {
        "jobs" => "jobs",
        "probe" => "probe",
        "ws" => "ws",
        "health" | "toolchain" | "status" | "metrics" => "ops",
        _ => "other",
    }
}

/// Normalize a path for metric labels (replace job ids with a placeholder).
pub fn normalize_path(path: &str) -> String {
    UUID_SEGMENT.replace_all(path, "{id}").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_job_id() {
        let path = "/api/v1/jobs/550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(normalize_path(path), "/api/v1/jobs/{id}");
    }

    #[test]
    fn test_normalize_path_no_ids() {
        let path = "/api/v1/health";
        assert_eq!(normalize_path(path), "/api/v1/health");
    }

    #[test]
    fn test_route_group() {
        assert_eq!(route_group("/api/v1/jobs"), "jobs");
        assert_eq!(route_group("/api/v1/jobs/{id}"), "jobs");
        assert_eq!(route_group("/api/v1/probe"), "probe");
        assert_eq!(route_group("/api/v1/ws"), "ws");
        assert_eq!(route_group("/api/v1/health"), "ops");
        assert_eq!(route_group("/favicon.ico"), "other");
    }

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["other", "GET", "/test", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("clipfetch_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_contains_core_metrics() {
        // Prometheus only outputs metrics that have been touched
        clipfetch_core::metrics::JOBS_SUBMITTED.inc_by(0);
        clipfetch_core::metrics::JOBS_RUNNING.set(0);
        JOBS_BY_STATUS.with_label_values(&["pending"]).set(0);
        WS_CONNECTIONS_ACTIVE.set(0);

        let output = encode_metrics();
        assert!(output.contains("clipfetch_jobs_submitted_total"));
        assert!(output.contains("clipfetch_jobs_running"));
        assert!(output.contains("clipfetch_jobs_by_status"));
        assert!(output.contains("clipfetch_ws_connections_active"));
    }

    #[test]
    fn test_probe_duration_is_unlabelled() {
        clipfetch_core::metrics::PROBE_DURATION.observe(0.1);

        let output = encode_metrics();
        assert!(output.contains(r#"clipfetch_probe_duration_seconds_bucket{le="0.25"}"#));
        assert!(output.contains("clipfetch_probe_duration_seconds_count"));
    }
}
