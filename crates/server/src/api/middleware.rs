//! Request metrics for the API.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::warn;

use crate::metrics::{
    normalize_path, route_group, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION,
};

/// Records duration, count and in-flight requests, labelled by API group
/// (`jobs`, `probe`, `ws`, `ops`).
///
/// The WebSocket route is counted when the upgrade response is sent, so its
/// duration covers the handshake only.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());
    let group = route_group(&path);

    HTTP_REQUESTS_IN_FLIGHT.inc();
    let response = next.run(request).await;
    HTTP_REQUESTS_IN_FLIGHT.dec();

    let status = response.status();
    if status.is_server_error() {
        warn!(%method, %path, status = status.as_u16(), "Request failed");
    }

    let status = status.as_u16().to_string();
    let labels = [group, method.as_str(), path.as_str(), status.as_str()];
    HTTP_REQUEST_DURATION
        .with_label_values(&labels)
        .observe(started.elapsed().as_secs_f64());
    HTTP_REQUESTS_TOTAL.with_label_values(&labels).inc();

    response
}
