//! Health check endpoint
//!
//! Liveness probe: returns 200 whenever the service is running,
//! regardless of MongoDB or LLM availability.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;

use super::json_response;

/// Health response body
#[derive(Serialize)]
struct HealthResponse {
    healthy: bool,
    version: &'static str,
    timestamp: String,
}

/// Handle GET /health and /healthz
pub fn health_check() -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &HealthResponse {
            healthy: true,
            version: env!("CARGO_PKG_VERSION"),
            timestamp: chrono::Utc::now().to_rfc3339(),
        },
    )
}
