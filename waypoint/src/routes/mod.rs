//! HTTP route handlers
//!
//! One module per resource, sharing the JSON request/response helpers
//! defined here. Handlers take the raw hyper request plus shared state
//! and always produce a JSON response; service errors map to a status
//! code via `WaypointError::status`.

pub mod health;
pub mod learning_path;
pub mod mindmap;
pub mod quiz;
pub mod streak;
pub mod user;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, WaypointError};

pub use health::health_check;

/// Build a successful JSON response
pub(crate) fn json_response<T: Serialize>(status: StatusCode, data: &T) -> Response<Full<Bytes>> {
    let body = serde_json::to_vec(data).unwrap_or_default();

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| {
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Full::new(Bytes::from(r#"{"error":"Internal error"}"#)))
                .unwrap()
        })
}

/// Build a JSON error response
pub(crate) fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_response(status, &serde_json::json!({ "error": message }))
}

/// 404 with the standard error shape
pub(crate) fn not_found_response(what: &str) -> Response<Full<Bytes>> {
    error_response(StatusCode::NOT_FOUND, &format!("{} not found", what))
}

/// CORS preflight response
pub(crate) fn preflight_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|_| {
            Response::builder()
                .status(StatusCode::NO_CONTENT)
                .body(Full::new(Bytes::new()))
                .unwrap()
        })
}

/// Convert a handler result into a response, mapping errors to their
/// HTTP status with the standard `{"error": ...}` body.
pub(crate) fn respond(result: Result<Response<Full<Bytes>>>) -> Response<Full<Bytes>> {
    match result {
        Ok(response) => response,
        Err(e) => error_response(e.status(), &e.to_string()),
    }
}

/// Read and deserialize a JSON request body
pub(crate) async fn read_json_body<T: DeserializeOwned>(req: Request<Incoming>) -> Result<T> {
    let body = req
        .into_body()
        .collect()
        .await
        .map_err(|e| WaypointError::InvalidRequest(format!("Failed to read request body: {}", e)))?
        .to_bytes();

    serde_json::from_slice(&body)
        .map_err(|e| WaypointError::InvalidRequest(format!("Invalid JSON: {}", e)))
}

/// Decode a percent-encoded path segment
pub(crate) fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

/// Split the tail of a path (after a known prefix) into exactly `N`
/// decoded segments. Returns None when the segment count differs.
pub(crate) fn path_params<const N: usize>(path: &str, prefix: &str) -> Option<[String; N]> {
    let tail = path.strip_prefix(prefix)?;
    let parts: Vec<&str> = tail.split('/').collect();

    if parts.len() != N || parts.iter().any(|p| p.is_empty()) {
        return None;
    }

    let mut out: [String; N] = std::array::from_fn(|_| String::new());
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = decode_segment(part);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_params_splits_and_decodes() {
        let [google_id, topic] =
            path_params::<2>("/api/learning-path/u1/Quantum%20Physics", "/api/learning-path/")
                .unwrap();
        assert_eq!(google_id, "u1");
        assert_eq!(topic, "Quantum Physics");
    }

    #[test]
    fn path_params_rejects_wrong_arity() {
        assert!(path_params::<2>("/api/learning-path/u1", "/api/learning-path/").is_none());
        assert!(path_params::<2>("/api/learning-path/u1/t1/x", "/api/learning-path/").is_none());
        assert!(path_params::<2>("/api/learning-path/u1//", "/api/learning-path/").is_none());
    }

    #[test]
    fn error_response_has_standard_shape() {
        let resp = error_response(StatusCode::NOT_FOUND, "Learning path not found");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            resp.headers().get("Content-Type").unwrap(),
            "application/json"
        );
    }
}
