//! HTTP route handlers
//!
//! Handlers take pre-collected bodies so the server loop owns all
//! hyper plumbing and tests can drive handlers directly.

pub mod health;
pub mod progress;

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};

pub use health::{health_check, version_info};
pub use progress::{handle_fetch, handle_store};

/// Build a JSON response with the standard headers.
///
/// The lesson UI runs in a browser on a different origin, so every
/// response carries a permissive CORS header.
pub(crate) fn json_response(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Cache-Control", "no-store")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

/// `{"error": message}` with the given status
pub(crate) fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "error": message });
    json_response(status, body.to_string())
}
