//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling: one accept loop,
//! a spawned task per connection, and a single method/path match for
//! routing.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::Args;
use crate::routes;
use crate::routes::progress::{ERR_INVALID_PROGRESS, ERR_INVALID_USERNAME};
use crate::store::{FsStore, ProgressStore};
use crate::types::GatewayError;

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Document store, one JSON file per username
    pub store: Arc<dyn ProgressStore>,
    /// Server secret for write-token derivation
    pub secret: String,
}

impl AppState {
    /// Create AppState with the filesystem store from config
    pub fn new(args: Args) -> Self {
        let secret = args.progress_secret();
        let store = Arc::new(FsStore::new(args.data_dir.clone()));
        Self { args, store, secret }
    }

    /// Create AppState over any store (tests, dev without a data dir)
    pub fn with_store(args: Args, store: Arc<dyn ProgressStore>) -> Self {
        let secret = args.progress_secret();
        Self { args, store, secret }
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), GatewayError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "Satchel gateway listening on {} as node {}",
        state.args.listen, state.args.node_id
    );

    if state.args.dev_mode {
        warn!("Development mode enabled - insecure default secret allowed");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests.
///
/// Generic over the body type so integration tests can drive the full
/// router with pre-built requests.
pub async fn handle_request<B>(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<B>,
) -> Result<Response<Full<Bytes>>, B::Error>
where
    B: Body,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    let response = match (method, path.as_str()) {
        // Liveness probe
        (Method::GET, "/health") | (Method::GET, "/healthz") => routes::health_check(),

        // Version info for deployment verification
        (Method::GET, "/version") => routes::version_info(),

        // CORS preflight
        (Method::OPTIONS, _) => preflight_response(),

        // Fetch progress: /progress/{username}.json or /progress?username=u
        (Method::GET, p) if is_progress_path(p) => {
            let raw = match username_from_request(p, req.uri().query()) {
                Some(u) => u,
                None => {
                    return Ok(routes::error_response(
                        StatusCode::BAD_REQUEST,
                        ERR_INVALID_USERNAME,
                    ))
                }
            };
            routes::handle_fetch(state, &raw)
                .await
                .unwrap_or_else(error_to_response)
        }

        // Store progress: whole-document overwrite, token-gated
        (Method::PUT, p) if is_progress_path(p) => {
            // Size is a transport limit checked before the envelope
            // (and its username) is ever examined; the wire
            // validation order starts once the body is in hand.
            if body_too_large(&req, state.args.max_body_bytes) {
                return Ok(routes::error_response(
                    StatusCode::BAD_REQUEST,
                    ERR_INVALID_PROGRESS,
                ));
            }
            let body = req.collect().await?.to_bytes();
            if body.len() > state.args.max_body_bytes {
                return Ok(routes::error_response(
                    StatusCode::BAD_REQUEST,
                    ERR_INVALID_PROGRESS,
                ));
            }
            routes::handle_store(state, body)
                .await
                .unwrap_or_else(error_to_response)
        }

        // Any other method on the progress resource
        (_, p) if is_progress_path(p) => {
            routes::error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
        }

        // Not found
        _ => not_found_response(&path),
    };

    Ok(response)
}

/// Turn a handler error into its wire response
fn error_to_response(err: GatewayError) -> Response<Full<Bytes>> {
    routes::error_response(err.status_code(), err.wire_message())
}

fn is_progress_path(path: &str) -> bool {
    path == "/progress" || path.starts_with("/progress/")
}

/// Extract the raw username from the path (`/progress/{u}.json`) or,
/// for a bare `/progress`, from the `username` query parameter.
fn username_from_request(path: &str, query: Option<&str>) -> Option<String> {
    if let Some(rest) = path.strip_prefix("/progress/") {
        let raw = rest.strip_suffix(".json").unwrap_or(rest);
        return Some(raw.to_string());
    }
    query.and_then(|q| {
        q.split('&')
            .find_map(|p| p.strip_prefix("username="))
            .map(|s| s.to_string())
    })
}

/// Reject obviously oversized uploads before buffering the body
fn body_too_large<B>(req: &Request<B>, max: usize) -> bool {
    req.headers()
        .get(hyper::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok())
        .is_some_and(|len| len > max)
}

/// CORS preflight response
fn preflight_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Headers", "*")
        .header("Access-Control-Allow-Methods", "GET, PUT, OPTIONS")
        .body(Full::new(Bytes::new()))
        .unwrap()
}

/// Not found response
fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": "Not Found",
        "path": path,
    });

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_path_matching() {
        assert!(is_progress_path("/progress"));
        assert!(is_progress_path("/progress/alice123.json"));
        assert!(!is_progress_path("/progression"));
        assert!(!is_progress_path("/health"));
    }

    #[test]
    fn test_username_from_path() {
        assert_eq!(
            username_from_request("/progress/alice123.json", None).as_deref(),
            Some("alice123")
        );
        // Without the .json suffix the raw segment is still the handle
        assert_eq!(
            username_from_request("/progress/alice123", None).as_deref(),
            Some("alice123")
        );
    }

    #[test]
    fn test_username_from_query() {
        assert_eq!(
            username_from_request("/progress", Some("username=bob-the-kid")).as_deref(),
            Some("bob-the-kid")
        );
        assert_eq!(
            username_from_request("/progress", Some("a=1&username=zoe")).as_deref(),
            Some("zoe")
        );
        assert_eq!(username_from_request("/progress", None), None);
    }
}
