//! Progress document routes
//!
//! Two operations on one resource: unauthenticated fetch by username,
//! and token-gated whole-document overwrite. Error bodies are part of
//! the wire contract - the lesson client matches on them verbatim.
//! Handlers return `GatewayError` on failure; the router turns it into
//! the wire response via `status_code()` / `wire_message()`.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use super::json_response;
use crate::auth;
use crate::server::AppState;
use crate::types::{GatewayError, Result};
use satchel_core::{ProgressDocument, Username};

pub(crate) const ERR_INVALID_USERNAME: &str = "Invalid username format.";
pub(crate) const ERR_NOT_FOUND: &str = "No progress found for this username.";
pub(crate) const ERR_INVALID_TOKEN: &str = "Invalid or missing authentication token.";
pub(crate) const ERR_INVALID_PROGRESS: &str = "Invalid progress data.";

/// Store-progress request body
#[derive(Debug, Deserialize)]
struct StoreRequest {
    username: String,
    progress: Value,
    #[serde(default)]
    token: Option<String>,
}

/// GET progress for a username. Public by design: readable by handle
/// alone so "load my progress on login" needs no login step.
pub async fn handle_fetch(
    state: Arc<AppState>,
    raw_username: &str,
) -> Result<Response<Full<Bytes>>> {
    let username = match Username::parse(raw_username) {
        Ok(u) => u,
        Err(e) => {
            warn!(username = raw_username, error = %e, "rejected progress fetch");
            return Err(GatewayError::BadRequest(ERR_INVALID_USERNAME.to_string()));
        }
    };

    let document = match state.store.read(&username).await {
        Ok(Some(document)) => document,
        Ok(None) => return Err(GatewayError::NotFound(ERR_NOT_FOUND.to_string())),
        Err(e) => {
            warn!(username = %username, error = %e, "progress read failed");
            return Err(e);
        }
    };

    // Stored bytes returned verbatim
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Cache-Control", "no-store")
        .body(Full::new(document))
        .unwrap())
}

/// PUT progress: validate username, then token, then payload shape,
/// then overwrite the stored document whole.
///
/// The stored bytes are the gateway's own serialization of the
/// validated document, so unknown payload fields are dropped and key
/// order is normalized. Fetches return that normalized form, not the
/// caller's exact bytes.
pub async fn handle_store(state: Arc<AppState>, body: Bytes) -> Result<Response<Full<Bytes>>> {
    // A body that isn't the expected envelope has no valid username in
    // it, which is the first check in the validation order.
    let request: StoreRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(_) => return Err(GatewayError::BadRequest(ERR_INVALID_USERNAME.to_string())),
    };

    let username = match Username::parse(&request.username) {
        Ok(u) => u,
        Err(e) => {
            warn!(username = %request.username, error = %e, "rejected progress store");
            return Err(GatewayError::BadRequest(ERR_INVALID_USERNAME.to_string()));
        }
    };

    let token_ok = request
        .token
        .as_deref()
        .is_some_and(|t| auth::verify_token(&username, t, &state.secret));
    if !token_ok {
        warn!(username = %username, "write token rejected");
        return Err(GatewayError::Unauthorized(ERR_INVALID_TOKEN.to_string()));
    }

    let document = validate_progress(&request.progress)
        .ok_or_else(|| GatewayError::BadRequest(ERR_INVALID_PROGRESS.to_string()))?;

    let serialized = serde_json::to_vec(&document)?;

    match state.store.write(&username, &serialized).await {
        Ok(()) => {
            info!(username = %username, xp = document.xp, "progress stored");
            Ok(json_response(StatusCode::OK, r#"{"ok":true}"#.to_string()))
        }
        Err(e) => {
            warn!(username = %username, error = %e, "progress write failed");
            Err(e)
        }
    }
}

/// Shape-check the progress payload: an object with a non-negative
/// numeric `xp` and an object-typed `topics` whose entries parse as
/// topic progress. Returns the typed document on success.
fn validate_progress(progress: &Value) -> Option<ProgressDocument> {
    let obj = progress.as_object()?;
    if !obj.get("xp").is_some_and(Value::is_u64) {
        return None;
    }
    if !obj.get("topics").is_some_and(Value::is_object) {
        return None;
    }
    serde_json::from_value(progress.clone()).ok()
}
