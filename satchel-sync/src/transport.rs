//! Transport to the remote progress store
//!
//! A small trait seam so the sync client can run against the real
//! gateway over HTTP or an in-memory fake in tests. "No prior
//! document" is not an error at this layer - it maps to `Ok(None)` so
//! a first-time learner can proceed.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use satchel_core::{ProgressDocument, Username};

/// Transport failures, mirrored from the gateway's wire contract
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("username rejected by the store")]
    InvalidUsername,

    #[error("write token rejected by the store")]
    Unauthorized,

    #[error("store rejected the document: {0}")]
    Rejected(String),

    #[error("store unavailable: {0}")]
    Service(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Read/write access to the remote document store
#[async_trait]
pub trait ProgressTransport: Send + Sync {
    /// Fetch the stored document. `Ok(None)` when none exists yet.
    async fn fetch(&self, username: &Username)
        -> Result<Option<ProgressDocument>, TransportError>;

    /// Overwrite the stored document with the given snapshot.
    async fn store(
        &self,
        username: &Username,
        token: &str,
        document: &ProgressDocument,
    ) -> Result<(), TransportError>;
}

/// Error body shape used by the gateway
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP transport speaking the gateway wire protocol
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport against a gateway base URL
    /// (e.g. `https://progress.example.org`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => format!("unexpected status {}", status),
        }
    }
}

#[async_trait]
impl ProgressTransport for HttpTransport {
    async fn fetch(
        &self,
        username: &Username,
    ) -> Result<Option<ProgressDocument>, TransportError> {
        let url = format!("{}/progress/{}.json", self.base_url, username.as_str());
        debug!(%url, "fetching progress document");

        let response = self.client.get(&url).send().await?;
        match response.status().as_u16() {
            200 => Ok(Some(response.json().await?)),
            404 => Ok(None),
            400 => Err(TransportError::InvalidUsername),
            _ => Err(TransportError::Service(Self::error_message(response).await)),
        }
    }

    async fn store(
        &self,
        username: &Username,
        token: &str,
        document: &ProgressDocument,
    ) -> Result<(), TransportError> {
        let url = format!("{}/progress", self.base_url);
        let body = serde_json::json!({
            "username": username.as_str(),
            "progress": document,
            "token": token,
        });
        debug!(%url, username = %username, "storing progress document");

        let response = self.client.put(&url).json(&body).send().await?;
        match response.status().as_u16() {
            200 => Ok(()),
            401 => Err(TransportError::Unauthorized),
            400 => Err(TransportError::Rejected(
                Self::error_message(response).await,
            )),
            _ => Err(TransportError::Service(Self::error_message(response).await)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let t = HttpTransport::new("http://localhost:8080/");
        assert_eq!(t.base_url, "http://localhost:8080");
    }
}
