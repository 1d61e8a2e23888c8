//! Satchel gateway - HTTP access to learner progress documents
//!
//! One JSON document per username, fetchable by anyone who knows the
//! handle and writable only with the derived write token. The gateway
//! is deliberately small: token derivation, a file-per-user store,
//! and the progress wire protocol.
//!
//! ## Services
//!
//! - **Progress**: `GET /progress/{username}.json` (public read) and
//!   `PUT /progress` (token-gated whole-document overwrite)
//! - **Health**: liveness and version probes for deployments

pub mod auth;
pub mod config;
pub mod routes;
pub mod server;
pub mod store;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{GatewayError, Result};
