//! Configuration for the gateway
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use uuid::Uuid;

use crate::types::{GatewayError, Result};

/// Satchel gateway - learner progress over HTTP
#[derive(Parser, Debug, Clone)]
#[command(name = "satchel-gateway")]
#[command(about = "HTTP gateway for learner progress documents")]
pub struct Args {
    /// Unique node identifier for this gateway instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Directory holding the per-user progress documents
    #[arg(long, env = "DATA_DIR", default_value = "./data")]
    pub data_dir: PathBuf,

    /// Secret key for write-token derivation (required in production)
    #[arg(long, env = "PROGRESS_SECRET")]
    pub progress_secret: Option<String>,

    /// Enable development mode (allows an insecure default secret)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Maximum accepted request body size in bytes
    #[arg(long, env = "MAX_BODY_BYTES", default_value = "262144")]
    pub max_body_bytes: usize,
}

impl Args {
    /// Get effective token secret (uses default in dev mode)
    pub fn progress_secret(&self) -> String {
        if self.dev_mode {
            self.progress_secret
                .clone()
                .unwrap_or_else(|| "dev-only-insecure-secret".to_string())
        } else {
            self.progress_secret
                .clone()
                .expect("PROGRESS_SECRET is required in production mode")
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.dev_mode && self.progress_secret.is_none() {
            return Err(GatewayError::Config(
                "PROGRESS_SECRET is required in production mode".to_string(),
            ));
        }

        if self.max_body_bytes == 0 {
            return Err(GatewayError::Config(
                "MAX_BODY_BYTES must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
