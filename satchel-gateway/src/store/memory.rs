//! In-memory progress store
//!
//! Used by tests and dev setups that don't want files on disk.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::ProgressStore;
use crate::types::{GatewayError, Result};
use satchel_core::Username;

/// Map-backed store with the same overwrite semantics as [`super::FsStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, Bytes>>,
    /// When set, every write fails - lets tests exercise the 500 path
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail with a storage error
    pub fn failing() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            fail_writes: true,
        }
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn read(&self, username: &Username) -> Result<Option<Bytes>> {
        Ok(self.documents.read().await.get(username.as_str()).cloned())
    }

    async fn write(&self, username: &Username, document: &[u8]) -> Result<()> {
        if self.fail_writes {
            return Err(GatewayError::Storage("simulated write failure".into()));
        }
        self.documents
            .write()
            .await
            .insert(username.as_str().to_string(), Bytes::copy_from_slice(document));
        Ok(())
    }
}
