//! Filesystem-backed progress store
//!
//! Documents live at `{data_dir}/progress/{username}.json`. Writes go
//! through a temp file and rename so a crashed write never leaves a
//! half-written document behind.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{document_path, ProgressStore};
use crate::types::Result;
use satchel_core::Username;

/// Store backed by one file per username under a data directory
#[derive(Debug, Clone)]
pub struct FsStore {
    data_dir: PathBuf,
}

impl FsStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn path_for(&self, username: &Username) -> PathBuf {
        self.data_dir.join(document_path(username))
    }
}

#[async_trait]
impl ProgressStore for FsStore {
    async fn read(&self, username: &Username) -> Result<Option<Bytes>> {
        let path = self.path_for(username);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(Bytes::from(bytes))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, username: &Username, document: &[u8]) -> Result<()> {
        let path = self.path_for(username);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write-then-rename keeps the previous document intact if the
        // process dies mid-write
        let tmp = temp_path(&path);
        tokio::fs::write(&tmp, document).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(username = %username, bytes = document.len(), "progress document stored");
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".tmp");
    PathBuf::from(os)
}
