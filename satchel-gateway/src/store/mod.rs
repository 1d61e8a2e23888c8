//! Remote progress store - one JSON document per username
//!
//! A key-value document store addressed by `progress/{username}.json`.
//! Reads need no authentication; writes overwrite the whole document
//! (the route layer enforces the token before calling in here).
//! Storage errors surface opaquely; no retry lives at this layer.

pub mod fs;
pub mod memory;

use async_trait::async_trait;
use bytes::Bytes;

use crate::types::Result;
use satchel_core::Username;

/// Document storage keyed by canonical username
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Read the stored document verbatim. `None` before first write.
    async fn read(&self, username: &Username) -> Result<Option<Bytes>>;

    /// Overwrite the full document. There is no partial or merge
    /// update - callers supply the entire desired document.
    async fn write(&self, username: &Username, document: &[u8]) -> Result<()>;
}

/// Relative storage path for a username's document
pub fn document_path(username: &Username) -> String {
    format!("progress/{}.json", username.as_str())
}

pub use fs::FsStore;
pub use memory::MemoryStore;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_path_uses_canonical_form() {
        let u = Username::parse("Alice123").unwrap();
        assert_eq!(document_path(&u), "progress/alice123.json");
    }
}
