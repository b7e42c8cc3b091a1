//! Where notes are read from and written back to.

use std::future::Future;
use std::path::{Path, PathBuf};

use contextkeys_shared::{ContextKeysError, Result};
use tracing::debug;

/// Source and sink for note text.
pub trait DocumentStore: Send + Sync {
    /// Read the full text of a note.
    fn read(&self, id: &Path) -> impl Future<Output = Result<String>> + Send;

    /// Replace the full text of a note.
    fn write(&self, id: &Path, text: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Notes stored as UTF-8 files on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDocumentStore;

impl FsDocumentStore {
    /// Sibling path used while a write is in flight.
    fn staging_path(path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!(".{name}.contextkeys.tmp"))
    }
}

impl DocumentStore for FsDocumentStore {
    async fn read(&self, id: &Path) -> Result<String> {
        tokio::fs::read_to_string(id)
            .await
            .map_err(|e| ContextKeysError::io(id, e))
    }

    /// Written to a staging file first, then renamed over the note.
    async fn write(&self, id: &Path, text: &str) -> Result<()> {
        let staging = Self::staging_path(id);
        tokio::fs::write(&staging, text)
            .await
            .map_err(|e| ContextKeysError::io(&staging, e))?;

        if let Err(e) = tokio::fs::rename(&staging, id).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(ContextKeysError::io(id, e));
        }

        debug!(path = %id.display(), bytes = text.len(), "note written");
        Ok(())
    }
}
