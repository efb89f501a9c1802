//! Media store trait and filesystem implementation.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{MediaStoreError, Result};

/// Trait for persisting attachment bytes.
///
/// Abstracted so ingestion can run against different backends (local
/// filesystem, object storage, failing test doubles).
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store `bytes` under `destination_path` and return the path the object
    /// was stored at.
    ///
    /// # Arguments
    /// * `bytes` - File content
    /// * `destination_path` - Relative path within the store, e.g.
    ///   `images/1700000000000_cat.png`
    /// * `mime_type` - MIME type of the content
    async fn upload(
        &self,
        bytes: &[u8],
        destination_path: &str,
        mime_type: &str,
    ) -> Result<String>;
}

/// Media store backed by a local directory.
#[derive(Debug, Clone)]
pub struct FsMediaStore {
    root: PathBuf,
}

impl FsMediaStore {
    /// Create a store rooted at `root`. The directory is created on first
    /// upload.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reject destination paths that could escape the storage root.
    fn checked_destination(&self, destination_path: &str) -> Result<PathBuf> {
        let relative = Path::new(destination_path);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));

        if destination_path.is_empty() || !safe {
            return Err(MediaStoreError::InvalidPath(destination_path.to_string()));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn upload(
        &self,
        bytes: &[u8],
        destination_path: &str,
        mime_type: &str,
    ) -> Result<String> {
        let target = self.checked_destination(destination_path)?;

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&target, bytes).await?;

        debug!(
            path = destination_path,
            mime_type,
            size = bytes.len(),
            "stored attachment"
        );

        Ok(destination_path.to_string())
    }
}
