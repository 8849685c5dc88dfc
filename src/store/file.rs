//! File-backed credential store
//!
//! Provides JSON file persistence with atomic writes. Every mutation is
//! flushed to disk before it returns, so a second process (or the next
//! run of the CLI) sees the same session.
//! On unix the file is readable by its owner only.

use super::types::{CredentialKey, StoredCredentials};
use super::CredentialStore;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::debug;

/// Credential store persisted to a JSON file
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    /// Path to the credentials file
    path: PathBuf,
    /// Current contents (cached)
    entries: Arc<RwLock<StoredCredentials>>,
}

impl FileCredentialStore {
    /// Open a store, loading existing credentials if the file is present
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| Error::store(format!("Failed to read credentials file: {e}")))?;
            if contents.trim().is_empty() {
                StoredCredentials::new()
            } else {
                serde_json::from_str(&contents).map_err(|e| {
                    Error::store(format!("Failed to parse credentials file: {e}"))
                })?
            }
        } else {
            StoredCredentials::new()
        };

        debug!(path = %path.display(), "Opened credential store");

        Ok(Self {
            path,
            entries: Arc::new(RwLock::new(entries)),
        })
    }

    /// Get the credentials file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the given contents to disk
    async fn persist(&self, entries: &StoredCredentials) -> Result<()> {
        if entries.is_empty() {
            return match tokio::fs::remove_file(&self.path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(Error::store(format!(
                    "Failed to remove credentials file: {e}"
                ))),
            };
        }

        let contents = serde_json::to_string_pretty(entries)
            .map_err(|e| Error::store(format!("Failed to serialize credentials: {e}")))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    Error::store(format!("Failed to create credentials directory: {e}"))
                })?;
            }
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        write_private(&temp_path, contents.as_bytes())
            .await
            .map_err(|e| Error::store(format!("Failed to write credentials file: {e}")))?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::store(format!("Failed to rename credentials file: {e}")))?;

        Ok(())
    }
}

/// Write a file readable only by its owner
async fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;

    // A leftover temp file keeps its old mode
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .await?;
    }

    file.write_all(contents).await?;
    file.sync_all().await
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self, key: CredentialKey) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).map(ToString::to_string))
    }

    async fn set(&self, key: CredentialKey, value: String) -> Result<()> {
        // Hold the write lock across the flush so writes reach disk in order
        let mut entries = self.entries.write().await;
        entries.set(key, value);
        self.persist(&entries).await
    }

    async fn clear(&self) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.clear();
        self.persist(&entries).await
    }
}
