//! In-memory credential store

use super::types::{CredentialKey, StoredCredentials};
use super::CredentialStore;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Credential store that lives only as long as the process
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    entries: Arc<RwLock<StoredCredentials>>,
}

impl MemoryCredentialStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything currently stored
    pub async fn snapshot(&self) -> StoredCredentials {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, key: CredentialKey) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).map(ToString::to_string))
    }

    async fn set(&self, key: CredentialKey, value: String) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.set(key, value);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.clear();
        Ok(())
    }
}
