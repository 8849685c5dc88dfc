//! Credential store module
//!
//! Holds the access token, refresh token and serialized current user
//! between requests and across process restarts.
//!
//! # Overview
//!
//! The store module provides:
//! - `CredentialStore` - Async `get`/`set`/`clear` abstraction injected into the client
//! - `MemoryCredentialStore` - In-process store for tests and embedding
//! - `FileCredentialStore` - JSON file persistence with atomic writes

mod file;
mod memory;
mod types;

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;
pub use types::{CredentialKey, Credentials, StoredCredentials};

use crate::error::Result;
use crate::types::JsonValue;
use async_trait::async_trait;

/// Key-value persistence for session credentials
///
/// Implementations must be safe to share between concurrent requests.
/// The client reads through this trait on every request and never keeps
/// its own copy of a token.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read a single key
    async fn get(&self, key: CredentialKey) -> Result<Option<String>>;

    /// Write a single key
    async fn set(&self, key: CredentialKey, value: String) -> Result<()>;

    /// Remove every key
    async fn clear(&self) -> Result<()>;

    /// Both tokens, if a complete pair is stored
    async fn credentials(&self) -> Result<Option<Credentials>> {
        let access = self.get(CredentialKey::AccessToken).await?;
        let refresh = self.get(CredentialKey::RefreshToken).await?;
        Ok(match (access, refresh) {
            (Some(access_token), Some(refresh_token)) => Some(Credentials {
                access_token,
                refresh_token,
            }),
            _ => None,
        })
    }

    /// Persist the outcome of a successful login
    async fn save_login(&self, credentials: Credentials, user: &JsonValue) -> Result<()> {
        let user = serde_json::to_string(user)?;
        self.set(CredentialKey::AccessToken, credentials.access_token)
            .await?;
        self.set(CredentialKey::RefreshToken, credentials.refresh_token)
            .await?;
        self.set(CredentialKey::User, user).await
    }
}
