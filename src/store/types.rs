//! Credential types
//!
//! `StoredCredentials` is the on-disk shape of the store; it is a flat
//! map keyed by the same names the browser front-end used in local storage.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One of the three keys the store holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKey {
    /// Short-lived bearer token
    AccessToken,
    /// Long-lived token used only against the refresh endpoint
    RefreshToken,
    /// JSON-serialized current user
    User,
}

impl CredentialKey {
    /// All keys, in storage order
    pub const ALL: [CredentialKey; 3] = [
        CredentialKey::AccessToken,
        CredentialKey::RefreshToken,
        CredentialKey::User,
    ];

    /// Storage name of the key
    pub fn as_str(self) -> &'static str {
        match self {
            CredentialKey::AccessToken => "access_token",
            CredentialKey::RefreshToken => "refresh_token",
            CredentialKey::User => "user",
        }
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access and refresh token pair
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Bearer token attached to requests
    pub access_token: String,
    /// Token exchanged for a new access token
    pub refresh_token: String,
}

impl Credentials {
    /// Create a new token pair
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// Tokens stay out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Complete contents of a credential store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredCredentials {
    entries: BTreeMap<CredentialKey, String>,
}

impl StoredCredentials {
    /// Create an empty set of credentials
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value
    pub fn get(&self, key: CredentialKey) -> Option<&str> {
        self.entries.get(&key).map(String::as_str)
    }

    /// Set a value
    pub fn set(&mut self, key: CredentialKey, value: String) {
        self.entries.insert(key, value);
    }

    /// Remove every value
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
