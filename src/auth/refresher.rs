//! Access token refresh
//!
//! The refresh call goes out on the bare `reqwest::Client`, never through
//! `AuthenticatedClient::send`, so a 401 from the refresh endpoint cannot
//! start another refresh.

use super::types::{RefreshRequest, RefreshResponse};
use crate::error::{Error, Result};
use reqwest::Client;
use tracing::debug;

/// Exchanges a refresh token for a new access token
#[derive(Debug, Clone)]
pub struct TokenRefresher {
    /// HTTP client for token requests
    http_client: Client,
    /// Full URL of the refresh endpoint
    refresh_url: String,
}

impl TokenRefresher {
    /// Create a refresher for the given endpoint
    pub fn new(http_client: Client, refresh_url: impl Into<String>) -> Self {
        Self {
            http_client,
            refresh_url: refresh_url.into(),
        }
    }

    /// Request a new access token
    ///
    /// Every failure mode (transport, non-2xx, malformed body) comes back
    /// as `Error::TokenRefresh`.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String> {
        debug!(url = %self.refresh_url, "Refreshing access token");

        let response = self
            .http_client
            .post(&self.refresh_url)
            .json(&RefreshRequest {
                refresh: refresh_token,
            })
            .send()
            .await
            .map_err(|e| Error::token_refresh(format!("Refresh request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::token_refresh(format!(
                "Refresh request failed with status {status}: {body}"
            )));
        }

        let token_response: RefreshResponse = response
            .json()
            .await
            .map_err(|e| Error::token_refresh(format!("Malformed refresh response: {e}")))?;

        if token_response.access.is_empty() {
            return Err(Error::token_refresh("Refresh response has empty access token"));
        }

        Ok(token_response.access)
    }
}
