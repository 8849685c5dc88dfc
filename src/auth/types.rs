//! Token refresh wire types

use serde::{Deserialize, Serialize};

/// Body sent to the refresh endpoint
#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest<'a> {
    /// The stored refresh token
    pub refresh: &'a str,
}

/// Body returned by the refresh endpoint
///
/// A rotated `refresh` value, if the backend sends one, is ignored: the
/// stored refresh token is kept as-is.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    /// The new access token
    #[serde(alias = "access_token")]
    pub access: String,
}
