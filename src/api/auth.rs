//! Authentication endpoints

use super::to_body;
use super::types::{LoginResponse, RegisterRequest, User};
use crate::auth::InvalidationReason;
use crate::error::{Error, Result};
use crate::http::{error_for_status, ApiRequest, AuthenticatedClient};
use crate::store::{CredentialKey, Credentials};
use serde_json::json;
use tracing::{info, warn};

const LOGIN_PATH: &str = "/auth/login/";
const LOGOUT_PATH: &str = "/auth/logout/";
const REGISTER_PATH: &str = "/auth/register/";
const PASSWORD_RESET_PATH: &str = "/auth/password-reset/";
const PASSWORD_RESET_CONFIRM_PATH: &str = "/auth/password-reset/confirm/";

/// Session management endpoints
#[derive(Debug, Clone, Copy)]
pub struct AuthApi<'a> {
    client: &'a AuthenticatedClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a AuthenticatedClient) -> Self {
        Self { client }
    }

    /// Log in and store the returned session
    ///
    /// Rejected credentials come back as `Error::Auth` and leave any
    /// existing stored session untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let request =
            ApiRequest::post(LOGIN_PATH).json(json!({"email": email, "password": password}));
        let response = self.client.send_anonymous(request).await?;

        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::auth(format!("Login rejected ({status}): {body}")));
        }

        let response = error_for_status(response).await?;
        let login: LoginResponse = response.json().await?;

        let user_json = serde_json::to_value(&login.user)?;
        self.client
            .store()
            .save_login(Credentials::new(login.access, login.refresh), &user_json)
            .await?;

        info!(user_id = login.user.id, "Logged in");
        Ok(login.user)
    }

    /// Create a new account
    pub async fn register(&self, registration: &RegisterRequest) -> Result<User> {
        let request = ApiRequest::post(REGISTER_PATH).json(to_body(registration)?);
        let response = self.client.send_anonymous(request).await?;
        let response = error_for_status(response).await?;
        Ok(response.json().await?)
    }

    /// End the session
    ///
    /// The backend is asked to revoke the refresh token, but local
    /// credentials are cleared whether or not that call succeeds.
    pub async fn logout(&self) -> Result<()> {
        let refresh = self
            .client
            .store()
            .get(CredentialKey::RefreshToken)
            .await?;

        if let Some(refresh) = refresh {
            let request = ApiRequest::post(LOGOUT_PATH).json(json!({"refresh": refresh}));
            if let Err(e) = self.client.send_ok(request).await {
                warn!(error = %e, "Server-side logout failed");
            }
        }

        self.client
            .invalidate_session(InvalidationReason::LoggedOut)
            .await
    }

    /// Ask the backend to email a password reset link
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        let request = ApiRequest::post(PASSWORD_RESET_PATH).json(json!({"email": email}));
        let response = self.client.send_anonymous(request).await?;
        error_for_status(response).await?;
        Ok(())
    }

    /// Set a new password using the token from the reset email
    pub async fn confirm_password_reset(
        &self,
        uid: &str,
        token: &str,
        new_password: &str,
    ) -> Result<()> {
        let request = ApiRequest::post(PASSWORD_RESET_CONFIRM_PATH).json(json!({
            "uid": uid,
            "token": token,
            "new_password": new_password,
        }));
        let response = self.client.send_anonymous(request).await?;
        error_for_status(response).await?;
        Ok(())
    }

    /// User stored at login, if any
    pub async fn current_user(&self) -> Result<Option<User>> {
        let Some(raw) = self.client.store().get(CredentialKey::User).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Whether an access token is stored
    pub async fn is_authenticated(&self) -> Result<bool> {
        Ok(self
            .client
            .store()
            .get(CredentialKey::AccessToken)
            .await?
            .is_some_and(|t| !t.is_empty()))
    }
}
