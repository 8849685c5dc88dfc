//! Authenticated HTTP client
//!
//! Every request:
//! - reads the access token from the credential store and attaches it as a bearer token
//! - on a 401, refreshes the access token once and resends the request once
//! - on a failed refresh, clears the stored session and reports an auth failure
//!
//! Responses other than the 401 that triggers a refresh are returned as-is,
//! whatever their status. Callers that want non-2xx turned into errors use
//! `send_json` or `send_ok`.

use super::request::{ApiRequest, Attempt};
use crate::auth::{InvalidationReason, SessionEvent, SessionEvents, TokenRefresher};
use crate::error::{Error, Result};
use crate::store::{CredentialKey, CredentialStore};
use crate::types::{JsonValue, RefreshPolicy};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};
use url::Url;

/// Default path of the token refresh endpoint
pub const DEFAULT_REFRESH_PATH: &str = "/auth/token/refresh/";

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for all requests
    pub base_url: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Path of the token refresh endpoint, relative to the base URL
    pub refresh_path: String,
    /// How concurrent refreshes are handled
    pub refresh_policy: RefreshPolicy,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            refresh_policy: RefreshPolicy::default(),
            default_headers: HashMap::new(),
            user_agent: format!("clinic-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the refresh endpoint path
    pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
        self.config.refresh_path = path.into();
        self
    }

    /// Set the refresh policy
    pub fn refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.config.refresh_policy = policy;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// HTTP client that attaches bearer tokens and refreshes them on 401
pub struct AuthenticatedClient {
    client: Client,
    config: HttpClientConfig,
    base_url: String,
    store: Arc<dyn CredentialStore>,
    refresher: TokenRefresher,
    events: SessionEvents,
    /// Serializes refreshes under `RefreshPolicy::SingleFlight`
    refresh_lock: Mutex<()>,
}

impl AuthenticatedClient {
    /// Create a client for the configured base URL
    pub fn new(config: HttpClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let base_url = config
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Error::missing_field("base_url"))?;
        let base_url = Url::parse(base_url)?.to_string();

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let refresher = TokenRefresher::new(
            client.clone(),
            join_url(&base_url, &config.refresh_path),
        );

        Ok(Self {
            client,
            config,
            base_url,
            store,
            refresher,
            events: SessionEvents::new(),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Get the credential store
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Send a request, recovering once from an expired access token
    pub async fn send(&self, request: ApiRequest) -> Result<Response> {
        let access_token = self.current_access_token().await?;
        let response = self
            .dispatch(&request, access_token.as_deref(), Attempt::Initial)
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(path = %request.path, "Received 401, attempting token refresh");
        let fresh_token = self.renew_access_token(access_token.as_deref()).await?;

        // Whatever comes back now is final, including another 401
        self.dispatch(&request, Some(&fresh_token), Attempt::Retry).await
    }

    /// Send a request without a bearer token and without refresh handling
    ///
    /// For endpoints that establish a session (login, registration,
    /// password reset), where a 401 means bad input rather than an
    /// expired token.
    pub async fn send_anonymous(&self, request: ApiRequest) -> Result<Response> {
        self.dispatch(&request, None, Attempt::Initial).await
    }

    /// Send a request and decode a 2xx JSON body
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.send(request).await?;
        let response = error_for_status(response).await?;
        let json: T = response.json().await.map_err(Error::Http)?;
        Ok(json)
    }

    /// Send a request and require a 2xx status, discarding the body
    pub async fn send_ok(&self, request: ApiRequest) -> Result<()> {
        let response = self.send(request).await?;
        error_for_status(response).await?;
        Ok(())
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        self.send(ApiRequest::get(path)).await
    }

    /// Make a POST request
    pub async fn post(&self, path: &str, body: JsonValue) -> Result<Response> {
        self.send(ApiRequest::post(path).json(body)).await
    }

    /// Make a PUT request
    pub async fn put(&self, path: &str, body: JsonValue) -> Result<Response> {
        self.send(ApiRequest::put(path).json(body)).await
    }

    /// Make a PATCH request
    pub async fn patch(&self, path: &str, body: JsonValue) -> Result<Response> {
        self.send(ApiRequest::patch(path).json(body)).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Result<Response> {
        self.send(ApiRequest::delete(path)).await
    }

    /// Drop the stored session and notify subscribers
    ///
    /// The event is emitted even if clearing the store fails.
    pub async fn invalidate_session(&self, reason: InvalidationReason) -> Result<()> {
        warn!(?reason, "Clearing stored credentials");
        let cleared = self.store.clear().await;
        self.events.invalidated(reason);
        cleared
    }

    /// Build full URL from path
    pub fn build_url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    async fn current_access_token(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get(CredentialKey::AccessToken)
            .await?
            .filter(|t| !t.is_empty()))
    }

    /// Build and send one HTTP request
    async fn dispatch(
        &self,
        request: &ApiRequest,
        access_token: Option<&str>,
        attempt: Attempt,
    ) -> Result<Response> {
        let url = self.build_url(&request.path);
        let mut req = self.client.request(request.method.into(), &url);

        // Add default headers
        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }

        // Add request-specific headers
        for (key, value) in &request.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        if let Some(token) = access_token {
            req = req.bearer_auth(token);
        }

        if !request.query.is_empty() {
            req = req.query(&request.query);
        }

        if let Some(ref body) = request.body {
            req = req.json(body);
        }

        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        debug!(
            method = %request.method,
            url = %url,
            authenticated = access_token.is_some(),
            retry = attempt.is_retry(),
            "Sending request"
        );

        let response = req.send().await?;
        debug!(status = response.status().as_u16(), "Received response");
        Ok(response)
    }

    /// Obtain a new access token after a 401
    ///
    /// `stale` is the token the failed request was sent with.
    async fn renew_access_token(&self, stale: Option<&str>) -> Result<String> {
        match self.config.refresh_policy {
            RefreshPolicy::Independent => self.refresh_from_store().await,
            RefreshPolicy::SingleFlight => {
                let _guard = self.refresh_lock.lock().await;

                // Double-check after acquiring the lock (another task might have refreshed)
                if let Some(current) = self.current_access_token().await? {
                    if stale != Some(current.as_str()) {
                        debug!("Using access token refreshed by a concurrent request");
                        return Ok(current);
                    }
                }

                self.refresh_from_store().await
            }
        }
    }

    /// Invalidate the session on an auth failure path
    ///
    /// The auth error is what the caller must see, so a failing `clear`
    /// is logged rather than returned.
    async fn discard_session(&self, reason: InvalidationReason) {
        if let Err(e) = self.invalidate_session(reason).await {
            warn!(error = %e, "Failed to clear stored credentials");
        }
    }

    async fn refresh_from_store(&self) -> Result<String> {
        let refresh_token = self
            .store
            .get(CredentialKey::RefreshToken)
            .await?
            .filter(|t| !t.is_empty());

        let Some(refresh_token) = refresh_token else {
            self.discard_session(InvalidationReason::MissingRefreshToken)
                .await;
            return Err(Error::reauth("access token rejected and no refresh token stored"));
        };

        match self.refresher.refresh(&refresh_token).await {
            Ok(access_token) => {
                self.store
                    .set(CredentialKey::AccessToken, access_token.clone())
                    .await?;
                info!("Access token refreshed");
                self.events.emit(SessionEvent::Refreshed);
                Ok(access_token)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                self.discard_session(InvalidationReason::RefreshFailed)
                    .await;
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for AuthenticatedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("config", &self.config)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Turn a non-2xx response into `Error::HttpStatus`
pub async fn error_for_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::http_status(status.as_u16(), body))
}

/// Join a base URL and a path with exactly one slash
///
/// Absolute URLs are returned unchanged.
fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
