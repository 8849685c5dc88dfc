//! HTTP client module
//!
//! Provides the authenticated transport every resource wrapper goes through.
//!
//! # Features
//!
//! - **Bearer Authentication**: Access token read from the credential store on every request
//! - **Refresh and Retry**: One token refresh and one resend per request on 401
//! - **Session Events**: Broadcast when stored credentials are cleared

mod client;
mod request;

pub use client::{
    error_for_status, AuthenticatedClient, HttpClientConfig, HttpClientConfigBuilder,
    DEFAULT_REFRESH_PATH,
};
pub use request::ApiRequest;

#[cfg(test)]
mod tests;
