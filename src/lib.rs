//! # Clinic Client
//!
//! Typed client for the clinic appointments and medical records backend.
//!
//! ## Features
//!
//! - **Bearer Authentication**: Access token attached to every request from a pluggable store
//! - **Transparent Refresh**: On 401 the token is refreshed once and the request resent once
//! - **Session Invalidation**: Unrecoverable auth failures clear the stored session and notify subscribers
//! - **Resource Wrappers**: Appointments, medical records, patients and the chatbot
//! - **CLI**: Login once, then call any endpoint from the shell
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use clinic_client::{AuthenticatedClient, HttpClientConfig, MemoryCredentialStore, Result};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = HttpClientConfig::builder()
//!         .base_url("https://api.clinic.example/api")
//!         .build();
//!     let client = AuthenticatedClient::new(config, Arc::new(MemoryCredentialStore::new()))?;
//!
//!     client.auth().login("ana@clinic.test", "secret").await?;
//!     for appointment in client.appointments().list().await? {
//!         println!("{} {}", appointment.date, appointment.time);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Resource Wrappers                         │
//! │  auth()   appointments()   records()   patients()   chatbot()    │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      AuthenticatedClient                         │
//! │  attach bearer → send → 401? → refresh once → resend once        │
//! └─────────────────────────────────────────────────────────────────┘
//!            │                    │                      │
//! ┌──────────┴────────┬───────────┴──────────┬───────────┴─────────┐
//! │  CredentialStore  │    TokenRefresher    │    SessionEvents    │
//! ├───────────────────┼──────────────────────┼─────────────────────┤
//! │ Memory            │ POST refresh token   │ Refreshed           │
//! │ JSON file         │ plain, no intercept  │ Invalidated         │
//! └───────────────────┴──────────────────────┴─────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::needless_pass_by_value)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the client
pub mod error;

/// Common types and type aliases
pub mod types;

/// Credential storage
pub mod store;

/// Token refresh and session events
pub mod auth;

/// Authenticated HTTP client
pub mod http;

/// Client settings
pub mod config;

/// Resource API wrappers
pub mod api;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use auth::{InvalidationReason, SessionEvent};
pub use config::ClientSettings;
pub use http::{ApiRequest, AuthenticatedClient, HttpClientConfig};
pub use store::{
    CredentialKey, CredentialStore, Credentials, FileCredentialStore, MemoryCredentialStore,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
