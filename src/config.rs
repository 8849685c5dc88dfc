//! Client settings
//!
//! Settings are resolved once at startup from, lowest to highest precedence:
//! built-in defaults, an optional YAML file, then environment variables.

use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClientConfig, DEFAULT_REFRESH_PATH};
use crate::types::RefreshPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the backend base URL
pub const ENV_BASE_URL: &str = "CLINIC_API_URL";

/// Environment variable overriding the credentials file path
pub const ENV_CREDENTIALS_PATH: &str = "CLINIC_CREDENTIALS_PATH";

const DEFAULT_CREDENTIALS_FILE: &str = ".clinic-credentials.json";

/// Settings for the clinic client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientSettings {
    /// Backend base URL (e.g., "https://api.clinic.example/api")
    pub base_url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// User agent string
    pub user_agent: Option<String>,

    /// Token refresh endpoint, relative to the base URL
    pub refresh_path: String,

    /// Where the CLI keeps the stored session
    pub credentials_path: PathBuf,

    /// How concurrent refreshes are handled
    pub refresh_policy: RefreshPolicy,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 30,
            user_agent: None,
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_FILE),
            refresh_policy: RefreshPolicy::default(),
        }
    }
}

impl ClientSettings {
    /// Parse settings from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load settings from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&contents)
    }

    /// Resolve settings from an optional file plus the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(settings.with_env(|name| std::env::var(name).ok()))
    }

    /// Apply environment overrides through the given lookup
    #[must_use]
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.base_url = Some(url);
        }
        if let Some(path) = lookup(ENV_CREDENTIALS_PATH).filter(|v| !v.trim().is_empty()) {
            self.credentials_path = PathBuf::from(path);
        }
        self
    }

    /// Check that the settings can build a client
    pub fn validate(&self) -> Result<()> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or_else(|| Error::missing_field("base_url"))?;
        url::Url::parse(base_url)?;
        if self.timeout_secs == 0 {
            return Err(Error::config("timeout_secs must be greater than zero"));
        }
        if self.refresh_path.trim().is_empty() {
            return Err(Error::missing_field("refresh_path"));
        }
        Ok(())
    }

    /// Convert into the HTTP client configuration
    pub fn http_config(&self) -> Result<HttpClientConfig> {
        self.validate()?;

        let mut builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .refresh_path(self.refresh_path.clone())
            .refresh_policy(self.refresh_policy);

        if let Some(ref base_url) = self.base_url {
            builder = builder.base_url(base_url.clone());
        }
        if let Some(ref agent) = self.user_agent {
            builder = builder.user_agent(agent.clone());
        }

        Ok(builder.build())
    }
}
