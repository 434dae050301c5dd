//! Client configuration loaded from environment variables.
//!
//! Every setting has a default so the client works against a local backend
//! with zero configuration.

use std::path::PathBuf;
use std::time::Duration;

use fale_shared::constants::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the REST backend, without a trailing slash.
    /// Env: `FALE_API_URL`
    /// Default: `http://localhost:5000`
    pub api_url: String,

    /// Per-request timeout.
    /// Env: `FALE_TIMEOUT_SECS`
    /// Default: 15 seconds
    pub request_timeout: Duration,

    /// Directory holding `fale.db`.
    /// Env: `FALE_DATA_DIR`
    /// Default: `None`, meaning the platform data directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            data_dir: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("FALE_API_URL") {
            match normalize_url(&url) {
                Some(url) => config.api_url = url,
                None => tracing::warn!(value = %url, "Invalid FALE_API_URL, using default"),
            }
        }

        if let Some(val) = lookup("FALE_TIMEOUT_SECS") {
            match val.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout = Duration::from_secs(secs),
                _ => tracing::warn!(value = %val, "Invalid FALE_TIMEOUT_SECS, using default"),
            }
        }

        if let Some(dir) = lookup("FALE_DATA_DIR") {
            if !dir.trim().is_empty() {
                config.data_dir = Some(PathBuf::from(dir));
            }
        }

        config
    }

    pub fn with_api_url(mut self, url: &str) -> Self {
        if let Some(url) = normalize_url(url) {
            self.api_url = url;
        } else {
            tracing::warn!(value = %url, "Ignoring invalid API URL");
        }
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }
}

/// Accept only http(s) URLs and strip trailing slashes.
fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let has_scheme = trimmed.starts_with("http://") || trimmed.starts_with("https://");
    let has_host = trimmed.split("://").nth(1).is_some_and(|rest| !rest.is_empty());
    (has_scheme && has_host).then(|| trimmed.to_string())
}
