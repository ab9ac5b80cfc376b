//! API endpoint configuration
//!
//! Resolves the base URL and request timeout once, from the environment with
//! hard-coded localhost defaults. CLI flags may override either value after
//! resolution.

use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the API base URL
pub const API_URL_ENV: &str = "RWTRADE_API_URL";

/// Environment variable holding the request timeout in milliseconds
pub const API_TIMEOUT_ENV: &str = "RWTRADE_API_TIMEOUT_MS";

/// Base URL used when nothing is configured
pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";

/// Request timeout used when nothing is configured
pub const DEFAULT_TIMEOUT_MS: u64 = 12_000;

/// Errors raised while resolving configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Timeout value is not a positive integer number of milliseconds
    #[error("Invalid timeout '{0}': expected a positive number of milliseconds")]
    InvalidTimeout(String),

    /// Base URL is not an http(s) URL
    #[error("Invalid API URL '{0}': expected an http:// or https:// URL")]
    InvalidUrl(String),
}

/// Where and how long to talk to the trade statistics API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Absolute base URL every relative endpoint is resolved against
    pub base_url: String,
    /// Upper bound for a single call, connect through body read
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl ApiConfig {
    /// Resolves configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary variable lookup
    ///
    /// Unset or blank variables fall back to the defaults; set but invalid
    /// values are errors rather than silently ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            config = config.with_base_url(&url)?;
        }

        if let Some(raw) = lookup(API_TIMEOUT_ENV).filter(|v| !v.trim().is_empty()) {
            config.timeout = parse_timeout_ms(&raw)?;
        }

        Ok(config)
    }

    /// Replaces the base URL after validating it
    pub fn with_base_url(mut self, url: &str) -> Result<Self, ConfigError> {
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(url.to_string()));
        }
        self.base_url = url.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Replaces the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolves an endpoint against the base URL
    ///
    /// Absolute URLs are returned untouched so callers can reach hosts other
    /// than the configured API.
    pub fn resolve(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

/// Parses a millisecond timeout, rejecting zero and non-numeric input
pub fn parse_timeout_ms(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}
