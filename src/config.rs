//! Runtime configuration for the reconciler and the GitHub adapter.
//!
//! Both configurations have usable defaults. The `from_env` constructors read
//! optional overrides from the process environment; `from_lookup` accepts any
//! key lookup so tests never touch the real environment.

use crate::issue::domain::{CLOSE_ISSUE_FINALIZER, GITHUB_HOST};
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the GitHub access token.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";
/// Environment variable overriding the GitHub API base URL.
pub const GITHUB_API_URL_ENV: &str = "GITHUB_API_URL";
/// Environment variable overriding the resync interval, in seconds.
pub const RESYNC_SECONDS_ENV: &str = "ISSUE_RESYNC_SECONDS";

/// Default interval between scheduler-driven resyncs.
pub const DEFAULT_RESYNC_INTERVAL: Duration = Duration::from_secs(60);
/// Default GitHub REST API base URL.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A configured value could not be parsed.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        /// Configuration key.
        key: &'static str,
        /// Raw value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Reconciler behaviour settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Delay requested before the next invocation after a successful pass.
    pub resync_interval: Duration,
    /// Finalizer marker owned by the reconciler.
    pub finalizer: String,
    /// Host that declared repository URLs must point at.
    pub repository_host: String,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            resync_interval: DEFAULT_RESYNC_INTERVAL,
            finalizer: CLOSE_ISSUE_FINALIZER.to_owned(),
            repository_host: GITHUB_HOST.to_owned(),
        }
    }
}

impl ReconcilerConfig {
    /// Reads overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when `ISSUE_RESYNC_SECONDS` is
    /// not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the resync interval is not a
    /// positive integer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = lookup(RESYNC_SECONDS_ENV) {
            let seconds = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|value| *value > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: RESYNC_SECONDS_ENV,
                    value: raw.clone(),
                    reason: "expected a positive number of seconds".to_owned(),
                })?;
            config.resync_interval = Duration::from_secs(seconds);
        }
        Ok(config)
    }

    /// Sets the resync interval.
    #[must_use]
    pub const fn with_resync_interval(mut self, interval: Duration) -> Self {
        self.resync_interval = interval;
        self
    }
}

/// GitHub REST adapter settings.
#[derive(Clone, PartialEq, Eq)]
pub struct GitHubClientConfig {
    /// API base URL without a trailing slash.
    pub api_base: String,
    /// Access token. Requests are sent unauthenticated when absent.
    pub token: Option<String>,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl std::fmt::Debug for GitHubClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClientConfig")
            .field("api_base", &self.api_base)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user_agent", &self.user_agent)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Default for GitHubClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_GITHUB_API_URL.to_owned(),
            token: None,
            user_agent: concat!("issue-reconciler/", env!("CARGO_PKG_VERSION")).to_owned(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl GitHubClientConfig {
    /// Reads `GITHUB_TOKEN` and `GITHUB_API_URL` from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the API URL is not an
    /// absolute `http` or `https` URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the token and API base through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the API URL is not an
    /// absolute `http` or `https` URL.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self {
            token: lookup(GITHUB_TOKEN_ENV)
                .map(|token| token.trim().to_owned())
                .filter(|token| !token.is_empty()),
            ..Self::default()
        };

        if let Some(raw) = lookup(GITHUB_API_URL_ENV) {
            let parsed = url::Url::parse(raw.trim()).map_err(|err| ConfigError::InvalidValue {
                key: GITHUB_API_URL_ENV,
                value: raw.clone(),
                reason: err.to_string(),
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidValue {
                    key: GITHUB_API_URL_ENV,
                    value: raw,
                    reason: "expected an http or https URL".to_owned(),
                });
            }
            config.api_base = raw.trim().trim_end_matches('/').to_owned();
        }
        Ok(config)
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_owned();
        self
    }

    /// Sets the access token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}
