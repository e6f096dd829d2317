//! Application configuration module
//!
//! Protocol timing that both ends of a long poll have to agree on: where
//! the server lives, how long it holds a poll, and how long a client waits
//! before retrying a failure.

use std::time::Duration;

use thiserror::Error;

use crate::shared::protocol::{DEFAULT_POLL_DEADLINE, DEFAULT_RETRY_DELAY, REQUEST_GRACE};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server URL
    pub server_url: Option<String>,
    /// Server-side poll deadline the client expects
    pub poll_deadline: Duration,
    /// Fixed delay between a failed poll and its retry
    pub retry_delay: Duration,
    /// Client-side slack on top of the poll deadline
    pub request_grace: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            poll_deadline: DEFAULT_POLL_DEADLINE,
            retry_delay: DEFAULT_RETRY_DELAY,
            request_grace: REQUEST_GRACE,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Total time a client lets one poll request run
    pub fn request_timeout(&self) -> Duration {
        self.poll_deadline + self.request_grace
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.server_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }
        if self.poll_deadline.is_zero() {
            return Err(ConfigError::InvalidDuration("poll_deadline"));
        }
        if self.retry_delay.is_zero() {
            return Err(ConfigError::InvalidDuration("retry_delay"));
        }
        Ok(())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    server_url: Option<String>,
    poll_deadline: Option<Duration>,
    retry_delay: Option<Duration>,
    request_grace: Option<Duration>,
}

impl AppConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    pub fn poll_deadline(mut self, deadline: Duration) -> Self {
        self.poll_deadline = Some(deadline);
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    pub fn request_grace(mut self, grace: Duration) -> Self {
        self.request_grace = Some(grace);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            server_url: self.server_url.map(|url| url.trim_end_matches('/').to_string()),
            poll_deadline: self.poll_deadline.unwrap_or(defaults.poll_deadline),
            retry_delay: self.retry_delay.unwrap_or(defaults.retry_delay),
            request_grace: self.request_grace.unwrap_or(defaults.request_grace),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("duration must be non-zero: {0}")]
    InvalidDuration(&'static str),
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),
}
