use crate::client::retry::BackoffStrategy;
use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError};
use crate::shared::protocol::{FEED_POLL_PATH, THREAD_ID_PARAM, THREAD_POLL_PATH};
use crate::shared::{ChannelFamily, ChannelKey};

/// Default server URL
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Poll client configuration: protocol timing, credentials and retry policy
#[derive(Debug, Clone)]
pub struct Config {
    app: AppConfig,
    token: Option<String>,
    backoff: BackoffStrategy,
}

impl Default for Config {
    fn default() -> Self {
        let app = AppConfig {
            server_url: Some(DEFAULT_SERVER_URL.to_string()),
            ..AppConfig::default()
        };
        Self::from_app(app)
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builder(builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        Ok(Self::from_app(builder.build()?))
    }

    /// Fixed backoff at the configured retry delay
    pub fn from_app(app: AppConfig) -> Self {
        let backoff = BackoffStrategy::Fixed {
            interval: app.retry_delay,
        };
        Self {
            app,
            token: None,
            backoff,
        }
    }

    /// Read `POLLCAST_SERVER_URL`, `POLLCAST_TOKEN` and `POLL_DEADLINE_SECS`
    pub fn from_env() -> Result<Self, ConfigError> {
        let server_url = std::env::var("POLLCAST_SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        let mut builder = AppConfig::builder().server_url(server_url);

        if let Ok(raw) = std::env::var("POLL_DEADLINE_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                key: "POLL_DEADLINE_SECS".to_string(),
                message: e.to_string(),
            })?;
            builder = builder.poll_deadline(std::time::Duration::from_secs(secs));
        }

        let mut config = Self::with_builder(builder)?;
        config.set_token(std::env::var("POLLCAST_TOKEN").ok().filter(|t| !t.is_empty()));
        Ok(config)
    }

    pub fn app(&self) -> &AppConfig {
        &self.app
    }

    /// Set the JWT token
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the JWT token
    pub fn get_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Clear the token (logout)
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn backoff(&self) -> &BackoffStrategy {
        &self.backoff
    }

    pub fn with_backoff(mut self, backoff: BackoffStrategy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn server_url(&self) -> &str {
        self.app.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url(), path)
    }

    /// Poll URL serving `channel`, if any endpoint does
    pub fn poll_url(&self, channel: &ChannelKey) -> Option<String> {
        match channel.family() {
            ChannelFamily::Feed => Some(self.api_url(FEED_POLL_PATH)),
            ChannelFamily::Thread(thread_id) => Some(format!(
                "{}?{}={}",
                self.api_url(THREAD_POLL_PATH),
                THREAD_ID_PARAM,
                thread_id
            )),
            ChannelFamily::Other => None,
        }
    }
}
