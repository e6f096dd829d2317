//! Poll client errors
//!
//! Every variant except `Aborted` reaches the error callback. `Aborted`
//! only ever comes from an intentional `stop()` and is swallowed.

use thiserror::Error;

use crate::shared::ConfigError;

#[derive(Debug, Error)]
pub enum PollError {
    /// Network failure, timeout or connection reset
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// 401 or 403 from the poll endpoint
    #[error("authorization denied (HTTP {status})")]
    AuthorizationDenied { status: u16 },

    /// Any status other than 200, 204, 401 and 403
    #[error("unexpected response status {status}")]
    UnexpectedResponse { status: u16 },

    /// A 200 whose body is not a poll envelope
    #[error("failed to decode poll response: {0}")]
    Decode(#[from] serde_json::Error),

    /// No poll endpoint serves this channel
    #[error("no poll endpoint for channel {0}")]
    UnsupportedChannel(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The request was cancelled by `stop()`
    #[error("request aborted")]
    Aborted,
}

impl PollError {
    /// Errors that stop the cycle instead of scheduling a retry
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::AuthorizationDenied { .. } | Self::UnsupportedChannel(_) | Self::Config(_)
        )
    }

    /// Classify a non-success poll status
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::AuthorizationDenied { status },
            _ => Self::UnexpectedResponse { status },
        }
    }
}
