/**
 * Backend Error Types
 *
 * Errors returned by HTTP handlers. Every variant maps to one status code;
 * the mapping is the server side of the long-poll error taxonomy:
 *
 * - not authenticated -> 401, not allowed on the channel -> 403
 * - malformed channel parameters -> 400
 * - listener budget exhausted or database unreachable -> 503
 * - listener failure mid-wait and other internal errors -> 500
 *
 * A timed-out poll is not an error and never passes through here.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::realtime::{PublishError, SubscriptionError};
use crate::shared::SharedError;

/// Backend-specific error types
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error with an explicit status (bad input, missing services)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// The caller could not be authenticated
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// The caller is authenticated but may not observe or write the resource
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Channel subscription failure
    #[error(transparent)]
    Subscription(#[from] SubscriptionError),

    /// Publishing a change event failed
    #[error(transparent)]
    Publish(#[from] PublishError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Shared error (from shared module)
    #[error(transparent)]
    SharedError(#[from] SharedError),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// The database is required for this route but none is configured
    pub fn database_unavailable() -> Self {
        Self::handler(StatusCode::SERVICE_UNAVAILABLE, "database not configured")
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Subscription(err) => match err {
                SubscriptionError::Saturated { .. } | SubscriptionError::Listen(_) => StatusCode::SERVICE_UNAVAILABLE,
                SubscriptionError::Receive(_) | SubscriptionError::Closed => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Publish(PublishError::Payload(_)) => StatusCode::BAD_REQUEST,
            Self::Publish(PublishError::Database(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SharedError(err) => match err {
                SharedError::ValidationError { .. } | SharedError::ProtocolError { .. } => StatusCode::BAD_REQUEST,
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Message safe to send to the client
    ///
    /// Database details stay in the logs.
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::Unauthorized { message } | Self::Forbidden { message } => message.clone(),
            Self::Subscription(SubscriptionError::Saturated { .. }) => "too many open polls, retry later".to_string(),
            Self::Subscription(_) => "subscription failed".to_string(),
            Self::Publish(PublishError::Payload(err)) => err.to_string(),
            Self::Publish(_) | Self::Database(_) => "internal database error".to_string(),
            Self::SharedError(err) => err.to_string(),
        }
    }
}
