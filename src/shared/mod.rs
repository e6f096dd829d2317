//! Shared Module
//!
//! Types shared between the poll server and the poll client. Everything
//! here is platform-agnostic and serializable: channel keys, the change
//! events producers publish, the envelope a poll endpoint answers with,
//! and the protocol timing both sides agree on.

/// Channel key newtype and channel families
pub mod channel;

/// Change events, notifications and poll envelopes
pub mod event;

/// Shared error types
pub mod error;

/// Protocol constants
pub mod protocol;

/// Post, thread and message bodies
pub mod content;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use channel::{ChannelFamily, ChannelKey};
pub use event::{ChangeEvent, EventKind, Notification, PollEnvelope};
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use content::{CreatePostRequest, CreateThreadRequest, Post, SendMessageRequest, Thread, ThreadMessage};
