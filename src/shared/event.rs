/**
 * Change Events and Poll Envelopes
 *
 * Producers describe what changed with a `ChangeEvent` and publish it as
 * the notification payload. The poll endpoint wraps whatever payload woke
 * it in a `PollEnvelope` together with the time it was observed.
 *
 * Payloads carry identifiers rather than whole rows. A client that needs
 * the full record fetches it, and a client that missed an event fetches
 * current state; there is no replay.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::channel::ChannelKey;
use crate::shared::error::SharedError;

/// PostgreSQL rejects NOTIFY payloads of 8000 bytes or more.
pub const MAX_NOTIFY_PAYLOAD_LEN: usize = 7999;

/// Kind of change a producer is announcing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A post was added to the global feed
    PostCreated,
    /// A message was sent in a thread
    MessageSent,
    /// Custom event kind
    Custom(String),
}

/// A change announced on a channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeEvent {
    /// What happened
    pub kind: EventKind,
    /// Identifiers and small attributes of the changed record
    pub payload: serde_json::Value,
}

impl ChangeEvent {
    pub fn new(kind: EventKind, payload: serde_json::Value) -> Self {
        Self { kind, payload }
    }

    /// A post was created in the global feed
    pub fn post_created(post_id: uuid::Uuid, author_id: uuid::Uuid) -> Self {
        Self::new(
            EventKind::PostCreated,
            serde_json::json!({
                "postId": post_id,
                "authorId": author_id,
            }),
        )
    }

    /// A message was sent in a thread
    pub fn message_sent(thread_id: uuid::Uuid, message_id: uuid::Uuid, sender_id: uuid::Uuid) -> Self {
        Self::new(
            EventKind::MessageSent,
            serde_json::json!({
                "threadId": thread_id,
                "messageId": message_id,
                "senderId": sender_id,
            }),
        )
    }

    /// Encode as a notification payload, enforcing the NOTIFY size limit
    pub fn to_payload(&self) -> Result<String, SharedError> {
        let payload = serde_json::to_string(self)?;
        if payload.len() > MAX_NOTIFY_PAYLOAD_LEN {
            return Err(SharedError::validation(
                "payload",
                format!("notification payload is {} bytes, limit is {}", payload.len(), MAX_NOTIFY_PAYLOAD_LEN),
            ));
        }
        Ok(payload)
    }
}

/// A wake-up delivered to one waiting subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Channel the notification arrived on
    pub channel: ChannelKey,
    /// Raw payload string as published
    pub payload: String,
}

impl Notification {
    pub fn new(channel: ChannelKey, payload: impl Into<String>) -> Self {
        Self {
            channel,
            payload: payload.into(),
        }
    }

    /// Payload as JSON; payloads that are not JSON are passed through as strings
    pub fn payload_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.payload)
            .unwrap_or_else(|_| serde_json::Value::String(self.payload.clone()))
    }
}

/// Body of a 200 response from a poll endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PollEnvelope {
    /// The payload that woke the poll
    pub event: serde_json::Value,
    /// When the server observed the event
    pub timestamp: DateTime<Utc>,
}

impl PollEnvelope {
    pub fn from_notification(notification: &Notification) -> Self {
        Self {
            event: notification.payload_json(),
            timestamp: Utc::now(),
        }
    }
}
