/**
 * Content Types
 *
 * Request and response bodies of the producer routes: feed posts, threads
 * and thread messages. Field names are camelCase on the wire.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Longest accepted post or message body, in characters
pub const MAX_BODY_CHARS: usize = 4000;

/// Trim `body` and check it is non-empty and within [`MAX_BODY_CHARS`]
pub fn validate_body(body: &str) -> Result<&str, SharedError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(SharedError::validation("body", "must not be empty"));
    }
    if trimmed.chars().count() > MAX_BODY_CHARS {
        return Err(SharedError::validation(
            "body",
            format!("must be at most {} characters", MAX_BODY_CHARS),
        ));
    }
    Ok(trimmed)
}

/// A post in the global feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A conversation between participants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: Uuid,
    pub participant_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A message sent in a thread
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ThreadMessage {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub body: String,
}

/// Create a thread; the caller is always a participant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateThreadRequest {
    #[serde(default)]
    pub participant_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub body: String,
}
