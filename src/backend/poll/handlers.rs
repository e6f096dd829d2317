/**
 * Poll Endpoint Handlers
 *
 * One request holds one listener for at most the channel's deadline:
 *
 * - notification -> 200 `{ "event": ..., "timestamp": ... }`
 * - deadline -> 204, no body
 * - bad `threadId` -> 400, non-participant -> 403
 * - listener budget exhausted -> 503, listener failure -> 500
 *
 * Authentication runs as route middleware and the participant check runs
 * before `wait`, so rejected callers never open a listener.
 */

use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::messaging::ThreadAccess;
use crate::backend::middleware::{AuthUser, AuthenticatedUser};
use crate::backend::realtime::{ChannelSubscriber, WaitOutcome};
use crate::backend::server::state::PollDeadlines;
use crate::shared::{ChannelKey, PollEnvelope, SharedError};

/// Query parameters of `GET /poll/thread`
#[derive(Debug, Default, Deserialize)]
pub struct ThreadPollParams {
    #[serde(rename = "threadId")]
    pub thread_id: Option<String>,
}

impl ThreadPollParams {
    pub fn thread_id(&self) -> Result<Uuid, SharedError> {
        let raw = self
            .thread_id
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .ok_or_else(|| SharedError::validation("threadId", "is required"))?;
        Uuid::parse_str(raw).map_err(|e| SharedError::validation("threadId", e.to_string()))
    }
}

/// `GET /poll/feed`
pub async fn handle_feed_poll(
    State(subscriber): State<ChannelSubscriber>,
    State(deadlines): State<PollDeadlines>,
    AuthUser(user): AuthUser,
) -> Result<Response, BackendError> {
    poll_channel(&subscriber, ChannelKey::feed(), deadlines.feed, &user).await
}

/// `GET /poll/thread?threadId=<uuid>`
pub async fn handle_thread_poll(
    State(subscriber): State<ChannelSubscriber>,
    State(access): State<ThreadAccess>,
    State(deadlines): State<PollDeadlines>,
    AuthUser(user): AuthUser,
    Query(params): Query<ThreadPollParams>,
) -> Result<Response, BackendError> {
    let thread_id = params.thread_id()?;

    if !access.is_participant(thread_id, user.user_id).await? {
        tracing::warn!("[Poll] {} denied on thread {}", user.user_id, thread_id);
        return Err(BackendError::forbidden("not a participant of this thread"));
    }

    poll_channel(&subscriber, ChannelKey::thread(thread_id), deadlines.thread, &user).await
}

async fn poll_channel(
    subscriber: &ChannelSubscriber,
    channel: ChannelKey,
    deadline: Duration,
    user: &AuthenticatedUser,
) -> Result<Response, BackendError> {
    tracing::debug!("[Poll] {} waiting on {} for {:?}", user.user_id, channel, deadline);

    match subscriber.wait(&channel, deadline).await? {
        WaitOutcome::Notified(notification) => {
            tracing::debug!("[Poll] {} notified on {}", user.user_id, channel);
            Ok((StatusCode::OK, Json(PollEnvelope::from_notification(&notification))).into_response())
        }
        WaitOutcome::TimedOut => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}
