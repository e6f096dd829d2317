//! Messaging HTTP Handlers
//!
//! Thread creation and message sends. A message send is an event producer:
//! the row and its `message_sent` notification on `thread:<id>` commit in
//! one transaction, so waiters only wake for messages that exist.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::access::ThreadAccess;
use super::db;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::realtime::notify_in_transaction;
use crate::shared::content::validate_body;
use crate::shared::{ChangeEvent, ChannelKey, CreateThreadRequest, SendMessageRequest, Thread, ThreadMessage};

/// Create a thread with the caller and the listed participants
pub async fn create_thread(
    State(db_pool): State<Option<PgPool>>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateThreadRequest>,
) -> Result<(StatusCode, Json<Thread>), BackendError> {
    let pool = db_pool.as_ref().ok_or_else(BackendError::database_unavailable)?;

    let mut participant_ids = vec![user.user_id];
    for id in request.participant_ids {
        if !participant_ids.contains(&id) {
            participant_ids.push(id);
        }
    }

    let mut tx = pool.begin().await?;
    let thread = db::create_thread(&mut tx, &participant_ids).await?;
    tx.commit().await?;

    tracing::info!(
        "[Messaging] Thread {} created by {} with {} participants",
        thread.id,
        user.user_id,
        thread.participant_ids.len()
    );

    Ok((StatusCode::CREATED, Json(thread)))
}

/// Send a message to a thread and notify its pollers on commit
pub async fn send_message(
    State(db_pool): State<Option<PgPool>>,
    State(access): State<ThreadAccess>,
    AuthUser(user): AuthUser,
    Path(thread_id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<ThreadMessage>), BackendError> {
    let pool = db_pool.as_ref().ok_or_else(BackendError::database_unavailable)?;
    let body = validate_body(&request.body)?;

    if !access.is_participant(thread_id, user.user_id).await? {
        tracing::warn!("[Messaging] {} is not a participant of thread {}", user.user_id, thread_id);
        return Err(BackendError::forbidden("not a participant of this thread"));
    }

    let channel = ChannelKey::thread(thread_id);

    let mut tx = pool.begin().await?;
    let message = db::insert_message(&mut tx, thread_id, user.user_id, body).await?;
    notify_in_transaction(
        &mut tx,
        &channel,
        &ChangeEvent::message_sent(thread_id, message.id, user.user_id),
    )
    .await?;
    tx.commit().await?;

    tracing::info!("[Messaging] Message {} sent to {}", message.id, channel);

    Ok((StatusCode::CREATED, Json(message)))
}
