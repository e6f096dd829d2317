//! Feed HTTP Handlers
//!
//! `POST /feed/posts` is the feed's event producer. `GET /feed/posts` is
//! what a client calls after a `post_created` wake-up to fetch current
//! state.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sqlx::PgPool;

use super::db;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::realtime::notify_in_transaction;
use crate::shared::content::validate_body;
use crate::shared::{ChangeEvent, ChannelKey, CreatePostRequest, Post};

const DEFAULT_PAGE_SIZE: u32 = 50;
const MAX_PAGE_SIZE: u32 = 200;

/// Create a post and notify feed pollers on commit
pub async fn create_post(
    State(db_pool): State<Option<PgPool>>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), BackendError> {
    let pool = db_pool.as_ref().ok_or_else(BackendError::database_unavailable)?;
    let body = validate_body(&request.body)?;

    let mut tx = pool.begin().await?;
    let post = db::insert_post(&mut tx, user.user_id, body).await?;
    notify_in_transaction(
        &mut tx,
        &ChannelKey::feed(),
        &ChangeEvent::post_created(post.id, user.user_id),
    )
    .await?;
    tx.commit().await?;

    tracing::info!("[Feed] Post {} created by {}", post.id, user.user_id);

    Ok((StatusCode::CREATED, Json(post)))
}

/// Query parameters for listing posts
#[derive(Debug, Deserialize)]
pub struct ListPostsParams {
    pub limit: Option<u32>,
}

/// List the most recent posts
pub async fn list_posts(
    State(db_pool): State<Option<PgPool>>,
    AuthUser(_user): AuthUser,
    Query(params): Query<ListPostsParams>,
) -> Result<Json<Vec<Post>>, BackendError> {
    let pool = db_pool.as_ref().ok_or_else(BackendError::database_unavailable)?;
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    let posts = db::recent_posts(pool, i64::from(limit)).await?;
    Ok(Json(posts))
}
