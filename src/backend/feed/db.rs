//! Database operations for feed posts

use chrono::Utc;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::shared::Post;

/// Store a post; the caller commits
pub async fn insert_post(
    tx: &mut Transaction<'_, Postgres>,
    author_id: Uuid,
    body: &str,
) -> Result<Post, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO posts (id, author_id, body, created_at)
        VALUES ($1, $2, $3, $4)
        "#
    )
    .bind(id)
    .bind(author_id)
    .bind(body)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(Post {
        id,
        author_id,
        body: body.to_string(),
        created_at: now,
    })
}

/// Most recent posts, newest first
pub async fn recent_posts(pool: &PgPool, limit: i64) -> Result<Vec<Post>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, author_id, body, created_at
        FROM posts
        ORDER BY created_at DESC
        LIMIT $1
        "#
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Post {
            id: row.get("id"),
            author_id: row.get("author_id"),
            body: row.get("body"),
            created_at: row.get("created_at"),
        })
        .collect())
}
