//! Database operations for threads and thread messages
//!
//! Writes take the caller's transaction so the change and its notification
//! commit together.

use chrono::Utc;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::shared::{Thread, ThreadMessage};

/// Create a thread and its participant rows
pub async fn create_thread(
    tx: &mut Transaction<'_, Postgres>,
    participant_ids: &[Uuid],
) -> Result<Thread, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO threads (id, created_at)
        VALUES ($1, $2)
        "#
    )
    .bind(id)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    for user_id in participant_ids {
        sqlx::query(
            r#"
            INSERT INTO thread_participants (thread_id, user_id, joined_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (thread_id, user_id) DO NOTHING
            "#
        )
        .bind(id)
        .bind(user_id)
        .bind(now)
        .execute(&mut **tx)
        .await?;
    }

    Ok(Thread {
        id,
        participant_ids: participant_ids.to_vec(),
        created_at: now,
    })
}

/// Store a message in a thread
pub async fn insert_message(
    tx: &mut Transaction<'_, Postgres>,
    thread_id: Uuid,
    sender_id: Uuid,
    body: &str,
) -> Result<ThreadMessage, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO thread_messages (id, thread_id, sender_id, body, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#
    )
    .bind(id)
    .bind(thread_id)
    .bind(sender_id)
    .bind(body)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(ThreadMessage {
        id,
        thread_id,
        sender_id,
        body: body.to_string(),
        created_at: now,
    })
}

/// Check if a user is a participant in a thread
pub async fn is_user_participant(
    pool: &PgPool,
    thread_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM thread_participants
            WHERE thread_id = $1 AND user_id = $2
        ) AS is_participant
        "#
    )
    .bind(thread_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(row.get("is_participant"))
}
