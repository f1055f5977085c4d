//! Message Store
//!
//! Durable record of every chat message in the `chat_messages` table.
//! Messages are append-only: only the read flag and `updated_at` ever change.
//!
//! Ordering is newest first by `created_at`; rows stored at the same instant
//! fall back to insertion order (`rowid`), newest insert first.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::shared::messaging::{ChatMessage, MessageKind};

const MESSAGE_COLUMNS: &str = "id, sender_id, sender_username, sender_name, receiver_id, message, message_type, is_read, created_at, updated_at";

fn message_from_row(row: &SqliteRow) -> Result<ChatMessage, sqlx::Error> {
    let kind: String = row.try_get("message_type")?;
    let message_type = kind.parse::<MessageKind>().map_err(|e| sqlx::Error::ColumnDecode {
        index: "message_type".to_string(),
        source: Box::new(e),
    })?;

    Ok(ChatMessage {
        id: row.try_get("id")?,
        sender_id: row.try_get("sender_id")?,
        sender_username: row.try_get("sender_username")?,
        sender_name: row.try_get("sender_name")?,
        receiver_id: row.try_get("receiver_id")?,
        message: row.try_get("message")?,
        message_type,
        is_read: row.try_get("is_read")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Store a new message
///
/// Generates the id and timestamps; the message starts unread.
///
/// # Arguments
/// * `pool` - Database connection pool
/// * `sender_id` - Author
/// * `sender_username` - Author's username at send time
/// * `sender_name` - Author's display name at send time
/// * `receiver_id` - Direct recipient, `None` for group-addressed messages
/// * `body` - Message body
/// * `kind` - Content kind
///
/// # Returns
/// The stored message
pub async fn append(
    pool: &SqlitePool,
    sender_id: Uuid,
    sender_username: &str,
    sender_name: Option<&str>,
    receiver_id: Option<Uuid>,
    body: &str,
    kind: MessageKind,
) -> Result<ChatMessage, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO chat_messages (id, sender_id, sender_username, sender_name, receiver_id, message, message_type, is_read, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?, ?)
        "#,
    )
    .bind(id)
    .bind(sender_id)
    .bind(sender_username)
    .bind(sender_name)
    .bind(receiver_id)
    .bind(body)
    .bind(kind.as_str())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(ChatMessage {
        id,
        sender_id,
        sender_username: sender_username.to_string(),
        sender_name: sender_name.map(str::to_string),
        receiver_id,
        message: body.to_string(),
        message_type: kind,
        is_read: false,
        created_at: now,
        updated_at: now,
    })
}

/// Messages visible to `user_id`, newest first
///
/// With `other_user_id`, only the conversation between the two users in
/// either direction. Without it, every message the user sent or received.
pub async fn list_for_user(
    pool: &SqlitePool,
    user_id: Uuid,
    other_user_id: Option<Uuid>,
    limit: u32,
) -> Result<Vec<ChatMessage>, sqlx::Error> {
    let rows = match other_user_id {
        Some(other) => {
            sqlx::query(&format!(
                r#"
                SELECT {}
                FROM chat_messages
                WHERE (sender_id = ? AND receiver_id = ?)
                   OR (sender_id = ? AND receiver_id = ?)
                ORDER BY created_at DESC, rowid DESC
                LIMIT ?
                "#,
                MESSAGE_COLUMNS
            ))
            .bind(user_id)
            .bind(other)
            .bind(other)
            .bind(user_id)
            .bind(i64::from(limit))
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(&format!(
                r#"
                SELECT {}
                FROM chat_messages
                WHERE sender_id = ? OR receiver_id = ?
                ORDER BY created_at DESC, rowid DESC
                LIMIT ?
                "#,
                MESSAGE_COLUMNS
            ))
            .bind(user_id)
            .bind(user_id)
            .bind(i64::from(limit))
            .fetch_all(pool)
            .await?
        }
    };

    rows.iter().map(message_from_row).collect()
}

/// Mark every unread message from `sender_id` to `recipient_id` as read
///
/// # Returns
/// Number of messages that changed state (0 on a repeated call)
pub async fn mark_read(pool: &SqlitePool, recipient_id: Uuid, sender_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE chat_messages
        SET is_read = 1, updated_at = ?
        WHERE sender_id = ? AND receiver_id = ? AND is_read = 0
        "#,
    )
    .bind(Utc::now())
    .bind(sender_id)
    .bind(recipient_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Distinct users `user_id` has exchanged direct messages with
pub async fn correspondents_of(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT receiver_id FROM chat_messages WHERE sender_id = ? AND receiver_id IS NOT NULL
        UNION
        SELECT sender_id FROM chat_messages WHERE receiver_id = ?
        "#,
    )
    .bind(user_id)
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Most recent message between two users, in either direction
pub async fn last_message_between(
    pool: &SqlitePool,
    user_id: Uuid,
    other_user_id: Uuid,
) -> Result<Option<ChatMessage>, sqlx::Error> {
    let mut latest = list_for_user(pool, user_id, Some(other_user_id), 1).await?;
    Ok(latest.pop())
}

/// Unread messages from `sender_id` to `recipient_id`
pub async fn unread_count(pool: &SqlitePool, recipient_id: Uuid, sender_id: Uuid) -> Result<u64, sqlx::Error> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM chat_messages WHERE sender_id = ? AND receiver_id = ? AND is_read = 0",
    )
    .bind(sender_id)
    .bind(recipient_id)
    .fetch_one(pool)
    .await?;

    Ok(u64::try_from(count).unwrap_or(0))
}
