//! Room Store
//!
//! Rooms and memberships. A user is a member of a room at most once
//! (`UNIQUE (room_id, user_id)`); joining twice returns the existing
//! membership.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthenticatedUser;
use crate::shared::messaging::{ChatRoom, CreateRoomRequest, RoomMember, RoomType};
use crate::shared::SharedError;

fn room_from_row(row: &SqliteRow) -> Result<ChatRoom, sqlx::Error> {
    let kind: String = row.try_get("room_type")?;
    let room_type = kind.parse::<RoomType>().map_err(|e| sqlx::Error::ColumnDecode {
        index: "room_type".to_string(),
        source: Box::new(e),
    })?;

    Ok(ChatRoom {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        room_type,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        is_active: row.try_get("is_active")?,
    })
}

fn member_from_row(row: &SqliteRow) -> Result<RoomMember, sqlx::Error> {
    Ok(RoomMember {
        id: row.try_get("id")?,
        room_id: row.try_get("room_id")?,
        user_id: row.try_get("user_id")?,
        username: row.try_get("username")?,
        joined_at: row.try_get("joined_at")?,
        unread_count: row.try_get("unread_count")?,
    })
}

/// Create a room; the creator joins it in the same transaction
///
/// # Errors
/// `SharedError::ValidationError` for a blank name or unknown room type,
/// `StorageError` when the transaction fails.
pub async fn create_room(
    pool: &SqlitePool,
    creator: &AuthenticatedUser,
    request: CreateRoomRequest,
) -> Result<ChatRoom, BackendError> {
    let room_type = request.validate()?;
    let now = Utc::now();

    let room = ChatRoom {
        id: Uuid::new_v4(),
        name: request.name.trim().to_string(),
        description: request.description,
        room_type,
        created_by: creator.user_id,
        created_at: now,
        is_active: true,
    };

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO chat_rooms (id, name, description, room_type, created_by, created_at, is_active)
        VALUES (?, ?, ?, ?, ?, ?, 1)
        "#,
    )
    .bind(room.id)
    .bind(&room.name)
    .bind(&room.description)
    .bind(room.room_type.as_str())
    .bind(room.created_by)
    .bind(room.created_at)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO chat_room_members (id, room_id, user_id, username, joined_at, unread_count)
        VALUES (?, ?, ?, ?, ?, 0)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(room.id)
    .bind(creator.user_id)
    .bind(&creator.username)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!("[Rooms] {} created room '{}' ({})", creator.username, room.name, room.id);
    Ok(room)
}

/// Look up a room by id
pub async fn get_room(pool: &SqlitePool, room_id: Uuid) -> Result<Option<ChatRoom>, sqlx::Error> {
    let row = sqlx::query(
        "SELECT id, name, description, room_type, created_by, created_at, is_active FROM chat_rooms WHERE id = ?",
    )
    .bind(room_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(room_from_row).transpose()
}

/// Rooms `user_id` belongs to, oldest first
pub async fn rooms_for_user(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<ChatRoom>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT r.id, r.name, r.description, r.room_type, r.created_by, r.created_at, r.is_active
        FROM chat_rooms r
        JOIN chat_room_members m ON m.room_id = r.id
        WHERE m.user_id = ?
        ORDER BY r.created_at ASC, r.rowid ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(room_from_row).collect()
}

async fn find_membership(
    pool: &SqlitePool,
    room_id: Uuid,
    user_id: Uuid,
) -> Result<Option<RoomMember>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, room_id, user_id, username, joined_at, unread_count
        FROM chat_room_members
        WHERE room_id = ? AND user_id = ?
        "#,
    )
    .bind(room_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(member_from_row).transpose()
}

/// Add `user_id` to a room
///
/// Returns the existing membership when the user already belongs to it.
///
/// # Errors
/// `SharedError::NotFound` when the room does not exist.
pub async fn join_room(
    pool: &SqlitePool,
    room_id: Uuid,
    user_id: Uuid,
    username: &str,
) -> Result<RoomMember, BackendError> {
    if get_room(pool, room_id).await?.is_none() {
        return Err(SharedError::not_found("room", room_id).into());
    }

    sqlx::query(
        r#"
        INSERT INTO chat_room_members (id, room_id, user_id, username, joined_at, unread_count)
        VALUES (?, ?, ?, ?, ?, 0)
        ON CONFLICT (room_id, user_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(room_id)
    .bind(user_id)
    .bind(username)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    find_membership(pool, room_id, user_id)
        .await?
        .ok_or_else(|| BackendError::state("Membership missing after join"))
}

/// Members of a room in join order
///
/// # Errors
/// `SharedError::NotFound` when the room does not exist.
pub async fn members_of(pool: &SqlitePool, room_id: Uuid) -> Result<Vec<RoomMember>, BackendError> {
    if get_room(pool, room_id).await?.is_none() {
        return Err(SharedError::not_found("room", room_id).into());
    }

    let rows = sqlx::query(
        r#"
        SELECT id, room_id, user_id, username, joined_at, unread_count
        FROM chat_room_members
        WHERE room_id = ?
        ORDER BY joined_at ASC, rowid ASC
        "#,
    )
    .bind(room_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(member_from_row).collect::<Result<_, _>>()?)
}
