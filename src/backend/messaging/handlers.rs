//! Messaging HTTP Handlers
//!
//! Thin handlers over the delivery coordinator, message store, conversation
//! aggregator and room store. Every route here sits behind `auth_middleware`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::messaging::{conversations, delivery, rooms, store};
use crate::backend::middleware::auth::AuthUser;
use crate::backend::realtime::registry::ConnectionRegistry;
use crate::shared::messaging::{
    ChatMessage, ChatRoom, ConversationSummary, CreateRoomRequest, ListMessagesQuery,
    MarkReadResponse, RoomMember, SendMessageRequest,
};

/// POST /chat/messages
pub async fn send_message(
    State(pool): State<SqlitePool>,
    State(registry): State<ConnectionRegistry>,
    AuthUser(user): AuthUser,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<ChatMessage>), BackendError> {
    let message = delivery::send(&pool, &registry, &user, request).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /chat/messages?other_user_id=&limit=
pub async fn list_messages(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Query(query): Query<ListMessagesQuery>,
) -> Result<Json<Vec<ChatMessage>>, BackendError> {
    let messages = store::list_for_user(&pool, user.user_id, query.other_user_id, query.effective_limit()).await?;
    Ok(Json(messages))
}

/// GET /chat/conversations
pub async fn list_conversations(
    State(pool): State<SqlitePool>,
    State(registry): State<ConnectionRegistry>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<ConversationSummary>>, BackendError> {
    let summaries = conversations::conversations_for(&pool, &registry, user.user_id).await?;
    Ok(Json(summaries))
}

/// PUT /chat/messages/read/{sender_id}
pub async fn mark_messages_read(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(sender_id): Path<Uuid>,
) -> Result<Json<MarkReadResponse>, BackendError> {
    let updated = store::mark_read(&pool, user.user_id, sender_id).await?;
    tracing::debug!("[Messages] {} marked {} messages from {} as read", user.username, updated, sender_id);

    Ok(Json(MarkReadResponse {
        message: "Messages marked as read".to_string(),
        updated,
    }))
}

/// POST /chat/rooms
pub async fn create_room(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<ChatRoom>), BackendError> {
    let room = rooms::create_room(&pool, &user, request).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

/// GET /chat/rooms
pub async fn list_rooms(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<ChatRoom>>, BackendError> {
    Ok(Json(rooms::rooms_for_user(&pool, user.user_id).await?))
}

/// POST /chat/rooms/{room_id}/join
pub async fn join_room(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<Uuid>,
) -> Result<Json<RoomMember>, BackendError> {
    let member = rooms::join_room(&pool, room_id, user.user_id, &user.username).await?;
    Ok(Json(member))
}

/// GET /chat/rooms/{room_id}/members
pub async fn list_room_members(
    State(pool): State<SqlitePool>,
    AuthUser(_user): AuthUser,
    Path(room_id): Path<Uuid>,
) -> Result<Json<Vec<RoomMember>>, BackendError> {
    Ok(Json(rooms::members_of(&pool, room_id).await?))
}
