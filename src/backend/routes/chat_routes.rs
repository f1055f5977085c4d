/**
 * Chat Routes
 *
 * All routes require a bearer token except the live socket, which
 * authenticates its own upgrade request (browsers cannot set headers on a
 * WebSocket handshake, so it also accepts `?token=`).
 *
 * - `POST /chat/messages` - Send a message
 * - `GET /chat/messages` - Message history
 * - `GET /chat/conversations` - Conversation summaries
 * - `PUT /chat/messages/read/{sender_id}` - Mark a conversation read
 * - `POST /chat/rooms`, `GET /chat/rooms` - Create / list rooms
 * - `POST /chat/rooms/{room_id}/join` - Join a room
 * - `GET /chat/rooms/{room_id}/members` - Room members
 * - `GET /chat/ws/{user_id}` - Live connection
 */

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::backend::messaging::handlers::{
    create_room, join_room, list_conversations, list_messages, list_room_members, list_rooms,
    mark_messages_read, send_message,
};
use crate::backend::middleware::auth_middleware;
use crate::backend::realtime::live_socket;
use crate::backend::server::state::AppState;

/// Add chat routes to `router`
pub fn configure_chat_routes(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/chat/messages", post(send_message).get(list_messages))
        .route("/chat/conversations", get(list_conversations))
        .route("/chat/messages/read/{sender_id}", put(mark_messages_read))
        .route("/chat/rooms", post(create_room).get(list_rooms))
        .route("/chat/rooms/{room_id}/join", post(join_room))
        .route("/chat/rooms/{room_id}/members", get(list_room_members))
        .route_layer(middleware::from_fn_with_state(app_state.clone(), auth_middleware));

    router
        .route("/chat/ws/{user_id}", get(live_socket))
        .merge(protected)
}
