/**
 * Live Socket
 *
 * WebSocket endpoint `GET /chat/ws/{user_id}` that gives a user their live
 * channel.
 *
 * # Handshake
 *
 * The token comes from `?token=` or an `Authorization: Bearer` header. Its
 * subject must be the user in the path (401 otherwise) and that user must
 * exist (404 otherwise). Both checks run before the upgrade.
 *
 * # Lifecycle
 *
 * ```text
 * Connecting -> Open -> ClosedNormal
 *                    -> ClosedError
 * ```
 *
 * On `Open` the connection is registered and a `connected` event is sent.
 * Inbound text frames are send-message requests handed to the delivery
 * coordinator; the sender gets a `sent` or `error` event back on this same
 * connection. When the connection closes it is released from the registry,
 * unless a newer connection has already replaced it. A replaced connection
 * gets a close frame from its writer as soon as the replacement registers,
 * ahead of any frames still queued for it.
 */

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::HeaderMap,
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use uuid::Uuid;

use crate::backend::auth::sessions::verify_token;
use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::BackendError;
use crate::backend::messaging::delivery;
use crate::backend::middleware::auth::{bearer_token, AuthenticatedUser};
use crate::backend::realtime::registry::{ConnectionHandle, Frame};
use crate::backend::server::state::AppState;
use crate::shared::messaging::SendMessageRequest;
use crate::shared::{LiveEvent, SharedError};

/// State of one live connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    ClosedNormal,
    ClosedError,
}

impl ConnectionState {
    pub fn is_closed(&self) -> bool {
        matches!(self, ConnectionState::ClosedNormal | ConnectionState::ClosedError)
    }

    /// Whether `next` is a legal successor of this state
    pub fn can_become(&self, next: ConnectionState) -> bool {
        matches!(
            (self, next),
            (ConnectionState::Connecting, ConnectionState::Open)
                | (ConnectionState::Connecting, ConnectionState::ClosedError)
                | (ConnectionState::Open, ConnectionState::ClosedNormal)
                | (ConnectionState::Open, ConnectionState::ClosedError)
        )
    }
}

/// Query string of the upgrade request
#[derive(Debug, Deserialize)]
pub struct SocketQuery {
    pub token: Option<String>,
}

/// GET /chat/ws/{user_id}
pub async fn live_socket(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<SocketQuery>,
    headers: HeaderMap,
) -> Result<Response, BackendError> {
    let token = query
        .token
        .as_deref()
        .or_else(|| bearer_token(&headers))
        .ok_or_else(|| BackendError::auth("Not authenticated"))?;

    let claims = verify_token(&state.config.auth, token).map_err(|e| {
        tracing::warn!("[LiveSocket] Rejected token for {}: {:?}", user_id, e);
        BackendError::auth("Could not validate credentials")
    })?;

    if claims.user_id() != Some(user_id) {
        tracing::warn!("[LiveSocket] Token subject {} does not match path user {}", claims.sub, user_id);
        return Err(BackendError::auth("Token does not match user"));
    }

    let user = get_user_by_id(&state.db_pool, user_id)
        .await?
        .ok_or_else(|| SharedError::not_found("user", user_id))?;

    if !user.is_active {
        return Err(BackendError::auth("Inactive user"));
    }

    let identity = AuthenticatedUser::from(&user);
    Ok(ws.on_upgrade(move |socket| run_connection(socket, state, identity)))
}

fn advance(user: &AuthenticatedUser, from: ConnectionState, to: ConnectionState) -> ConnectionState {
    if !from.can_become(to) {
        tracing::warn!("[LiveSocket] {} ignored transition {:?} -> {:?}", user.username, from, to);
        return from;
    }
    tracing::debug!("[LiveSocket] {} {:?} -> {:?}", user.username, from, to);
    to
}

async fn run_connection(socket: WebSocket, state: AppState, user: AuthenticatedUser) {
    let mut connection_state = ConnectionState::Connecting;
    let (mut sink, mut stream) = socket.split();
    let (handle, mut outbound) = ConnectionHandle::channel(state.config.outbound_buffer);
    let connection_id = handle.connection_id();
    let mut shutdown = handle.shutdown_signal();

    let mut writer = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = async { let _ = shutdown.wait_for(|closed| *closed).await; } => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
                frame = outbound.recv() => match frame {
                    Some(Frame::Text(text)) => {
                        if sink.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }
    });

    state.registry.register(user.user_id, handle.clone()).await;
    connection_state = advance(&user, connection_state, ConnectionState::Open);
    tracing::info!(
        "[LiveSocket] {} connected ({} live connections)",
        user.username,
        state.registry.connected_count().await
    );

    send_event(&handle, &LiveEvent::Connected { user_id: user.user_id }, &state).await;

    while !connection_state.is_closed() {
        let next = tokio::select! {
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    handle_inbound(&state, &user, &handle, text.as_str()).await;
                    continue;
                }
                Some(Ok(Message::Close(_))) | None => ConnectionState::ClosedNormal,
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    tracing::warn!("[LiveSocket] Transport error for {}: {}", user.username, e);
                    ConnectionState::ClosedError
                }
            },
            _ = &mut writer => {
                tracing::debug!("[LiveSocket] Writer for {} finished", user.username);
                ConnectionState::ClosedNormal
            }
        };
        connection_state = advance(&user, connection_state, next);
    }

    state.registry.release(user.user_id, connection_id).await;
    drop(handle);
    writer.abort();

    match connection_state {
        ConnectionState::ClosedError => {
            tracing::warn!("[LiveSocket] {} disconnected after a transport error", user.username)
        }
        _ => tracing::info!("[LiveSocket] {} disconnected", user.username),
    }
}

async fn handle_inbound(state: &AppState, user: &AuthenticatedUser, handle: &ConnectionHandle, text: &str) {
    let reply = match serde_json::from_str::<SendMessageRequest>(text) {
        Ok(request) => match delivery::send(&state.db_pool, &state.registry, user, request).await {
            Ok(message) => LiveEvent::Sent { message },
            Err(e) => LiveEvent::error(e.message()),
        },
        Err(e) => {
            tracing::debug!("[LiveSocket] Unparseable frame from {}: {}", user.username, e);
            LiveEvent::error(format!("Invalid message frame: {}", e))
        }
    };

    send_event(handle, &reply, state).await;
}

async fn send_event(handle: &ConnectionHandle, event: &LiveEvent, state: &AppState) {
    let payload = match event.to_json() {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!("[LiveSocket] Could not encode event: {}", e);
            return;
        }
    };

    if let Err(failure) = handle.send_text(payload, state.registry.push_timeout()).await {
        tracing::warn!(
            "[LiveSocket] Reply on connection {} dropped: {:?}",
            handle.connection_id(),
            failure
        );
    }
}
