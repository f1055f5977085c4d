//! Live socket tests over a real HTTP transport

use std::time::Duration;

use axum::http::StatusCode;
use axum_test::{TestWebSocket, WsMessage};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::time::timeout;
use uuid::Uuid;

use polygone::backend::realtime::{ConnectionHandle, Frame};
use polygone::shared::LiveEvent;

use crate::common::{create_live_test_server, create_test_user, test_state, TestDatabase, TestUser};

const WAIT: Duration = Duration::from_secs(2);

async fn next_event(socket: &mut TestWebSocket) -> LiveEvent {
    timeout(WAIT, socket.receive_json::<LiveEvent>())
        .await
        .expect("no event within timeout")
}

async fn connect(server: &axum_test::TestServer, user: &TestUser) -> TestWebSocket {
    let mut socket = server
        .get_websocket(&format!("/chat/ws/{}", user.id))
        .add_query_param("token", &user.token)
        .await
        .into_websocket()
        .await;

    match next_event(&mut socket).await {
        LiveEvent::Connected { user_id } => assert_eq!(user_id, user.id),
        other => panic!("expected connected, got {:?}", other),
    }
    socket
}

#[tokio::test]
async fn test_http_send_reaches_open_socket() {
    let db = TestDatabase::new().await;
    let server = create_live_test_server(test_state(&db));
    let alice = create_test_user(db.pool(), "alice").await.unwrap();
    let bob = create_test_user(db.pool(), "bob").await.unwrap();

    let mut bob_socket = connect(&server, &bob).await;

    let response = server
        .post("/chat/messages")
        .authorization_bearer(&alice.token)
        .json(&json!({ "receiver_id": bob.id, "message": "over the wire" }))
        .await;
    crate::assert_status!(response, StatusCode::CREATED);

    match next_event(&mut bob_socket).await {
        LiveEvent::NewMessage(notification) => {
            assert_eq!(notification.sender_id, alice.id);
            assert_eq!(notification.message, "over the wire");
        }
        other => panic!("expected new_message, got {:?}", other),
    }
}

#[tokio::test]
async fn test_socket_send_acknowledges_and_delivers() {
    let db = TestDatabase::new().await;
    let server = create_live_test_server(test_state(&db));
    let alice = create_test_user(db.pool(), "alice").await.unwrap();
    let bob = create_test_user(db.pool(), "bob").await.unwrap();

    let mut alice_socket = connect(&server, &alice).await;
    let mut bob_socket = connect(&server, &bob).await;

    alice_socket
        .send_text(json!({ "receiver_id": bob.id, "message": "from my socket" }))
        .await;

    let stored = match next_event(&mut alice_socket).await {
        LiveEvent::Sent { message } => message,
        other => panic!("expected sent, got {:?}", other),
    };
    assert_eq!(stored.sender_id, alice.id);
    assert_eq!(stored.receiver_id, Some(bob.id));

    match next_event(&mut bob_socket).await {
        LiveEvent::NewMessage(notification) => assert_eq!(notification.id, stored.id),
        other => panic!("expected new_message, got {:?}", other),
    }
}

#[tokio::test]
async fn test_socket_rejects_bad_frame_and_stays_open() {
    let db = TestDatabase::new().await;
    let server = create_live_test_server(test_state(&db));
    let alice = create_test_user(db.pool(), "alice").await.unwrap();
    let bob = create_test_user(db.pool(), "bob").await.unwrap();

    let mut socket = connect(&server, &alice).await;

    socket.send_text("not json").await;
    assert!(matches!(next_event(&mut socket).await, LiveEvent::Error { .. }));

    socket
        .send_text(json!({ "receiver_id": bob.id, "message": "  " }))
        .await;
    assert!(matches!(next_event(&mut socket).await, LiveEvent::Error { .. }));
    assert_eq!(db.message_count().await, 0);

    socket
        .send_text(json!({ "receiver_id": bob.id, "message": "recovered" }))
        .await;
    assert!(matches!(next_event(&mut socket).await, LiveEvent::Sent { .. }));
}

#[tokio::test]
async fn test_handshake_with_mismatched_token_is_rejected() {
    let db = TestDatabase::new().await;
    let server = create_live_test_server(test_state(&db));
    let alice = create_test_user(db.pool(), "alice").await.unwrap();
    let bob = create_test_user(db.pool(), "bob").await.unwrap();

    let response = server
        .get_websocket(&format!("/chat/ws/{}", bob.id))
        .add_query_param("token", &alice.token)
        .await;
    crate::assert_status!(response, StatusCode::UNAUTHORIZED);

    let response = server
        .get_websocket(&format!("/chat/ws/{}", alice.id))
        .await;
    crate::assert_status!(response, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_handshake_for_deleted_user_is_404() {
    let db = TestDatabase::new().await;
    let server = create_live_test_server(test_state(&db));
    let ghost = Uuid::new_v4();
    let token = crate::common::generate_test_token(ghost, "ghost");

    let response = server
        .get_websocket(&format!("/chat/ws/{}", ghost))
        .add_query_param("token", &token)
        .await;
    crate::assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reconnect_replaces_previous_socket() {
    let db = TestDatabase::new().await;
    let state = test_state(&db);
    let registry = state.registry.clone();
    let server = create_live_test_server(state);
    let alice = create_test_user(db.pool(), "alice").await.unwrap();
    let bob = create_test_user(db.pool(), "bob").await.unwrap();

    let mut first = connect(&server, &bob).await;
    let mut second = connect(&server, &bob).await;
    assert_eq!(registry.connected_count().await, 1);

    let closing = timeout(WAIT, first.receive_message())
        .await
        .expect("superseded socket was not closed");
    assert!(matches!(closing, WsMessage::Close(_)), "expected a close frame, got {:?}", closing);

    server
        .post("/chat/messages")
        .authorization_bearer(&alice.token)
        .json(&json!({ "receiver_id": bob.id, "message": "to the newest" }))
        .await;

    match next_event(&mut second).await {
        LiveEvent::NewMessage(notification) => assert_eq!(notification.message, "to the newest"),
        other => panic!("expected new_message, got {:?}", other),
    }
    assert!(registry.is_connected(bob.id).await);
}

#[tokio::test]
async fn test_reconnect_closes_backlogged_connection() {
    let db = TestDatabase::new().await;
    let state = test_state(&db);
    let registry = state.registry.clone();
    let server = create_live_test_server(state);
    let bob = create_test_user(db.pool(), "bob").await.unwrap();

    let (stale, mut stale_rx) = ConnectionHandle::channel(1);
    let kept = stale.clone();
    registry.register(bob.id, stale).await;
    registry.push(bob.id, "queued".to_string()).await;

    let _fresh = connect(&server, &bob).await;

    assert!(kept.is_close_requested());
    assert_eq!(stale_rx.recv().await, Some(Frame::Text("queued".to_string())));
}
