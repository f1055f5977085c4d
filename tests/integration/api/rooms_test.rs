//! Room API integration tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use polygone::shared::messaging::{ChatRoom, RoomMember, RoomType};

use crate::common::{create_test_server, create_test_user, test_state, TestDatabase};

#[tokio::test]
async fn test_create_join_and_list_members() {
    let db = TestDatabase::new().await;
    let server = create_test_server(test_state(&db));
    let alice = create_test_user(db.pool(), "alice").await.unwrap();
    let bob = create_test_user(db.pool(), "bob").await.unwrap();

    let response = server
        .post("/chat/rooms")
        .authorization_bearer(&alice.token)
        .json(&json!({ "name": "  search-team  ", "description": "Grid 7" }))
        .await;
    crate::assert_status!(response, StatusCode::CREATED);
    let room: ChatRoom = response.json();
    assert_eq!(room.name, "search-team");
    assert_eq!(room.room_type, RoomType::Group);
    assert_eq!(room.created_by, alice.id);

    let response = server
        .post(&format!("/chat/rooms/{}/join", room.id))
        .authorization_bearer(&bob.token)
        .await;
    crate::assert_status!(response, StatusCode::OK);
    let first: RoomMember = response.json();

    // joining twice keeps the original membership
    let again: RoomMember = server
        .post(&format!("/chat/rooms/{}/join", room.id))
        .authorization_bearer(&bob.token)
        .await
        .json();
    assert_eq!(again.id, first.id);

    let members: Vec<RoomMember> = server
        .get(&format!("/chat/rooms/{}/members", room.id))
        .authorization_bearer(&bob.token)
        .await
        .json();
    let names: Vec<&str> = members.iter().map(|m| m.username.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob"]);

    let rooms: Vec<ChatRoom> = server
        .get("/chat/rooms")
        .authorization_bearer(&bob.token)
        .await
        .json();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].id, room.id);
}

#[tokio::test]
async fn test_create_room_validation() {
    let db = TestDatabase::new().await;
    let server = create_test_server(test_state(&db));
    let alice = create_test_user(db.pool(), "alice").await.unwrap();

    let response = server
        .post("/chat/rooms")
        .authorization_bearer(&alice.token)
        .json(&json!({ "name": "   " }))
        .await;
    crate::assert_status!(response, StatusCode::BAD_REQUEST);

    let response = server
        .post("/chat/rooms")
        .authorization_bearer(&alice.token)
        .json(&json!({ "name": "ops", "room_type": "broadcast" }))
        .await;
    crate::assert_status!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_room_is_404() {
    let db = TestDatabase::new().await;
    let server = create_test_server(test_state(&db));
    let alice = create_test_user(db.pool(), "alice").await.unwrap();
    let missing = Uuid::new_v4();

    let response = server
        .post(&format!("/chat/rooms/{}/join", missing))
        .authorization_bearer(&alice.token)
        .await;
    crate::assert_status!(response, StatusCode::NOT_FOUND);

    let response = server
        .get(&format!("/chat/rooms/{}/members", missing))
        .authorization_bearer(&alice.token)
        .await;
    crate::assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rooms_list_only_memberships() {
    let db = TestDatabase::new().await;
    let server = create_test_server(test_state(&db));
    let alice = create_test_user(db.pool(), "alice").await.unwrap();
    let bob = create_test_user(db.pool(), "bob").await.unwrap();

    server
        .post("/chat/rooms")
        .authorization_bearer(&alice.token)
        .json(&json!({ "name": "private" }))
        .await;

    let rooms: Vec<ChatRoom> = server
        .get("/chat/rooms")
        .authorization_bearer(&bob.token)
        .await
        .json();
    assert!(rooms.is_empty());
}
