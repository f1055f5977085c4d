//! Authentication API integration tests
//!
//! Tests for registration, login, the profile endpoints and user search.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use polygone::backend::auth::handlers::types::{TokenResponse, UserResponse};

use crate::common::{create_named_test_user, create_test_server, create_test_user, test_state, TestDatabase};

#[tokio::test]
async fn test_register_success() {
    let db = TestDatabase::new().await;
    let server = create_test_server(test_state(&db));

    let response = server
        .post("/auth/register")
        .json(&json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "password123",
            "full_name": "Alice Liddell"
        }))
        .await;

    crate::assert_status!(response, StatusCode::CREATED);
    let user: UserResponse = response.json();
    assert_eq!(user.username, "alice");
    assert_eq!(user.full_name.as_deref(), Some("Alice Liddell"));
    assert_eq!(user.role, "user");
    assert!(user.is_active);

    let body: serde_json::Value = response.json();
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let db = TestDatabase::new().await;
    let server = create_test_server(test_state(&db));
    create_test_user(db.pool(), "alice").await.unwrap();

    let response = server
        .post("/auth/register")
        .json(&json!({
            "username": "alice",
            "email": "other@example.com",
            "password": "password123"
        }))
        .await;

    crate::assert_status!(response, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let db = TestDatabase::new().await;
    let server = create_test_server(test_state(&db));
    create_test_user(db.pool(), "alice").await.unwrap();

    let response = server
        .post("/auth/register")
        .json(&json!({
            "username": "alicia",
            "email": "alice@example.com",
            "password": "password123"
        }))
        .await;

    crate::assert_status!(response, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_rejects_invalid_input() {
    let db = TestDatabase::new().await;
    let server = create_test_server(test_state(&db));

    for (body, field) in [
        (json!({ "username": "1bad", "email": "bad@example.com", "password": "password123" }), "username"),
        (json!({ "username": "gooduser", "email": "not-an-email", "password": "password123" }), "email"),
        (json!({ "username": "gooduser", "email": "good@example.com", "password": "short" }), "password"),
    ] {
        let response = server.post("/auth/register").json(&body).await;
        crate::assert_status!(response, StatusCode::BAD_REQUEST);
        let error: serde_json::Value = response.json();
        assert_eq!(error["status"], 400);
        crate::assert_contains!(error["error"].as_str().unwrap_or_default(), field);
    }
}

#[tokio::test]
async fn test_login_success() {
    let db = TestDatabase::new().await;
    let server = create_test_server(test_state(&db));
    let user = create_test_user(db.pool(), "alice").await.unwrap();

    let response = server
        .post("/auth/login")
        .json(&json!({ "username": "alice", "password": user.password }))
        .await;

    crate::assert_status!(response, StatusCode::OK);
    let token: TokenResponse = response.json();
    assert_eq!(token.token_type, "bearer");
    assert!(!token.access_token.is_empty());

    let me = server
        .get("/auth/me")
        .authorization_bearer(&token.access_token)
        .await;
    crate::assert_status!(me, StatusCode::OK);
    assert_eq!(me.json::<UserResponse>().id, user.id);
}

#[tokio::test]
async fn test_login_with_email() {
    let db = TestDatabase::new().await;
    let server = create_test_server(test_state(&db));
    let user = create_test_user(db.pool(), "alice").await.unwrap();

    let response = server
        .post("/auth/login")
        .json(&json!({ "username": user.email, "password": user.password }))
        .await;

    crate::assert_status!(response, StatusCode::OK);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let db = TestDatabase::new().await;
    let server = create_test_server(test_state(&db));
    create_test_user(db.pool(), "alice").await.unwrap();

    let response = server
        .post("/auth/login")
        .json(&json!({ "username": "alice", "password": "wrong-password" }))
        .await;

    crate::assert_status!(response, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_unknown_user() {
    let db = TestDatabase::new().await;
    let server = create_test_server(test_state(&db));

    let response = server
        .post("/auth/login")
        .json(&json!({ "username": "nobody", "password": "password123" }))
        .await;

    crate::assert_status!(response, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_requires_token() {
    let db = TestDatabase::new().await;
    let server = create_test_server(test_state(&db));

    let response = server.get("/auth/me").await;
    crate::assert_status!(response, StatusCode::UNAUTHORIZED);

    let response = server.get("/auth/me").authorization_bearer("not-a-jwt").await;
    crate::assert_status!(response, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_me_partial() {
    let db = TestDatabase::new().await;
    let server = create_test_server(test_state(&db));
    let user = create_test_user(db.pool(), "alice").await.unwrap();

    let response = server
        .put("/auth/me")
        .authorization_bearer(&user.token)
        .json(&json!({ "full_name": "Alice L.", "phone": "555-0100" }))
        .await;

    crate::assert_status!(response, StatusCode::OK);
    let updated: UserResponse = response.json();
    assert_eq!(updated.full_name.as_deref(), Some("Alice L."));
    assert_eq!(updated.phone.as_deref(), Some("555-0100"));
    assert_eq!(updated.email, user.email);
}

#[tokio::test]
async fn test_update_me_password_is_rehashed() {
    let db = TestDatabase::new().await;
    let server = create_test_server(test_state(&db));
    let user = create_test_user(db.pool(), "alice").await.unwrap();

    let response = server
        .put("/auth/me")
        .authorization_bearer(&user.token)
        .json(&json!({ "password": "new-password-1" }))
        .await;
    crate::assert_status!(response, StatusCode::OK);

    let old = server
        .post("/auth/login")
        .json(&json!({ "username": "alice", "password": user.password }))
        .await;
    crate::assert_status!(old, StatusCode::UNAUTHORIZED);

    let new = server
        .post("/auth/login")
        .json(&json!({ "username": "alice", "password": "new-password-1" }))
        .await;
    crate::assert_status!(new, StatusCode::OK);
}

#[tokio::test]
async fn test_update_me_email_conflict() {
    let db = TestDatabase::new().await;
    let server = create_test_server(test_state(&db));
    let alice = create_test_user(db.pool(), "alice").await.unwrap();
    let bob = create_test_user(db.pool(), "bob").await.unwrap();

    let response = server
        .put("/auth/me")
        .authorization_bearer(&alice.token)
        .json(&json!({ "email": bob.email }))
        .await;

    crate::assert_status!(response, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_update_me_invalid_patch_changes_nothing() {
    let db = TestDatabase::new().await;
    let server = create_test_server(test_state(&db));
    let user = create_test_user(db.pool(), "alice").await.unwrap();

    let response = server
        .put("/auth/me")
        .authorization_bearer(&user.token)
        .json(&json!({ "full_name": "Changed", "password": "short" }))
        .await;
    crate::assert_status!(response, StatusCode::BAD_REQUEST);

    let me: UserResponse = server.get("/auth/me").authorization_bearer(&user.token).await.json();
    assert_eq!(me.full_name, None);
}

#[tokio::test]
async fn test_search_users() {
    let db = TestDatabase::new().await;
    let server = create_test_server(test_state(&db));
    let alice = create_test_user(db.pool(), "alice").await.unwrap();
    create_named_test_user(db.pool(), "bob", Some("Albert Robson")).await.unwrap();
    create_test_user(db.pool(), "carol").await.unwrap();
    create_named_test_user(db.pool(), "alfred", Some("Alfred Pennyworth")).await.unwrap();

    let response = server
        .get("/users/search")
        .authorization_bearer(&alice.token)
        .add_query_param("q", "AL")
        .await;

    crate::assert_status!(response, StatusCode::OK);
    let users: Vec<UserResponse> = response.json();
    let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
    // ordered by full name, falling back to username; the caller is excluded
    assert_eq!(names, vec!["bob", "alfred"]);
}

#[tokio::test]
async fn test_search_requires_token() {
    let db = TestDatabase::new().await;
    let server = create_test_server(test_state(&db));

    let response = server.get("/users/search").add_query_param("q", "a").await;
    crate::assert_status!(response, StatusCode::UNAUTHORIZED);
}
