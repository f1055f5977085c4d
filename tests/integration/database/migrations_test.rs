//! Migration tests

use pretty_assertions::assert_eq;

use crate::common::TestDatabase;

#[tokio::test]
async fn test_migrations_create_tables() {
    let db = TestDatabase::new().await;

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE '\\_%' ESCAPE '\\' AND name NOT LIKE 'sqlite%' ORDER BY name",
    )
    .fetch_all(db.pool())
    .await
    .unwrap();

    assert_eq!(tables, vec!["chat_messages", "chat_room_members", "chat_rooms", "users"]);
}

#[tokio::test]
async fn test_usernames_are_unique() {
    let db = TestDatabase::new().await;
    crate::common::create_test_user(db.pool(), "alice").await.unwrap();

    let duplicate = crate::common::create_test_user(db.pool(), "alice").await;
    crate::assert_err!(duplicate);
}
