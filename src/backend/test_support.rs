//! Fixtures for in-crate tests.

use sqlx::SqlitePool;

use crate::backend::auth::users::{create_user, NewUser, User};
use crate::backend::middleware::auth::AuthenticatedUser;
use crate::backend::server::config::load_database;

/// Fresh in-memory database with migrations applied
pub async fn test_pool() -> SqlitePool {
    load_database("sqlite::memory:")
        .await
        .expect("in-memory database")
}

/// Create `username` with email `<username>@example.com` and password `password123`
pub async fn create_test_user(pool: &SqlitePool, username: &str) -> User {
    let password_hash = bcrypt::hash("password123", 4).expect("hash password");
    create_user(
        pool,
        NewUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            full_name: None,
            password_hash,
            role: "user".to_string(),
        },
    )
    .await
    .expect("create test user")
}

/// Caller identity for `user`, as the auth middleware would build it
pub fn identity(user: &User) -> AuthenticatedUser {
    AuthenticatedUser::from(user)
}
