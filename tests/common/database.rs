//! Database test fixtures
//!
//! Every fixture gets its own in-memory SQLite database with the migrations
//! applied, so tests never share rows.

use sqlx::SqlitePool;

use polygone::backend::server::config::load_database;

/// Create a migrated in-memory database pool
pub async fn create_test_pool() -> SqlitePool {
    load_database("sqlite::memory:")
        .await
        .expect("Failed to create test database pool")
}

/// Test database fixture
pub struct TestDatabase {
    pool: SqlitePool,
}

impl TestDatabase {
    /// Create a new test database fixture
    pub async fn new() -> Self {
        Self {
            pool: create_test_pool().await,
        }
    }

    /// Get the database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Count rows in `chat_messages`
    pub async fn message_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM chat_messages")
            .fetch_one(&self.pool)
            .await
            .expect("Failed to count messages")
    }
}
