//! Test server construction
//!
//! Builds the real router around a test database so HTTP and WebSocket
//! tests go through the same middleware as production.

use std::time::Duration;

use axum_test::TestServer;

use polygone::backend::routes::router::create_router;
use polygone::backend::server::{AppState, ServerConfig};

use super::database::TestDatabase;

pub const TEST_SECRET: &str = "polygone-test-secret";

/// Configuration with a fixed secret and the cheapest bcrypt cost
pub fn test_config() -> ServerConfig {
    ServerConfig::builder()
        .database_url("sqlite::memory:")
        .jwt_secret(TEST_SECRET)
        .bcrypt_cost(4)
        .push_timeout(Duration::from_millis(500))
        .build()
        .expect("Failed to build test config")
}

/// Application state sharing the fixture's pool
pub fn test_state(db: &TestDatabase) -> AppState {
    AppState::new(db.pool().clone(), test_config())
}

/// In-process test server for plain HTTP tests
pub fn create_test_server(state: AppState) -> TestServer {
    TestServer::new(create_router(state)).expect("Failed to start test server")
}

/// Test server on a real socket, needed for WebSocket upgrades
pub fn create_live_test_server(state: AppState) -> TestServer {
    TestServer::builder()
        .http_transport()
        .build(create_router(state))
        .expect("Failed to start live test server")
}
