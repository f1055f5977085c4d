/**
 * Application State Management
 *
 * `AppState` is the central state container handed to the router:
 * - the SQLite pool backing the message store, rooms and user directory
 * - the connection registry for live delivery
 * - the loaded server configuration
 *
 * # State Extraction
 *
 * The `FromRef` implementations let handlers extract just the part they
 * need, e.g. `State(pool): State<SqlitePool>`.
 */

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::backend::realtime::registry::ConnectionRegistry;
use crate::backend::server::config::ServerConfig;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Database pool
    pub db_pool: SqlitePool,
    /// Live connections by user id
    pub registry: ConnectionRegistry,
    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Build the state around an open pool, creating an empty registry
    pub fn new(db_pool: SqlitePool, config: ServerConfig) -> Self {
        Self {
            db_pool,
            registry: ConnectionRegistry::new(config.push_timeout),
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.db_pool.clone()
    }
}

impl FromRef<AppState> for ConnectionRegistry {
    fn from_ref(state: &AppState) -> Self {
        state.registry.clone()
    }
}

impl FromRef<AppState> for Arc<ServerConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
