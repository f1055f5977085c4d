/**
 * Server Initialization
 *
 * Builds the Axum application from a `ServerConfig`:
 *
 * 1. Open the SQLite database and run migrations
 * 2. Create an empty connection registry
 * 3. Assemble the router around the shared `AppState`
 *
 * The registry always starts empty; live connections do not survive a
 * restart.
 */

use axum::Router;

use crate::backend::error::BackendError;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, ServerConfig};
use crate::backend::server::state::AppState;

/// Create and configure the Axum application
///
/// # Errors
///
/// Fails when the database cannot be opened or migrated.
pub async fn create_app(config: ServerConfig) -> Result<Router<()>, BackendError> {
    tracing::info!("[Startup] Initializing chat backend");

    let db_pool = load_database(&config.database_url).await?;
    let app_state = AppState::new(db_pool, config);

    tracing::info!(
        "[Startup] Router configured (push timeout {:?}, outbound buffer {})",
        app_state.config.push_timeout,
        app_state.config.outbound_buffer
    );

    Ok(create_router(app_state))
}
