/**
 * Router Configuration
 *
 * Combines the account and chat routes into one router, adds the health
 * check and wraps everything in the HTTP tracing and CORS layers.
 */

use axum::{extract::State, response::Json, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::backend::error::BackendError;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::routes::chat_routes::configure_chat_routes;
use crate::backend::server::state::AppState;

/// GET /health
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "connected_users": state.registry.connected_count().await,
    }))
}

async fn not_found() -> BackendError {
    BackendError::handler(axum::http::StatusCode::NOT_FOUND, "Not Found")
}

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Pool, registry and configuration shared by all handlers
///
/// # Returns
///
/// Router ready to serve requests
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new().route("/health", get(health));

    let router = configure_api_routes(router, &app_state);
    let router = configure_chat_routes(router, &app_state);

    router
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(app_state)
}
