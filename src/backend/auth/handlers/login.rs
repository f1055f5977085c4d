/**
 * Login Handler
 *
 * POST /auth/login
 *
 * Verifies a username (or email) and password and returns a bearer token.
 * Unknown users and wrong passwords get the same 401 so usernames cannot be
 * probed.
 */

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use bcrypt::verify;
use sqlx::SqlitePool;

use crate::backend::auth::handlers::types::{LoginRequest, TokenResponse};
use crate::backend::auth::sessions::create_token;
use crate::backend::auth::users::{get_user_by_email, get_user_by_username};
use crate::backend::error::BackendError;
use crate::backend::server::config::ServerConfig;

/// Login handler
///
/// # Errors
///
/// * `401 Unauthorized` - Unknown user or wrong password
/// * `400 Bad Request` - The account is inactive
/// * `500 Internal Server Error` - Storage, hashing or token failure
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<ServerConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, BackendError> {
    tracing::info!("[Auth] Login request for: {}", request.username);

    let user = if request.username.contains('@') {
        get_user_by_email(&pool, &request.username).await?
    } else {
        get_user_by_username(&pool, &request.username).await?
    };

    let user = user.ok_or_else(|| {
        tracing::warn!("[Auth] User not found: {}", request.username);
        BackendError::auth("Incorrect username or password")
    })?;

    let valid = verify(&request.password, &user.password_hash).map_err(|e| {
        tracing::error!("[Auth] Password verification error: {:?}", e);
        BackendError::handler(StatusCode::INTERNAL_SERVER_ERROR, "Password verification failed")
    })?;

    if !valid {
        tracing::warn!("[Auth] Invalid password for user: {}", request.username);
        return Err(BackendError::auth("Incorrect username or password"));
    }

    if !user.is_active {
        return Err(BackendError::handler(StatusCode::BAD_REQUEST, "Inactive user"));
    }

    let token = create_token(&config.auth, user.id, &user.username).map_err(|e| {
        tracing::error!("[Auth] Failed to create token: {:?}", e);
        BackendError::handler(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create token")
    })?;

    tracing::info!("[Auth] User logged in: {}", user.username);
    Ok(Json(TokenResponse::bearer(token)))
}
