/**
 * Register Handler
 *
 * POST /auth/register
 *
 * # Registration Process
 *
 * 1. Validate username, email and password
 * 2. Reject duplicate usernames and emails (409)
 * 3. Hash the password with bcrypt
 * 4. Create the user and return it with 201
 */

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use sqlx::SqlitePool;

use crate::backend::auth::handlers::types::{RegisterRequest, UserResponse};
use crate::backend::auth::users::{create_user, get_user_by_email, get_user_by_username, NewUser};
use crate::backend::error::BackendError;
use crate::backend::server::config::ServerConfig;

/// Unique constraint violations surface when two registrations race
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Register handler
///
/// # Errors
///
/// * `400 Bad Request` - Invalid username, email or password
/// * `409 Conflict` - Username or email already in use
/// * `500 Internal Server Error` - Hashing or storage failure
pub async fn register(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<ServerConfig>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), BackendError> {
    tracing::info!("[Auth] Register request for username: {}", request.username);

    request.validate()?;

    if get_user_by_username(&pool, &request.username).await?.is_some() {
        tracing::warn!("[Auth] Username already exists: {}", request.username);
        return Err(BackendError::handler(StatusCode::CONFLICT, "Username already registered"));
    }

    if get_user_by_email(&pool, &request.email).await?.is_some() {
        tracing::warn!("[Auth] Email already exists: {}", request.email);
        return Err(BackendError::handler(StatusCode::CONFLICT, "Email already registered"));
    }

    let password_hash = bcrypt::hash(&request.password, config.auth.bcrypt_cost).map_err(|e| {
        tracing::error!("[Auth] Failed to hash password: {:?}", e);
        BackendError::handler(StatusCode::INTERNAL_SERVER_ERROR, "Failed to hash password")
    })?;

    let new_user = NewUser {
        username: request.username,
        email: request.email,
        full_name: request.full_name.filter(|name| !name.trim().is_empty()),
        password_hash,
        role: request.role.unwrap_or_else(|| "user".to_string()),
    };

    let user = create_user(&pool, new_user).await.map_err(|e| {
        if is_unique_violation(&e) {
            BackendError::handler(StatusCode::CONFLICT, "Username or email already registered")
        } else {
            BackendError::from(e)
        }
    })?;

    tracing::info!("[Auth] User registered: {} ({})", user.username, user.id);
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}
