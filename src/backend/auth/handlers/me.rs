/**
 * Current User Handlers
 *
 * GET /auth/me and PUT /auth/me. Both sit behind `auth_middleware`.
 */

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use sqlx::SqlitePool;

use crate::backend::auth::handlers::register::is_unique_violation;
use crate::backend::auth::handlers::types::UserResponse;
use crate::backend::auth::users::{get_user_by_email, get_user_by_id, update_user, User, UserPatch};
use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::config::ServerConfig;
use crate::shared::SharedError;

async fn load_current(pool: &SqlitePool, auth_user: &AuthUser) -> Result<User, BackendError> {
    let user_id = auth_user.0.user_id;
    get_user_by_id(pool, user_id)
        .await?
        .ok_or_else(|| SharedError::not_found("user", user_id).into())
}

/// Get the current user
pub async fn get_me(
    State(pool): State<SqlitePool>,
    auth_user: AuthUser,
) -> Result<Json<UserResponse>, BackendError> {
    let user = load_current(&pool, &auth_user).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Update the current user
///
/// Absent fields are left unchanged. The whole patch is validated before
/// anything is written; a new password is re-hashed.
///
/// # Errors
///
/// * `400 Bad Request` - A present field is invalid
/// * `409 Conflict` - The new email belongs to another user
pub async fn update_me(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<ServerConfig>>,
    auth_user: AuthUser,
    Json(patch): Json<UserPatch>,
) -> Result<Json<UserResponse>, BackendError> {
    patch.validate()?;
    let user = load_current(&pool, &auth_user).await?;

    if let Some(email) = patch.email.as_deref() {
        if email != user.email {
            if let Some(existing) = get_user_by_email(&pool, email).await? {
                if existing.id != user.id {
                    return Err(BackendError::handler(StatusCode::CONFLICT, "Email already registered"));
                }
            }
        }
    }

    let password_hash = match patch.password.as_deref() {
        Some(password) => Some(bcrypt::hash(password, config.auth.bcrypt_cost).map_err(|e| {
            tracing::error!("[Auth] Failed to hash password: {:?}", e);
            BackendError::handler(StatusCode::INTERNAL_SERVER_ERROR, "Failed to hash password")
        })?),
        None => None,
    };

    let updated = update_user(&pool, user, patch, password_hash).await.map_err(|e| {
        if is_unique_violation(&e) {
            BackendError::handler(StatusCode::CONFLICT, "Email already registered")
        } else {
            BackendError::from(e)
        }
    })?;

    tracing::info!("[Auth] Profile updated for {}", updated.username);
    Ok(Json(UserResponse::from(updated)))
}
