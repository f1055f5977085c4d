/**
 * Authentication Middleware
 *
 * Protects routes that require a logged-in user. The middleware reads the
 * `Authorization: Bearer <token>` header, verifies the token, loads the user
 * and attaches an `AuthenticatedUser` to the request extensions. Handlers
 * pick it up through the `AuthUser` extractor.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::backend::auth::sessions::verify_token;
use crate::backend::auth::users::{get_user_by_id, User};
use crate::backend::error::BackendError;
use crate::backend::server::config::AuthConfig;
use crate::backend::server::state::AppState;

/// Authenticated caller identity
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
    /// Full name, else username
    pub display_name: String,
    pub email: String,
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            display_name: user.display_name(),
            email: user.email.clone(),
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Verify `token` and load the active user it names
///
/// # Errors
///
/// `AuthError` for bad or expired tokens and for unknown or inactive users,
/// `StorageError` when the lookup fails.
pub async fn resolve_user(pool: &SqlitePool, config: &AuthConfig, token: &str) -> Result<User, BackendError> {
    let claims = verify_token(config, token).map_err(|e| {
        tracing::warn!("[Auth] Invalid token: {:?}", e);
        BackendError::auth("Could not validate credentials")
    })?;

    let user_id = claims
        .user_id()
        .ok_or_else(|| BackendError::auth("Could not validate credentials"))?;

    let user = get_user_by_id(pool, user_id).await?.ok_or_else(|| {
        tracing::warn!("[Auth] Token for unknown user {}", user_id);
        BackendError::auth("Could not validate credentials")
    })?;

    if !user.is_active {
        return Err(BackendError::auth("Inactive user"));
    }

    Ok(user)
}

/// Authentication middleware
///
/// Returns 401 if the token is missing, invalid, expired, or names a user
/// that no longer exists.
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let token = bearer_token(request.headers()).ok_or_else(|| {
        tracing::debug!("[Auth] Missing bearer token for {}", request.uri().path());
        BackendError::auth("Not authenticated")
    })?;

    let user = resolve_user(&app_state.db_pool, &app_state.config.auth, token).await?;

    request.extensions_mut().insert(AuthenticatedUser::from(&user));

    Ok(next.run(request).await)
}

/// Axum extractor for the authenticated user
///
/// Only valid behind `auth_middleware`.
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("[Auth] AuthenticatedUser not found in request extensions");
                BackendError::auth("Not authenticated")
            })?;

        Ok(AuthUser(user))
    }
}
