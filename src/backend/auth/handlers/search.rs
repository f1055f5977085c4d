//! GET /users/search?q=&role=

use axum::{
    extract::{Query, State},
    response::Json,
};
use sqlx::SqlitePool;

use crate::backend::auth::handlers::types::{SearchQuery, UserResponse};
use crate::backend::auth::users::search_users as find_users;
use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthUser;

/// Up to ten other users whose username or full name contains `q`
pub async fn search_users(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<UserResponse>>, BackendError> {
    let needle = query.q.unwrap_or_default();
    let role = query.role.as_deref().filter(|role| !role.is_empty());

    let users = find_users(&pool, user.user_id, &needle, role).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}
