/**
 * Account Routes
 *
 * ## Public
 * - `POST /auth/register` - User registration
 * - `POST /auth/login` - Obtain a bearer token
 *
 * ## Authenticated
 * - `GET /auth/me` - Current user
 * - `PUT /auth/me` - Update current user
 * - `GET /users/search` - Find other users
 */

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::backend::auth::{get_me, login, register, search_users, update_me};
use crate::backend::middleware::auth_middleware;
use crate::backend::server::state::AppState;

/// Add account routes to `router`
pub fn configure_api_routes(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/auth/me", get(get_me).put(update_me))
        .route("/users/search", get(search_users))
        .route_layer(middleware::from_fn_with_state(app_state.clone(), auth_middleware));

    router
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .merge(protected)
}
