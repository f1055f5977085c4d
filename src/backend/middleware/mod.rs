//! Middleware Module
//!
//! Request processing middleware. Currently only JWT authentication.

pub mod auth;

pub use auth::{auth_middleware, AuthUser, AuthenticatedUser};
