/**
 * Authentication Handler Types
 *
 * Request and response bodies for the register, login, profile and search
 * handlers.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::auth::users::{is_valid_username, validate_email, validate_password, User};
use crate::shared::SharedError;

/// Registration request
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RegisterRequest {
    /// Chosen username (3-30 chars, alphanumeric + underscore, starts with a letter)
    pub username: String,
    pub email: String,
    /// Plain-text password (at least 8 characters)
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    /// Defaults to `user`
    #[serde(default)]
    pub role: Option<String>,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), SharedError> {
        if !is_valid_username(&self.username) {
            return Err(SharedError::validation(
                "username",
                "Username must be 3-30 chars, start with a letter, and contain only letters, numbers, and underscores",
            ));
        }
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        Ok(())
    }
}

/// Login request
///
/// `username` may also be an email address.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Access token returned by login
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `bearer`
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// User response (without the password hash)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: Option<String>,
    pub role: String,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            full_name: user.full_name,
            role: user.role,
            avatar: user.avatar,
            phone: user.phone,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// Query parameters of GET /users/search
#[derive(Deserialize, Debug, Default)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}
