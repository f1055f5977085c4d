/**
 * User Model and Database Operations
 *
 * The user directory: account records, lookups, profile patches and search.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::shared::SharedError;

/// Maximum number of results returned by `search_users`
pub const SEARCH_LIMIT: i64 = 10;

/// User struct representing a row of the `users` table
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID)
    pub id: Uuid,
    /// Email address (unique)
    pub email: String,
    /// Username (unique, 3-30 chars, alphanumeric + underscore)
    pub username: String,
    /// Full name, shown instead of the username when set
    pub full_name: Option<String>,
    /// Hashed password (bcrypt)
    pub password_hash: String,
    /// Inactive users cannot log in
    pub is_active: bool,
    /// Free-form role, `user` by default
    pub role: String,
    /// Avatar reference
    pub avatar: Option<String>,
    /// Phone number
    pub phone: Option<String>,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
    /// Updated at timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Name shown to other users: full name, else username
    pub fn display_name(&self) -> String {
        match self.full_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => self.username.clone(),
        }
    }
}

/// Fields needed to create a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub password_hash: String,
    pub role: String,
}

/// Partial profile update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub role: Option<String>,
    /// Plain-text password; hashed before it reaches the database
    pub password: Option<String>,
}

impl UserPatch {
    /// Validate every present field before anything is written
    pub fn validate(&self) -> Result<(), SharedError> {
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(password) = &self.password {
            validate_password(password)?;
        }
        if let Some(role) = &self.role {
            if role.trim().is_empty() || role.len() > 32 {
                return Err(SharedError::validation("role", "Role must be 1-32 characters"));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.full_name.is_none()
            && self.phone.is_none()
            && self.avatar.is_none()
            && self.role.is_none()
            && self.password.is_none()
    }
}

/// Validate username format
///
/// Usernames must be:
/// - 3-30 characters long
/// - Contain only alphanumeric characters and underscores
/// - Start with a letter
pub fn is_valid_username(username: &str) -> bool {
    if username.len() < 3 || username.len() > 30 {
        return false;
    }

    let mut chars = username.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn validate_email(email: &str) -> Result<(), SharedError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(SharedError::validation("email", "Invalid email format")),
    }
}

pub fn validate_password(password: &str) -> Result<(), SharedError> {
    if password.len() < 8 {
        return Err(SharedError::validation("password", "Password must be at least 8 characters"));
    }
    Ok(())
}

const USER_COLUMNS: &str = "id, email, username, full_name, password_hash, is_active, role, avatar, phone, created_at, updated_at";

/// Create a new user
///
/// # Arguments
/// * `pool` - Database connection pool
/// * `new_user` - Account fields (password already hashed)
///
/// # Returns
/// Created user or error (unique violations surface as `sqlx::Error::Database`)
pub async fn create_user(pool: &SqlitePool, new_user: NewUser) -> Result<User, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (id, email, username, full_name, password_hash, is_active, role, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, 1, ?, ?, ?)
        RETURNING {}
        "#,
        USER_COLUMNS
    ))
    .bind(id)
    .bind(&new_user.email)
    .bind(&new_user.username)
    .bind(&new_user.full_name)
    .bind(&new_user.password_hash)
    .bind(&new_user.role)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Get user by email
pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS))
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Get user by username
pub async fn get_user_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS))
        .bind(username)
        .fetch_optional(pool)
        .await
}

/// Get user by ID
///
/// # Returns
/// User or None if not found
pub async fn get_user_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Apply a validated patch to `user` and persist the result
///
/// # Arguments
/// * `pool` - Database connection pool
/// * `user` - Current state of the user
/// * `patch` - Changes to apply (its `password` is ignored here)
/// * `password_hash` - New hash when the password changes
pub async fn update_user(
    pool: &SqlitePool,
    mut user: User,
    patch: UserPatch,
    password_hash: Option<String>,
) -> Result<User, sqlx::Error> {
    if let Some(email) = patch.email {
        user.email = email;
    }
    if let Some(full_name) = patch.full_name {
        user.full_name = Some(full_name);
    }
    if let Some(phone) = patch.phone {
        user.phone = Some(phone);
    }
    if let Some(avatar) = patch.avatar {
        user.avatar = Some(avatar);
    }
    if let Some(role) = patch.role {
        user.role = role;
    }
    if let Some(hash) = password_hash {
        user.password_hash = hash;
    }
    user.updated_at = Utc::now();

    sqlx::query(
        r#"
        UPDATE users
        SET email = ?, full_name = ?, phone = ?, avatar = ?, role = ?, password_hash = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&user.email)
    .bind(&user.full_name)
    .bind(&user.phone)
    .bind(&user.avatar)
    .bind(&user.role)
    .bind(&user.password_hash)
    .bind(user.updated_at)
    .bind(user.id)
    .execute(pool)
    .await?;

    Ok(user)
}

/// Search other users by username or full name
///
/// Case-insensitive substring match, optional exact role filter, ordered by
/// full name and capped at `SEARCH_LIMIT`. The requesting user is excluded.
pub async fn search_users(
    pool: &SqlitePool,
    requester_id: Uuid,
    query: &str,
    role: Option<&str>,
) -> Result<Vec<User>, sqlx::Error> {
    let pattern = format!("%{}%", query.trim().to_lowercase());

    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT {}
        FROM users
        WHERE id != ?
          AND (? IS NULL OR role = ?)
          AND (lower(username) LIKE ? OR lower(COALESCE(full_name, '')) LIKE ?)
        ORDER BY COALESCE(full_name, username) ASC
        LIMIT ?
        "#,
        USER_COLUMNS
    ))
    .bind(requester_id)
    .bind(role)
    .bind(role)
    .bind(&pattern)
    .bind(&pattern)
    .bind(SEARCH_LIMIT)
    .fetch_all(pool)
    .await
}
