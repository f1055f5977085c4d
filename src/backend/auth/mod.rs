//! Authentication Module
//!
//! User accounts, password hashing and JWT sessions.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── users.rs        - User model and database operations
//! ├── sessions.rs     - JWT token management
//! └── handlers/       - HTTP handlers
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Register**: username, email and password → user created (201)
//! 2. **Login**: username (or email) and password → bearer token
//! 3. **Me**: bearer token → current user, or a patch applied to it
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt before storage
//! - Tokens are HS256 JWTs whose subject is the user id
//! - Invalid credentials return 401 without saying which part was wrong

/// User data model and database operations
pub mod users;

/// JWT token management
pub mod sessions;

/// HTTP handlers
pub mod handlers;

pub use handlers::{get_me, login, register, search_users, update_me};
pub use users::{User, UserPatch};
