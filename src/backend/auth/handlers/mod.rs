//! Authentication Handlers Module
//!
//! HTTP handlers for account endpoints.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs      - Module exports and documentation
//! ├── types.rs    - Request and response types
//! ├── register.rs - User registration handler
//! ├── login.rs    - User authentication handler
//! ├── me.rs       - Current user read/update handlers
//! └── search.rs   - User search handler
//! ```
//!
//! # Handlers
//!
//! - **`register`** - POST /auth/register
//! - **`login`** - POST /auth/login
//! - **`get_me`** / **`update_me`** - GET/PUT /auth/me
//! - **`search_users`** - GET /users/search

/// Request and response types
pub mod types;

/// Registration handler
pub mod register;

/// Login handler
pub mod login;

/// Current user handlers
pub mod me;

/// User search handler
pub mod search;

pub use types::{LoginRequest, RegisterRequest, SearchQuery, TokenResponse, UserResponse};

pub use register::register;
pub use login::login;
pub use me::{get_me, update_me};
pub use search::search_users;
