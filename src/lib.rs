//! Polygone - Chat Backend Library
//!
//! A small multi-user backend: account registration and login with JWT
//! bearer tokens, direct messages with read state, rooms, and live delivery
//! of new messages over a WebSocket.
//!
//! # Module Structure
//!
//! - **`shared`** - Serializable types used on both sides of the wire
//!   - Messages, conversation summaries, rooms
//!   - Live event frames
//!   - Error types
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP server and WebSocket endpoint
//!   - SQLite persistence through sqlx
//!   - Connection registry and delivery coordinator
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - Enables the backend modules and the server binary
//!
//! # Usage
//!
//! ```rust,no_run
//! use polygone::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(ServerConfig::from_env()?).await?;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
