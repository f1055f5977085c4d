//! Backend Module
//!
//! All server-side code: the Axum HTTP server, authentication, the message
//! store and the live delivery path.
//!
//! This module is only compiled when the `ssr` feature is enabled (it is on
//! by default).
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs      - Module exports and documentation
//! ├── server/     - Configuration, state, app creation
//! ├── routes/     - Route configuration
//! ├── auth/       - Users, JWT sessions, account handlers
//! ├── middleware/ - Bearer token authentication
//! ├── messaging/  - Message store, conversations, rooms, delivery
//! ├── realtime/   - Connection registry and WebSocket endpoint
//! └── error/      - Error types
//! ```
//!
//! # Message Flow
//!
//! A message arrives over `POST /chat/messages` or as a frame on the
//! sender's live socket. `messaging::delivery::send` validates it, stores it
//! and then pushes a `new_message` event to the recipient's live connection
//! if there is one. History and conversation views read only from the
//! store.
//!
//! # Thread Safety
//!
//! - The SQLite pool is shared by all handlers
//! - `ConnectionRegistry` keeps its map behind a `tokio::sync::RwLock`
//! - Each live connection owns one writer task fed by a bounded mpsc channel

/// Server setup and configuration
#[cfg(feature = "ssr")]
pub mod server;

/// Route configuration
#[cfg(feature = "ssr")]
pub mod routes;

/// Live connections
#[cfg(feature = "ssr")]
pub mod realtime;

/// Backend error types
#[cfg(feature = "ssr")]
pub mod error;

/// Authentication and user management
#[cfg(feature = "ssr")]
pub mod auth;

/// Middleware for request processing
#[cfg(feature = "ssr")]
pub mod middleware;

/// Messages, conversations and rooms
#[cfg(feature = "ssr")]
pub mod messaging;

#[cfg(all(test, feature = "ssr"))]
pub(crate) mod test_support;

#[cfg(feature = "ssr")]
pub use server::create_app;
#[cfg(feature = "ssr")]
pub use error::BackendError;
#[cfg(feature = "ssr")]
pub use realtime::ConnectionRegistry;
