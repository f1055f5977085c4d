//! Routes Module
//!
//! HTTP route configuration.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs         - Module exports and documentation
//! ├── router.rs      - Main router assembly, health check, layers
//! ├── api_routes.rs  - Account routes (/auth, /users)
//! └── chat_routes.rs - Chat routes (/chat)
//! ```

pub mod router;

pub mod api_routes;

pub mod chat_routes;

pub use router::create_router;
