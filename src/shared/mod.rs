//! Shared Module
//!
//! Types shared between the server and its clients: message and room
//! records, live event frames and the transport-independent error type.
//! Everything here is plain serde data and compiles without the `ssr`
//! feature.

/// Live connection event frames
pub mod event;

/// Shared error types
pub mod error;

/// Messaging and room types
pub mod messaging;

pub use event::{LiveEvent, MessageNotification};
pub use error::SharedError;
