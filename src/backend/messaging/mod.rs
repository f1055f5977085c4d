//! Messaging Module
//!
//! Direct messages and rooms.
//!
//! # Module Structure
//!
//! ```text
//! messaging/
//! ├── store.rs         - Message persistence and read state
//! ├── conversations.rs - Per-user conversation summaries
//! ├── delivery.rs      - Persist-then-push coordinator
//! ├── rooms.rs         - Rooms and memberships
//! └── handlers.rs      - HTTP handlers
//! ```

pub mod store;
pub mod conversations;
pub mod delivery;
pub mod rooms;
pub mod handlers;

pub use conversations::conversations_for;
pub use delivery::send;
