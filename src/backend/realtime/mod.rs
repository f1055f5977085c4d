//! Real-time Delivery Module
//!
//! Live connections over WebSocket.
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs      - Module exports and documentation
//! ├── registry.rs - One connection handle per user, best-effort push
//! └── socket.rs   - WebSocket endpoint and connection lifecycle
//! ```
//!
//! # Delivery Model
//!
//! A connection's writer task drains a bounded mpsc channel. Everything that
//! wants to reach the user (pushes from other senders, replies to the user's
//! own frames) goes through that channel, so only the writer ever touches
//! the socket sink.

pub mod registry;

pub mod socket;

pub use registry::{ConnectionHandle, ConnectionRegistry, DeliveryOutcome, Frame};
pub use socket::{live_socket, ConnectionState};
