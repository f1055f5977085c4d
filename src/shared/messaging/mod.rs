//! Messaging Module
//!
//! Data structures for direct messaging and rooms:
//!
//! - `ChatMessage` - A persisted message
//! - `ConversationSummary` - Derived per-correspondent view
//! - `ChatRoom` / `RoomMember` - Rooms and memberships
//!
//! # Usage
//!
//! ```rust
//! use polygone::shared::messaging::{ChatMessage, ConversationSummary, SendMessageRequest};
//! ```

pub mod message;
pub mod conversation;
pub mod room;

pub use message::{
    ChatMessage, ListMessagesQuery, MarkReadResponse, MessageKind, SendMessageRequest,
    DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT,
};
pub use conversation::ConversationSummary;
pub use room::{ChatRoom, CreateRoomRequest, RoomMember, RoomType};
