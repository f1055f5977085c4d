//! Chat Message Data Structure
//!
//! Represents a single persisted chat message plus the request types used to
//! send and list messages.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Default number of messages returned by a history query
pub const DEFAULT_HISTORY_LIMIT: u32 = 100;

/// Upper bound accepted for a history query
pub const MAX_HISTORY_LIMIT: u32 = 500;

/// Kind of message content
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Plain text message
    #[default]
    Text,
    /// Image reference (URL or identifier in the body)
    Image,
    /// File reference (URL or identifier in the body)
    File,
}

impl MessageKind {
    /// Database / wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Image => "image",
            MessageKind::File => "file",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(MessageKind::Text),
            "image" => Ok(MessageKind::Image),
            "file" => Ok(MessageKind::File),
            other => Err(SharedError::validation(
                "message_type",
                format!("Unknown message type '{}'; expected text, image or file", other),
            )),
        }
    }
}

/// A persisted chat message
///
/// `receiver_id` is `None` for group-addressed messages. Everything except
/// `is_read` and `updated_at` is fixed once the message is stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    /// Unique message ID
    pub id: Uuid,
    /// Author of the message
    pub sender_id: Uuid,
    /// Author's username at send time
    pub sender_username: String,
    /// Author's display name at send time (full name, else username)
    pub sender_name: Option<String>,
    /// Direct recipient, absent for group-addressed messages
    pub receiver_id: Option<Uuid>,
    /// Message body
    pub message: String,
    /// Content kind
    pub message_type: MessageKind,
    /// Whether the recipient has read the message
    pub is_read: bool,
    /// When the message was stored
    pub created_at: DateTime<Utc>,
    /// Last change to the read flag
    pub updated_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Whether this message was exchanged between the two given users, in either direction
    pub fn is_between(&self, a: Uuid, b: Uuid) -> bool {
        (self.sender_id == a && self.receiver_id == Some(b))
            || (self.sender_id == b && self.receiver_id == Some(a))
    }
}

/// Request to send a message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendMessageRequest {
    /// Direct recipient; omit for a group-addressed message
    #[serde(default)]
    pub receiver_id: Option<Uuid>,
    /// Message body
    pub message: String,
    /// Content kind (`text`, `image`, `file`); defaults to `text`
    #[serde(default)]
    pub message_type: Option<String>,
}

impl SendMessageRequest {
    /// Direct text message to `receiver_id`
    pub fn direct(receiver_id: Uuid, message: impl Into<String>) -> Self {
        Self {
            receiver_id: Some(receiver_id),
            message: message.into(),
            message_type: None,
        }
    }

    /// Validate the request and resolve its message kind
    ///
    /// # Errors
    ///
    /// `SharedError::ValidationError` when the body is blank or the kind is unknown.
    pub fn validate(&self) -> Result<MessageKind, SharedError> {
        if self.message.trim().is_empty() {
            return Err(SharedError::validation("message", "Message body cannot be empty"));
        }

        match self.message_type.as_deref() {
            None => Ok(MessageKind::default()),
            Some(kind) => kind.parse(),
        }
    }
}

/// Query parameters for message history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListMessagesQuery {
    /// Restrict to the conversation with this user
    pub other_user_id: Option<Uuid>,
    /// Maximum number of messages (default 100, clamped to 1..=500)
    pub limit: Option<u32>,
}

impl ListMessagesQuery {
    /// Effective limit after applying the default and clamp
    pub fn effective_limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT)
    }
}

/// Response for marking a conversation as read
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkReadResponse {
    /// Human-readable status
    pub message: String,
    /// Number of messages that changed state
    pub updated: u64,
}
