/**
 * Live Event Frames
 *
 * Events written to a user's live connection as JSON text frames. Every
 * frame carries a `type` discriminator:
 *
 * - `connected` - registration finished, pushes will now reach this socket
 * - `new_message` - someone sent this user a direct message
 * - `sent` - acknowledgement of a message sent over this socket
 * - `error` - an inbound frame was rejected
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::messaging::ChatMessage;

/// Notification pushed to the recipient of a direct message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageNotification {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_username: String,
    pub message: String,
    /// RFC 3339 timestamp of the stored message
    pub created_at: String,
}

impl From<&ChatMessage> for MessageNotification {
    fn from(message: &ChatMessage) -> Self {
        Self {
            id: message.id,
            sender_id: message.sender_id,
            sender_username: message.sender_username.clone(),
            message: message.message.clone(),
            created_at: message.created_at.to_rfc3339(),
        }
    }
}

/// Frame written to a live connection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    /// The connection is registered for `user_id`
    Connected { user_id: Uuid },
    /// A direct message arrived
    NewMessage(MessageNotification),
    /// A message sent over this connection was stored
    Sent { message: ChatMessage },
    /// An inbound frame was rejected
    Error { message: String },
}

impl LiveEvent {
    /// Build a `new_message` event for the recipient of `message`
    pub fn new_message(message: &ChatMessage) -> Self {
        Self::NewMessage(MessageNotification::from(message))
    }

    /// Build an `error` event
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Serialize to the JSON text sent over the wire
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
