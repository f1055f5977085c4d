//! Conversation Summary
//!
//! Derived view of a direct-message relationship. Never persisted; rebuilt
//! from stored messages on every request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Summary of one conversation from the requesting user's point of view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationSummary {
    /// The other participant
    pub user_id: Uuid,
    /// The other participant's username
    pub username: String,
    /// The other participant's full name, if set
    pub full_name: Option<String>,
    /// Body of the most recent message in either direction
    pub last_message: String,
    /// Timestamp of the most recent message
    pub last_message_time: DateTime<Utc>,
    /// Messages from the other participant not yet read by the requester
    pub unread_count: u64,
    /// Whether the other participant currently holds a live connection
    pub is_online: bool,
}
