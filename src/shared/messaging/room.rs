//! Chat Rooms
//!
//! Rooms and their memberships. Room messages are stored like any other
//! group-addressed message; rooms only track who belongs where.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Kind of room
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    /// Any number of members
    #[default]
    Group,
    /// Two-person room
    Direct,
}

impl RoomType {
    /// Database / wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Group => "group",
            RoomType::Direct => "direct",
        }
    }
}

impl FromStr for RoomType {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "group" => Ok(RoomType::Group),
            "direct" => Ok(RoomType::Direct),
            other => Err(SharedError::validation(
                "room_type",
                format!("Unknown room type '{}'; expected group or direct", other),
            )),
        }
    }
}

/// A chat room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRoom {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub room_type: RoomType,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Membership of one user in one room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomMember {
    pub id: Uuid,
    pub room_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub joined_at: DateTime<Utc>,
    pub unread_count: i64,
}

/// Request to create a room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub room_type: Option<String>,
}

impl CreateRoomRequest {
    /// Validate the request and resolve the room type
    pub fn validate(&self) -> Result<RoomType, SharedError> {
        if self.name.trim().is_empty() {
            return Err(SharedError::validation("name", "Room name cannot be empty"));
        }

        match self.room_type.as_deref() {
            None => Ok(RoomType::default()),
            Some(kind) => kind.parse(),
        }
    }
}
