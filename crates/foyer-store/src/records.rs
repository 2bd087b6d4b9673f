//! Record shapes stored in each collection, and conversions to documents.
//!
//! ```text
//! players/{name}  { password, statusCode, createdAt }
//! rooms/{id}      { statusCode, playerByIds[], name, maxPlayers, type, createdAt }
//! chats/{id}      { messages[{timestamp, playerName, content}], createdAt }
//! ```
//!
//! A room and its chat log share the same id.

use std::time::{SystemTime, UNIX_EPOCH};

use foyer_protocol::{PlayerName, RoomId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{DocKey, Document, StoreError};

pub const PLAYERS: &str = "players";
pub const ROOMS: &str = "rooms";
pub const CHATS: &str = "chats";

/// Field holding a record's status code (players and rooms).
pub const STATUS_CODE: &str = "statusCode";
/// Field holding a room's member list.
pub const MEMBERS: &str = "playerByIds";
/// Field holding a chat log's messages.
pub const MESSAGES: &str = "messages";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub password: String,
    #[serde(rename = "statusCode", default)]
    pub status_code: i64,
    #[serde(rename = "createdAt")]
    pub created_at: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRecord {
    #[serde(rename = "statusCode", default)]
    pub status_code: i64,
    #[serde(rename = "playerByIds", default)]
    pub members: Vec<PlayerName>,
    pub name: String,
    #[serde(rename = "maxPlayers")]
    pub max_players: u32,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "createdAt")]
    pub created_at: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRecord {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(rename = "createdAt")]
    pub created_at: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    #[serde(rename = "playerName")]
    pub player_name: PlayerName,
    pub content: String,
}

pub fn player_key(name: &PlayerName) -> DocKey {
    DocKey::new(PLAYERS, name.as_str())
}

pub fn room_key(id: &RoomId) -> DocKey {
    DocKey::new(ROOMS, id.as_str())
}

/// A chat log lives under its room's id.
pub fn chat_key(id: &RoomId) -> DocKey {
    DocKey::new(CHATS, id.as_str())
}

/// Milliseconds since the Unix epoch, saturating at zero for clocks set
/// before 1970.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Converts a record into a storable document.
pub fn to_document<T: Serialize>(record: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(record).map_err(StoreError::InvalidDocument)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidDocument(serde::ser::Error::custom(
            format!("record serialized to {other}, expected an object"),
        ))),
    }
}

/// Reads a stored document back as a record.
pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, StoreError> {
    serde_json::from_value(serde_json::Value::Object(doc)).map_err(StoreError::InvalidDocument)
}

/// Converts a single value for use with the list operations.
pub fn to_value<T: Serialize>(value: &T) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(value).map_err(StoreError::InvalidDocument)
}
