//! Commands an authenticated client can send.
//!
//! On the wire a command is `{"type": "...", "payload": {...}}`. Decoding
//! happens in two steps so the caller can tell an unparsable frame
//! ([`ProtocolError::Decode`]) from a known command with a bad payload
//! ([`ProtocolError::InvalidPayload`]) and from a type it does not know
//! ([`ProtocolError::UnknownCommand`]).

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{ProtocolError, RoomId};

/// The untyped `{type, payload}` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Parameters for a new room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSpec {
    pub name: String,
    #[serde(rename = "maxPlayers", deserialize_with = "whole_capacity")]
    pub max_players: u32,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Reads any non-negative JSON number as a capacity, truncating fractions
/// the way `statusCode` is read.
fn whole_capacity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() || value < 0.0 || value > f64::from(u32::MAX) {
        return Err(D::Error::custom(format!("capacity out of range: {value}")));
    }
    Ok(value as u32)
}

/// A decoded command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateRoom(RoomSpec),
    JoinRoom { id: RoomId },
    LeaveRoom,
    ChangeStatus { status_code: i64 },
    ChatInRoom { message: String },
}

#[derive(Deserialize)]
struct JoinRoomPayload {
    id: RoomId,
}

#[derive(Deserialize)]
struct ChangeStatusPayload {
    // Any JSON number is accepted and truncated, so `2.0` and `2` agree.
    #[serde(rename = "statusCode")]
    status_code: f64,
}

#[derive(Deserialize)]
struct ChatInRoomPayload {
    message: String,
}

impl Command {
    pub const CREATE_ROOM: &'static str = "create-room";
    pub const JOIN_ROOM: &'static str = "join-room";
    pub const LEAVE_ROOM: &'static str = "leave-room";
    pub const CHANGE_STATUS: &'static str = "change-status";
    pub const CHAT_IN_ROOM: &'static str = "chat-in-room";

    /// Validates the envelope's payload against the shape its type requires.
    pub fn from_envelope(envelope: CommandEnvelope) -> Result<Self, ProtocolError> {
        let CommandEnvelope { kind, payload } = envelope;
        match kind.as_str() {
            Self::CREATE_ROOM => Ok(Self::CreateRoom(payload_as(Self::CREATE_ROOM, payload)?)),
            Self::JOIN_ROOM => {
                let p: JoinRoomPayload = payload_as(Self::JOIN_ROOM, payload)?;
                Ok(Self::JoinRoom { id: p.id })
            }
            Self::LEAVE_ROOM => Ok(Self::LeaveRoom),
            Self::CHANGE_STATUS => {
                let p: ChangeStatusPayload = payload_as(Self::CHANGE_STATUS, payload)?;
                Ok(Self::ChangeStatus {
                    status_code: p.status_code as i64,
                })
            }
            Self::CHAT_IN_ROOM => {
                let p: ChatInRoomPayload = payload_as(Self::CHAT_IN_ROOM, payload)?;
                Ok(Self::ChatInRoom { message: p.message })
            }
            _ => Err(ProtocolError::UnknownCommand(kind.clone())),
        }
    }

    /// The wire tag of this command.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateRoom(_) => Self::CREATE_ROOM,
            Self::JoinRoom { .. } => Self::JOIN_ROOM,
            Self::LeaveRoom => Self::LEAVE_ROOM,
            Self::ChangeStatus { .. } => Self::CHANGE_STATUS,
            Self::ChatInRoom { .. } => Self::CHAT_IN_ROOM,
        }
    }
}

fn payload_as<T: DeserializeOwned>(
    kind: &'static str,
    payload: serde_json::Value,
) -> Result<T, ProtocolError> {
    serde_json::from_value(payload).map_err(|source| ProtocolError::InvalidPayload { kind, source })
}
