//! Error types for the room layer.

use foyer_protocol::RoomId;
use foyer_store::StoreError;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room already holds `maxPlayers` members.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The requested room settings are unusable, e.g. a zero player limit.
    #[error("invalid room settings: {0}")]
    InvalidSpec(String),

    /// A room and its chat log were only partly created or deleted.
    #[error("room {room} left inconsistent: {detail}")]
    Inconsistent { room: RoomId, detail: String },

    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
