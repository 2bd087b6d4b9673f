//! Error types for the session layer.

use foyer_protocol::{CloseReason, PlayerName};
use foyer_store::StoreError;

use crate::SessionState;

/// Errors that can occur during registration, login and session bookkeeping.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The registration request does not meet the name constraints.
    #[error("invalid registration: {0}")]
    Validation(String),

    /// A player record already exists under this name. Recoverable: the
    /// client may pick another name or retry after the record expires.
    #[error("player {0} already exists")]
    AlreadyExists(PlayerName),

    /// Login named a player with no record.
    #[error("no player named {0}")]
    InvalidPlayer(PlayerName),

    /// Login presented the wrong credential.
    #[error("wrong credential for player {0}")]
    InvalidCredential(PlayerName),

    /// A session was asked to move to a state it cannot reach.
    #[error("invalid session transition from {from} to {to}")]
    InvalidTransition {
        from: SessionState,
        to: SessionState,
    },

    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    /// The close reason to send when this error ends a login attempt.
    ///
    /// Store failures during lookup fail closed as an unknown player.
    pub fn close_reason(&self) -> CloseReason {
        match self {
            Self::InvalidCredential(_) => CloseReason::InvalidCredential,
            Self::Validation(_) => CloseReason::InvalidPayload,
            _ => CloseReason::InvalidPlayer,
        }
    }
}
