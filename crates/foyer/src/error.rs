//! Unified error type for the Foyer server.

use foyer_protocol::ProtocolError;
use foyer_room::RoomError;
use foyer_session::SessionError;
use foyer_store::StoreError;
use foyer_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each layer's variant lets `?` convert
/// sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum FoyerError {
    /// A transport-level error (bind, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, payload shape).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A persistence error that escaped its operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A registration or login error.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room-level error (full, not found, inconsistent).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The registration endpoint could not bind or stopped serving.
    #[error("registration endpoint on {addr}: {source}")]
    Http {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// A startup setting could not be parsed.
    #[error("invalid setting {name}={value:?}: {reason}")]
    Config {
        name: &'static str,
        value: String,
        reason: String,
    },
}
