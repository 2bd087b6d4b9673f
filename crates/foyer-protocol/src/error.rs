//! Error types for the protocol layer.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing required fields or
    /// wrong data types.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The command envelope named a type this server does not handle.
    #[error("unknown command type {0:?}")]
    UnknownCommand(String),

    /// The envelope was well formed but its payload does not have the shape
    /// the named command requires.
    #[error("invalid payload for {kind}: {source}")]
    InvalidPayload {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ProtocolError {
    /// Returns `true` if the error means the peer sent something this server
    /// cannot parse at all, as opposed to a command it merely does not know.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::InvalidPayload { .. })
    }
}
