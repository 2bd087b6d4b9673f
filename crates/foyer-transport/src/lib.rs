//! Transport abstraction layer for Foyer.
//!
//! Provides the [`Transport`] and [`Connection`] traits. A connection is a
//! bidirectional message channel: data frames carry structured payloads in
//! both directions, control frames (ping/pong/close) carry liveness and
//! shutdown signaling.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketHandshake, WebSocketTransport};

use std::fmt;
use std::future::Future;

/// Default upper bound on a single inbound data frame, in bytes.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 8192;

/// Default time an accepted peer gets to complete its handshake.
pub const DEFAULT_HANDSHAKE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// One inbound frame as seen by the session layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A text or binary data frame.
    Data(Vec<u8>),

    /// A ping or pong control frame. Carries nothing the session needs,
    /// but proves the peer is still alive.
    Control,
}

/// Accepts new incoming connections.
///
/// Accepting only takes the peer off the listener. The protocol handshake
/// runs later in [`PendingConnection::establish`], so a peer that stalls
/// mid-handshake never holds up the accept loop.
pub trait Transport: Send + Sync + 'static {
    /// An accepted peer that has not completed its handshake.
    type Pending: PendingConnection<Error = Self::Error>;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming peer.
    fn accept(
        &mut self,
    ) -> impl Future<Output = Result<Self::Pending, Self::Error>> + Send;
}

/// A peer taken off the listener, waiting for its handshake.
pub trait PendingConnection: Send + 'static {
    /// The connection produced once the handshake succeeds.
    type Connection: Connection;
    /// The error type for the handshake.
    type Error: std::error::Error + Send + Sync;

    /// Runs the handshake, bounded by the transport's handshake timeout.
    fn establish(
        self,
    ) -> impl Future<Output = Result<Self::Connection, Self::Error>> + Send;
}

/// A single connection that can send and receive frames.
///
/// Sending and receiving are independent: a task blocked in
/// [`recv`](Connection::recv) must not prevent another task from calling
/// [`ping`](Connection::ping) or [`send`](Connection::send).
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sends a data frame to the remote peer.
    ///
    /// Valid UTF-8 goes out as a text frame, anything else as binary.
    fn send(
        &self,
        data: &[u8],
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Sends a plain text notice.
    fn send_text(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send {
        self.send(text.as_bytes())
    }

    /// Receives the next frame from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    fn recv(
        &self,
    ) -> impl Future<Output = Result<Option<Frame>, Self::Error>> + Send;

    /// Sends a ping control frame.
    fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Sends a close frame, optionally carrying a human-readable reason.
    fn close(
        &self,
        reason: Option<&str>,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
