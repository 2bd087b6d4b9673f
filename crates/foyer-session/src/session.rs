//! Per-connection session state and session configuration.

use std::fmt;
use std::time::Duration;

use foyer_protocol::{PlayerName, RoomId};
use foyer_transport::DEFAULT_MAX_MESSAGE_SIZE;

use crate::SessionError;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Timeouts and limits for registration and live connections.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a new registration may go without a login before its
    /// player record is deleted.
    pub registration_expiry: Duration,

    /// How long a connection may stay silent (no data frame, no pong)
    /// before it is considered dead.
    pub idle_timeout: Duration,

    /// Largest inbound data frame accepted, in bytes.
    pub max_message_size: usize,
}

impl SessionConfig {
    /// Pings go out at nine tenths of the idle timeout, so a healthy peer
    /// always has a pong in flight before the deadline.
    pub fn ping_interval(&self) -> Duration {
        self.idle_timeout * 9 / 10
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            registration_expiry: Duration::from_secs(120),
            idle_timeout: Duration::from_secs(30),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Where a connection is in its lifecycle.
///
/// ```text
/// Unauthenticated → Authenticating → Authenticated → Closed
///        └───────────────┴──────────────────────────────↗
/// ```
///
/// There are no back-transitions. `Closed` is reachable from every state
/// and is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Authenticated,
    Closed,
}

impl SessionState {
    /// The next state on the happy path, or `None` once closed.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Unauthenticated => Some(Self::Authenticating),
            Self::Authenticating => Some(Self::Authenticated),
            Self::Authenticated => Some(Self::Closed),
            Self::Closed => None,
        }
    }

    pub fn can_transition_to(self, target: Self) -> bool {
        match target {
            Self::Closed => self != Self::Closed,
            _ => self.next() == Some(target),
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "Unauthenticated"),
            Self::Authenticating => write!(f, "Authenticating"),
            Self::Authenticated => write!(f, "Authenticated"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One connection's view of its player.
///
/// Owned by the task serving the connection and never shared.
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    player: Option<PlayerName>,
    room: Option<RoomId>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Unauthenticated,
            player: None,
            room: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The authenticated player, if login has completed.
    pub fn player(&self) -> Option<&PlayerName> {
        self.player.as_ref()
    }

    /// The room this session believes its player is in.
    pub fn room(&self) -> Option<&RoomId> {
        self.room.as_ref()
    }

    fn transition(&mut self, to: SessionState) -> Result<(), SessionError> {
        if !self.state.can_transition_to(to) {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }

    /// The login message is about to be read.
    pub fn begin_authentication(&mut self) -> Result<(), SessionError> {
        self.transition(SessionState::Authenticating)
    }

    /// Login succeeded for `player`, who claims to be in `room`.
    pub fn authenticate(
        &mut self,
        player: PlayerName,
        room: Option<RoomId>,
    ) -> Result<(), SessionError> {
        self.transition(SessionState::Authenticated)?;
        self.player = Some(player);
        self.room = room.filter(|id| !id.is_empty());
        Ok(())
    }

    pub fn enter_room(&mut self, room: RoomId) {
        self.room = Some(room);
    }

    /// Forgets the current room, returning it.
    pub fn leave_room(&mut self) -> Option<RoomId> {
        self.room.take()
    }

    /// Moves to `Closed`. Returns `false` if the session was already closed.
    pub fn close(&mut self) -> bool {
        self.transition(SessionState::Closed).is_ok()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
