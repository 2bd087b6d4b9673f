//! Room membership and chat logs for Foyer.
//!
//! Rooms live in the document store, not in this process. Every operation
//! here is a short sequence of store calls made on behalf of one player's
//! connection, and several connections may run them against the same room
//! at once.
//!
//! # Key types
//!
//! - [`RoomController`]: create, join and leave rooms
//! - [`ChatLog`]: append messages to a room's chat log
//! - [`RoomError`]: what those operations report
//!
//! A room and its chat log are created together and deleted together when
//! the last member leaves. The store offers no multi-document transaction,
//! so a failure between the two writes leaves one behind. That case is
//! logged and reported as [`RoomError::Inconsistent`], never retried.

mod chat;
mod controller;
mod error;

pub use chat::ChatLog;
pub use controller::RoomController;
pub use error::RoomError;
