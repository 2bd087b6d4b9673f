//! Wire protocol for Foyer.
//!
//! This crate defines what clients and the lobby server say to each other:
//!
//! - **Types** ([`Credentials`], [`Command`], [`Response`], etc.): the
//!   structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those structures are
//!   turned into bytes and back.
//! - **Errors** ([`ProtocolError`]): what can go wrong while decoding.
//!
//! ```text
//! Transport (frames) → Protocol (Credentials / Command) → Session
//! ```
//!
//! Commands arrive as `{type, payload}` and are decoded exactly once, at the
//! boundary, into the [`Command`] enum. Handlers never inspect raw JSON.

mod codec;
mod command;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use command::{Command, CommandEnvelope, RoomSpec};
pub use error::ProtocolError;
pub use types::{
    CloseReason, Credentials, PlayerName, RegisterRequest, Registration,
    Response, ResponseKind, RoomId, LOGIN_NOTICE, WELCOME_NOTICE,
};
