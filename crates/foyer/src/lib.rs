//! # Foyer
//!
//! Real-time multiplayer lobby service.
//!
//! Players register over HTTP and receive a generated credential, then log
//! in over a WebSocket and issue commands to create, join and leave rooms,
//! change their status and chat with the other members of their room.
//! State lives in a [`DocumentStore`](foyer_store::DocumentStore).
//!
//! ```text
//! HTTP  POST /players ──→ Registrar ──→ players/{name}   (expires if unused)
//! WS    login ─→ session ─→ commands ─→ RoomController / ChatLog
//!                                         rooms/{id}  chats/{id}
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use foyer::prelude::*;
//!
//! # async fn run() -> Result<(), FoyerError> {
//! let settings = Settings::from_env()?;
//! let server = settings.builder().build(Arc::new(MemoryStore::new())).await?;
//! server.run().await
//! # }
//! ```

pub mod config;
mod dispatch;
mod error;
mod handler;
pub mod http;
mod server;

pub use config::Settings;
pub use error::FoyerError;
pub use server::{FoyerServer, FoyerServerBuilder};

/// Everything needed to run a lobby, in one import.
pub mod prelude {
    pub use crate::{FoyerError, FoyerServer, FoyerServerBuilder, Settings};
    pub use foyer_protocol::{
        Codec, Command, Credentials, JsonCodec, PlayerName, RegisterRequest, Registration,
        Response, ResponseKind, RoomId, RoomSpec,
    };
    pub use foyer_room::{ChatLog, RoomController, RoomError};
    pub use foyer_session::{Authenticator, SessionConfig, SessionError, StoreAuthenticator};
    pub use foyer_store::{DocumentStore, MemoryStore, StoreError};
}
