//! Player sessions for Foyer.
//!
//! This crate covers everything about *who* a connection belongs to:
//!
//! 1. **Registration**: [`Registrar`] creates a pending player record with
//!    a generated credential and arms an expiry timer for it.
//! 2. **Expiry**: [`PendingRegistrations`] is the guarded table of armed
//!    timers; a successful login cancels the timer, otherwise the record is
//!    deleted when it fires.
//! 3. **Authentication**: the [`Authenticator`] trait, with a store-backed
//!    implementation in [`StoreAuthenticator`].
//! 4. **Session state**: [`Session`] tracks one connection through
//!    `Unauthenticated → Authenticating → Authenticated → Closed`.
//!
//! ```text
//! Room Layer (above)     ← asks which room a session is in
//!     ↕
//! Session Layer (this)   ← registration, expiry, login, session state
//!     ↕
//! Store / Protocol       ← player records, PlayerName / Credentials
//! ```

mod auth;
mod credential;
mod error;
mod pending;
mod players;
mod registrar;
mod session;

pub use auth::{Authenticator, StoreAuthenticator};
pub use credential::{generate_credential, CREDENTIAL_LEN};
pub use error::SessionError;
pub use pending::{PendingRegistrations, Ticket};
pub use players::PlayerDirectory;
pub use registrar::{Registrar, MAX_NAME_LEN};
pub use session::{Session, SessionConfig, SessionState};
