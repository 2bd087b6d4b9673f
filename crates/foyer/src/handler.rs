//! Per-connection handler: login, command loop, and logout.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Start pinging the peer, send the welcome notice
//!   2. Read one login message → authenticate → cancel the player's
//!      registration expiry → send the login notice
//!   3. Loop: read commands → dispatch → reply
//!   4. Logout: delete the player record and leave the current room
//!
//! Every read, login included, must arrive within the idle timeout. Pongs
//! count as arrivals, so a healthy idle client stays connected.

use std::sync::Arc;
use std::time::Duration;

use foyer_protocol::{
    Codec, CloseReason, Command, CommandEnvelope, Credentials, PlayerName, ProtocolError,
    Response, LOGIN_NOTICE, WELCOME_NOTICE,
};
use foyer_session::{Authenticator, Session};
use foyer_store::DocumentStore;
use foyer_transport::{Connection, Frame, TransportError};
use tokio::task::JoinHandle;

use crate::dispatch::{self, dispatch, INVALID_COMMAND_PAYLOAD};
use crate::server::ServerState;
use crate::FoyerError;

/// Drop guard that stops the ping task when the handler exits, however it
/// exits.
struct PingTask(JoinHandle<()>);

impl Drop for PingTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn spawn_pinger<K: Connection>(conn: Arc<K>, period: Duration) -> PingTask {
    PingTask(tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        loop {
            ticker.tick().await;
            if let Err(e) = conn.ping().await {
                tracing::debug!(conn_id = %conn.id(), error = %e, "ping failed");
            }
        }
    }))
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<S, A, C, K>(
    conn: K,
    state: Arc<ServerState<S, A, C>>,
) -> Result<(), FoyerError>
where
    S: DocumentStore,
    A: Authenticator,
    C: Codec,
    K: Connection<Error = TransportError>,
{
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let _pinger = spawn_pinger(Arc::clone(&conn), state.config.ping_interval());
    let mut session = Session::new();

    conn.send_text(WELCOME_NOTICE).await?;

    // --- Login ---
    let player = match login(conn.as_ref(), &state, &mut session).await {
        Ok(player) => player,
        Err(e) => {
            session.close();
            return Err(e);
        }
    };
    tracing::info!(%conn_id, %player, "player logged in");

    // --- Commands ---
    // From here on every exit runs logout, a failed login notice included.
    let result = match conn.send_text(LOGIN_NOTICE).await {
        Ok(()) => command_loop(conn.as_ref(), &state, &mut session, &player).await,
        Err(e) => Err(e.into()),
    };

    // --- Logout ---
    logout(&state, &mut session, &player).await;
    if result.is_err() {
        let _ = conn.close(None).await;
    }
    result
}

/// Waits for the next data frame.
///
/// Control frames only push the idle deadline back. Returns `None` when
/// the peer closes the connection.
async fn next_data<K>(conn: &K, idle_timeout: Duration) -> Result<Option<Vec<u8>>, FoyerError>
where
    K: Connection<Error = TransportError>,
{
    loop {
        match tokio::time::timeout(idle_timeout, conn.recv()).await {
            Ok(Ok(Some(Frame::Data(data)))) => return Ok(Some(data)),
            Ok(Ok(Some(Frame::Control))) => continue,
            Ok(Ok(None)) => return Ok(None),
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(TransportError::IdleTimeout(idle_timeout).into()),
        }
    }
}

/// Reads and checks the login message. On failure the connection is
/// closed with a reason before the error is returned.
async fn login<S, A, C, K>(
    conn: &K,
    state: &ServerState<S, A, C>,
    session: &mut Session,
) -> Result<PlayerName, FoyerError>
where
    S: DocumentStore,
    A: Authenticator,
    C: Codec,
    K: Connection<Error = TransportError>,
{
    session.begin_authentication()?;

    let Some(data) = next_data(conn, state.config.idle_timeout).await? else {
        return Err(TransportError::ConnectionClosed("closed before login".into()).into());
    };

    let credentials: Credentials = match state.codec.decode(&data) {
        Ok(credentials) => credentials,
        Err(e) => {
            tracing::warn!(conn_id = %conn.id(), error = %e, "invalid login message");
            reject(conn, CloseReason::InvalidPayload).await;
            return Err(e.into());
        }
    };

    if let Err(e) = state.auth.authenticate(&credentials).await {
        tracing::warn!(conn_id = %conn.id(), player = %credentials.name, error = %e, "login rejected");
        reject(conn, e.close_reason()).await;
        return Err(e.into());
    }

    if !state.registrar.confirm(&credentials.name).await {
        tracing::debug!(player = %credentials.name, "no pending registration to confirm");
    }
    session.authenticate(credentials.name.clone(), credentials.room().cloned())?;
    Ok(credentials.name)
}

async fn reject<K>(conn: &K, reason: CloseReason)
where
    K: Connection<Error = TransportError>,
{
    if let Err(e) = conn.close(Some(reason.as_str())).await {
        tracing::debug!(conn_id = %conn.id(), error = %e, "failed to send close frame");
    }
}

/// Reads and answers commands until the peer leaves, goes quiet, or sends
/// something that cannot be parsed.
async fn command_loop<S, A, C, K>(
    conn: &K,
    state: &ServerState<S, A, C>,
    session: &mut Session,
    player: &PlayerName,
) -> Result<(), FoyerError>
where
    S: DocumentStore,
    A: Authenticator,
    C: Codec,
    K: Connection<Error = TransportError>,
{
    loop {
        let data = match next_data(conn, state.config.idle_timeout).await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%player, "connection closed cleanly");
                return Ok(());
            }
            Err(e) => {
                tracing::info!(%player, error = %e, "connection lost");
                return Err(e);
            }
        };

        let command = match decode_command(&state.codec, &data) {
            Ok(command) => command,
            Err(e) if e.is_malformed() => {
                tracing::warn!(%player, error = %e, "invalid command payload");
                send_response(conn, &state.codec, &Response::error(INVALID_COMMAND_PAYLOAD)).await?;
                return Err(e.into());
            }
            Err(e) => {
                tracing::debug!(%player, error = %e, "ignoring command");
                continue;
            }
        };

        let response = dispatch(state, session, player, command).await;
        send_response(conn, &state.codec, &response).await?;
    }
}

fn decode_command<C: Codec>(codec: &C, data: &[u8]) -> Result<Command, ProtocolError> {
    let envelope: CommandEnvelope = codec.decode(data)?;
    Command::from_envelope(envelope)
}

async fn send_response<C, K>(conn: &K, codec: &C, response: &Response) -> Result<(), FoyerError>
where
    C: Codec,
    K: Connection<Error = TransportError>,
{
    let bytes = codec.encode(response)?;
    conn.send(&bytes).await?;
    Ok(())
}

/// Removes every trace of the player. Failures are logged; the client is
/// already gone.
async fn logout<S, A, C>(state: &ServerState<S, A, C>, session: &mut Session, player: &PlayerName)
where
    S: DocumentStore,
    A: Authenticator,
    C: Codec,
{
    if let Err(e) = state.players.remove(player).await {
        tracing::error!(%player, error = %e, "failed to delete player record on logout");
    }
    if let Some(room) = session.leave_room() {
        if let Err(e) = dispatch::leave(state, &room, player).await {
            tracing::error!(%player, %room, error = %e, "failed to leave room on logout");
        }
    }
    session.close();
    tracing::info!(%player, "player logged out");
}
