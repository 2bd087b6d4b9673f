//! Command dispatch for authenticated sessions.
//!
//! Each [`Command`] maps to one room, chat or player operation. Failures
//! are reported to the client as an error [`Response`] with a short reason
//! and never end the session; only an unparsable command does that, and
//! that is decided by the handler before dispatch.

use foyer_protocol::{Codec, Command, PlayerName, Response, RoomId, RoomSpec};
use foyer_room::RoomError;
use foyer_session::{Authenticator, Session};
use foyer_store::DocumentStore;

use crate::server::ServerState;

pub(crate) const CANT_CREATE_ROOM: &str = "Can't create new room";
pub(crate) const CANT_JOIN_ROOM: &str = "Can't join room";
pub(crate) const CANT_LEAVE_ROOM: &str = "Can't leave room";
pub(crate) const CANT_CHANGE_STATUS: &str = "Can't change status";
pub(crate) const CANT_SEND_MESSAGE: &str = "Can't send message";
pub(crate) const NOT_IN_A_ROOM: &str = "Player not in a room";
pub(crate) const INVALID_COMMAND_PAYLOAD: &str = "Invalid command payload";

/// Runs one command for `player` and returns the reply to send.
pub(crate) async fn dispatch<S, A, C>(
    state: &ServerState<S, A, C>,
    session: &mut Session,
    player: &PlayerName,
    command: Command,
) -> Response
where
    S: DocumentStore,
    A: Authenticator,
    C: Codec,
{
    tracing::debug!(%player, command = command.kind(), "dispatching command");

    match command {
        Command::CreateRoom(spec) => create_room(state, player, &spec).await,
        Command::JoinRoom { id } => join_room(state, session, player, id).await,
        Command::LeaveRoom => leave_room(state, session, player).await,
        Command::ChangeStatus { status_code } => {
            match state.players.set_status(player, status_code).await {
                Ok(()) => Response::ok(),
                Err(e) => {
                    tracing::warn!(%player, status_code, error = %e, "status change failed");
                    Response::error(CANT_CHANGE_STATUS)
                }
            }
        }
        Command::ChatInRoom { message } => {
            let Some(room) = session.room() else {
                return Response::error(CANT_SEND_MESSAGE);
            };
            match state.chat.append(room, player, &message).await {
                Ok(()) => Response::ok(),
                Err(e) => {
                    tracing::warn!(%player, %room, error = %e, "chat append failed");
                    Response::error(CANT_SEND_MESSAGE)
                }
            }
        }
    }
}

async fn create_room<S, A, C>(
    state: &ServerState<S, A, C>,
    player: &PlayerName,
    spec: &RoomSpec,
) -> Response
where
    S: DocumentStore,
    A: Authenticator,
    C: Codec,
{
    match state.rooms.create_room(spec).await {
        Ok(id) => Response::ok_with(id.as_str()),
        Err(e) => {
            tracing::warn!(%player, error = %e, "room creation failed");
            Response::error(CANT_CREATE_ROOM)
        }
    }
}

/// Leaves the current room first, so the player is never a member of two
/// rooms at once.
async fn join_room<S, A, C>(
    state: &ServerState<S, A, C>,
    session: &mut Session,
    player: &PlayerName,
    target: RoomId,
) -> Response
where
    S: DocumentStore,
    A: Authenticator,
    C: Codec,
{
    if session.room() == Some(&target) {
        return Response::ok();
    }
    if let Some(current) = session.room().cloned() {
        if let Err(e) = leave(state, &current, player).await {
            tracing::warn!(%player, room = %current, error = %e, "leave before join failed");
            return Response::error(CANT_LEAVE_ROOM);
        }
        session.leave_room();
    }

    match state.rooms.join_room(&target, player).await {
        Ok(()) => {
            session.enter_room(target);
            Response::ok()
        }
        Err(e) => {
            tracing::warn!(%player, room = %target, error = %e, "join failed");
            Response::error(CANT_JOIN_ROOM)
        }
    }
}

async fn leave_room<S, A, C>(
    state: &ServerState<S, A, C>,
    session: &mut Session,
    player: &PlayerName,
) -> Response
where
    S: DocumentStore,
    A: Authenticator,
    C: Codec,
{
    let Some(current) = session.room().cloned() else {
        return Response::error(NOT_IN_A_ROOM);
    };
    match leave(state, &current, player).await {
        Ok(()) => {
            session.leave_room();
            Response::ok()
        }
        Err(e) => {
            tracing::warn!(%player, room = %current, error = %e, "leave failed");
            Response::error(CANT_LEAVE_ROOM)
        }
    }
}

/// Leaves `room`, treating a room that no longer exists as already left.
pub(crate) async fn leave<S, A, C>(
    state: &ServerState<S, A, C>,
    room: &RoomId,
    player: &PlayerName,
) -> Result<(), RoomError>
where
    S: DocumentStore,
    A: Authenticator,
    C: Codec,
{
    match state.rooms.leave_room(room, player).await {
        Err(RoomError::NotFound(_)) => Ok(()),
        other => other,
    }
}
