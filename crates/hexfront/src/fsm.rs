//! Connection actor state machine.
//!
//! [`transition`] is pure: it maps the current state and one input to the
//! next state plus a list of [`Effect`]s. The connection runtime owns the
//! socket and the link and carries the effects out, feeding
//! [`PlayerEvent::WriteFailed`] back in when a write to the client does
//! not go through.

use std::fmt;

use hexfront_protocol::{ClientMessage, RoomCode, ServerMessage};
use hexfront_room::{PlayerMessage, RoomMessage};

use crate::HexfrontError;

/// Where a connection is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// In the lobby, no link.
    NotInRoom,
    /// A join request is out; waiting for the match to answer.
    WaitingForRoom,
    /// Seated in a match.
    InRoom,
    /// Draining whichever stream has not closed yet.
    WaitForClose { client_open: bool, room_open: bool },
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInRoom => write!(f, "NotInRoom"),
            Self::WaitingForRoom => write!(f, "WaitingForRoom"),
            Self::InRoom => write!(f, "InRoom"),
            Self::WaitForClose { .. } => write!(f, "WaitForClose"),
        }
    }
}

/// One input to the actor. `None` payloads mean that stream closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    Client(Option<ClientMessage>),
    Room(Option<RoomMessage>),
    /// The last write to the client failed.
    WriteFailed,
}

/// Something the runtime must do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open a fresh link and ask the registry to seat it.
    JoinRoom(RoomCode),
    /// Pass a message to the match over the current link.
    Forward(PlayerMessage),
    /// Send a frame to the client.
    Write(ServerMessage),
    /// Drop the current link.
    ReleaseRoom,
    /// Stop the actor.
    Terminate,
}

/// Result of [`transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: PlayerState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(next: PlayerState) -> Self {
        Self {
            next,
            effects: Vec::new(),
        }
    }

    fn with(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    fn with_first(mut self, effect: Effect) -> Self {
        self.effects.insert(0, effect);
        self
    }
}

/// Computes the next state for `event`.
///
/// # Errors
/// [`HexfrontError::ProtocolViolation`] if the match sends something the
/// current state cannot receive. The violation is fatal to the actor.
pub fn transition(state: PlayerState, event: PlayerEvent) -> Result<Transition, HexfrontError> {
    use PlayerState::*;

    let transition = match (state, event) {
        // -- lobby ----------------------------------------------------------
        (NotInRoom, PlayerEvent::Client(None)) => Transition::to(NotInRoom).with(Effect::Terminate),
        (NotInRoom, PlayerEvent::Client(Some(ClientMessage::JoinRoom { room_code }))) => {
            Transition::to(WaitingForRoom).with(Effect::JoinRoom(room_code))
        }
        (NotInRoom, PlayerEvent::Client(Some(msg))) => {
            tracing::debug!(?msg, "not in a room, ignoring");
            Transition::to(NotInRoom)
        }
        (NotInRoom, PlayerEvent::WriteFailed) => Transition::to(NotInRoom).with(Effect::Terminate),

        // -- waiting for a seat ---------------------------------------------
        (WaitingForRoom, PlayerEvent::Room(Some(RoomMessage::Joined))) => {
            Transition::to(InRoom).with(Effect::Write(ServerMessage::RoomJoined))
        }
        (WaitingForRoom | InRoom, PlayerEvent::Client(Some(ClientMessage::QuitRoom))) => {
            Transition::to(state).with(Effect::Forward(PlayerMessage::Quit))
        }
        (WaitingForRoom, PlayerEvent::Client(Some(msg))) => {
            tracing::debug!(?msg, "not seated yet, ignoring");
            Transition::to(WaitingForRoom)
        }

        // -- seated ---------------------------------------------------------
        (InRoom, PlayerEvent::Client(Some(ClientMessage::SendTurn { actions }))) => {
            Transition::to(InRoom).with(Effect::Forward(PlayerMessage::SendTurn(actions)))
        }
        (InRoom, PlayerEvent::Client(Some(ClientMessage::JoinRoom { room_code }))) => {
            tracing::debug!(%room_code, "already in a room, ignoring join");
            Transition::to(InRoom)
        }
        (InRoom, PlayerEvent::Room(Some(RoomMessage::GameStarted(config)))) => {
            Transition::to(InRoom).with(Effect::Write(ServerMessage::StartGame { config }))
        }
        (InRoom, PlayerEvent::Room(Some(RoomMessage::TurnResults(turn_results)))) => {
            Transition::to(InRoom).with(Effect::Write(ServerMessage::TurnResults { turn_results }))
        }
        (InRoom, PlayerEvent::Room(Some(RoomMessage::GameFinished(result)))) => {
            Transition::to(InRoom).with(Effect::Write(ServerMessage::GameFinished { result }))
        }

        // -- shared by both linked states -----------------------------------
        (WaitingForRoom | InRoom, PlayerEvent::Room(None)) => Transition::to(NotInRoom)
            .with(Effect::ReleaseRoom)
            .with(Effect::Write(ServerMessage::RoomDisconnected)),
        (WaitingForRoom | InRoom, PlayerEvent::Client(None)) => Transition::to(WaitForClose {
            client_open: false,
            room_open: true,
        })
        .with(Effect::Forward(PlayerMessage::Quit)),
        (WaitingForRoom | InRoom, PlayerEvent::WriteFailed) => Transition::to(WaitForClose {
            client_open: true,
            room_open: true,
        })
        .with(Effect::Forward(PlayerMessage::Quit)),

        // -- drain ----------------------------------------------------------
        (WaitForClose { room_open, .. }, PlayerEvent::Client(None)) => drained(false, room_open),
        (WaitForClose { client_open, .. }, PlayerEvent::Room(None)) => {
            drained(client_open, false).with_first(Effect::ReleaseRoom)
        }
        (WaitForClose { .. }, _) => Transition::to(state),

        // -- violations -----------------------------------------------------
        (NotInRoom, PlayerEvent::Room(msg)) => {
            return Err(HexfrontError::ProtocolViolation(format!(
                "match message {msg:?} while not in a room"
            )));
        }
        (WaitingForRoom, PlayerEvent::Room(Some(msg))) => {
            return Err(HexfrontError::ProtocolViolation(format!(
                "match message {msg:?} before the seat was confirmed"
            )));
        }
        (InRoom, PlayerEvent::Room(Some(RoomMessage::Joined))) => {
            return Err(HexfrontError::ProtocolViolation(
                "second join confirmation while already in a room".into(),
            ));
        }
    };

    Ok(transition)
}

fn drained(client_open: bool, room_open: bool) -> Transition {
    let state = PlayerState::WaitForClose {
        client_open,
        room_open,
    };
    if client_open || room_open {
        Transition::to(state)
    } else {
        Transition::to(state).with(Effect::Terminate)
    }
}
