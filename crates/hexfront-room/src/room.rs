//! Match actor: an isolated Tokio task that seats two sides and owns
//! their simulation.
//!
//! The actor never shares its [`GameState`]; turns are resolved inline on
//! its own task, so turn N is fully delivered before turn N+1 can be
//! queued.

use hexfront_protocol::{GameResult, RoomCode, RoomId, TankAction};
use hexfront_sim::{GameState, MatchConfig, Side};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::{PlayerMessage, RoomError, RoomMessage, RoomState, SideLink};

/// Sent to the registry once a match actor has dropped both links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ClosedRoom {
    pub(crate) code: RoomCode,
    pub(crate) room_id: RoomId,
}

/// The registry's handle to a running match actor.
#[derive(Debug)]
pub(crate) struct RoomHandle {
    room_id: RoomId,
    code: RoomCode,
    sender: mpsc::Sender<SideLink>,
}

impl RoomHandle {
    pub(crate) fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Hands a link to the match without waiting. On failure the link is
    /// dropped, which the joining player sees as a closed match stream.
    pub(crate) fn join(&self, link: SideLink) -> Result<(), RoomError> {
        match self.sender.try_send(link) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_) | TrySendError::Closed(_)) => Err(
                RoomError::RoomUnavailable(self.code.clone(), self.room_id),
            ),
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// One side's seat at the table.
struct Seat {
    outbound: mpsc::UnboundedSender<RoomMessage>,
    /// `None` once the player's stream has closed.
    inbound: Option<mpsc::Receiver<PlayerMessage>>,
    /// Actions submitted for the current turn, if any.
    queued: Option<Vec<TankAction>>,
}

impl Seat {
    fn new(link: SideLink) -> Self {
        Self {
            outbound: link.outbound,
            inbound: Some(link.inbound),
            queued: None,
        }
    }
}

enum Input {
    Join(SideLink),
    /// `None` means the side's stream closed.
    Player(Side, Option<PlayerMessage>),
    /// The registry released this actor.
    Released,
}

/// The internal match actor state. Runs inside a Tokio task.
struct RoomActor {
    room_id: RoomId,
    code: RoomCode,
    state: RoomState,
    config: MatchConfig,
    seats: [Option<Seat>; 2],
    game: Option<GameState>,
    joins: mpsc::Receiver<SideLink>,
    closed: mpsc::UnboundedSender<ClosedRoom>,
}

impl RoomActor {
    /// Runs the actor loop until the registry drops its handle.
    async fn run(mut self) {
        tracing::info!(room_id = %self.room_id, code = %self.code, "room actor started");

        loop {
            match self.next_input().await {
                Input::Join(link) => self.handle_join(link),
                Input::Player(side, msg) => self.handle_player(side, msg),
                Input::Released => break,
            }
        }

        tracing::info!(room_id = %self.room_id, code = %self.code, "room actor stopped");
    }

    async fn next_input(&mut self) -> Input {
        let [one, two] = &mut self.seats;
        tokio::select! {
            link = self.joins.recv() => match link {
                Some(link) => Input::Join(link),
                None => Input::Released,
            },
            msg = recv_from(one) => Input::Player(Side::One, msg),
            msg = recv_from(two) => Input::Player(Side::Two, msg),
        }
    }

    fn handle_join(&mut self, link: SideLink) {
        if !self.state.is_joinable() {
            tracing::warn!(
                room_id = %self.room_id,
                state = %self.state,
                "protocol violation: join for a full room, dropping link"
            );
            return;
        }
        let side = if self.state == RoomState::WaitingForSide1 {
            Side::One
        } else {
            Side::Two
        };

        self.seats[side.index()] = Some(Seat::new(link));
        self.send(side, RoomMessage::Joined);
        tracing::info!(room_id = %self.room_id, %side, "side joined");

        match side {
            Side::One => self.set_state(RoomState::WaitingForSide2),
            Side::Two => self.start(),
        }
    }

    fn start(&mut self) {
        let game = GameState::new(self.config.clone());
        for side in Side::ALL {
            self.send(side, RoomMessage::GameStarted(game.client_config(side)));
        }
        tracing::info!(
            room_id = %self.room_id,
            side1_first = game.side1_first(),
            "match started"
        );
        self.game = Some(game);
        self.set_state(RoomState::Running);
    }

    fn handle_player(&mut self, side: Side, msg: Option<PlayerMessage>) {
        let msg = match msg {
            Some(msg) => msg,
            None => {
                if let Some(seat) = &mut self.seats[side.index()] {
                    seat.inbound = None;
                }
                tracing::debug!(room_id = %self.room_id, %side, "player stream closed");
                PlayerMessage::Quit
            }
        };

        match (self.state, msg) {
            (RoomState::Running, PlayerMessage::SendTurn(actions)) => {
                self.queue(side, actions)
            }
            (RoomState::Running, PlayerMessage::Quit) => {
                tracing::info!(room_id = %self.room_id, %side, "side quit, match forfeited");
                let forfeit = GameResult::Lose;
                self.send(side, RoomMessage::GameFinished(forfeit));
                self.send(side.opponent(), RoomMessage::GameFinished(forfeit.inverse()));
                self.close();
            }
            (RoomState::WaitingForSide2, PlayerMessage::Quit) => {
                tracing::info!(room_id = %self.room_id, %side, "side left before match start");
                self.close();
            }
            (RoomState::WaitingForSide2, PlayerMessage::SendTurn(_)) => {
                tracing::warn!(
                    room_id = %self.room_id,
                    %side,
                    "protocol violation: turn before match start, ignoring"
                );
            }
            (RoomState::WaitingForSide1 | RoomState::Closing, _) => {}
        }
    }

    /// Stores a side's actions and resolves the turn once both are in.
    fn queue(&mut self, side: Side, actions: Vec<TankAction>) {
        if let Some(seat) = &mut self.seats[side.index()] {
            seat.queued = Some(actions);
        }

        let [Some(one), Some(two)] = &mut self.seats else {
            return;
        };
        if one.queued.is_none() || two.queued.is_none() {
            return;
        }
        let side1 = one.queued.take().unwrap_or_default();
        let side2 = two.queued.take().unwrap_or_default();

        let Some(game) = self.game.as_mut() else {
            return;
        };
        let turn = game.turn();
        let (log1, log2) = game.resolve_actions(&side1, &side2);
        let outcome = game.result();
        tracing::debug!(room_id = %self.room_id, turn, radius = game.radius(), "turn delivered");

        self.send(Side::One, RoomMessage::TurnResults(log1));
        self.send(Side::Two, RoomMessage::TurnResults(log2));

        if outcome.concluded {
            for side in Side::ALL {
                self.send(side, RoomMessage::GameFinished(outcome.for_side(side)));
            }
            tracing::info!(
                room_id = %self.room_id,
                side1 = ?outcome.side1,
                side2 = ?outcome.side2,
                "match finished"
            );
            self.close();
        }
    }

    /// Drops both links and asks the registry to reclaim the code.
    fn close(&mut self) {
        self.seats = [None, None];
        self.game = None;
        let closed = ClosedRoom {
            code: self.code.clone(),
            room_id: self.room_id,
        };
        if self.closed.send(closed).is_err() {
            tracing::debug!(room_id = %self.room_id, "registry gone before close notice");
        }
        self.set_state(RoomState::Closing);
    }

    /// Sends to one side. Drops silently if that side has left.
    fn send(&self, side: Side, msg: RoomMessage) {
        if let Some(seat) = &self.seats[side.index()] {
            let _ = seat.outbound.send(msg);
        }
    }

    fn set_state(&mut self, next: RoomState) {
        if !self.state.can_transition_to(next) {
            tracing::warn!(
                room_id = %self.room_id,
                from = %self.state,
                to = %next,
                "unexpected room transition"
            );
        }
        tracing::debug!(room_id = %self.room_id, from = %self.state, to = %next, "room transition");
        self.state = next;
    }
}

/// Next message from a seat; pending forever if the seat is empty or its
/// stream has already closed.
async fn recv_from(seat: &mut Option<Seat>) -> Option<PlayerMessage> {
    match seat.as_mut().and_then(|s| s.inbound.as_mut()) {
        Some(inbound) => inbound.recv().await,
        None => std::future::pending().await,
    }
}

/// Spawns a new match actor task and returns a handle to it.
pub(crate) fn spawn_room(
    room_id: RoomId,
    code: RoomCode,
    config: MatchConfig,
    join_buffer: usize,
    closed: mpsc::UnboundedSender<ClosedRoom>,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(join_buffer.max(1));

    let actor = RoomActor {
        room_id,
        code: code.clone(),
        state: RoomState::WaitingForSide1,
        config,
        seats: [None, None],
        game: None,
        joins: rx,
        closed,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        code,
        sender: tx,
    }
}
