//! The channel pair between one connection actor and one match actor.
//!
//! The match → player direction is unbounded, so a match actor never waits
//! on a slow or departed player. The player → match direction is bounded;
//! sends that cannot complete right away are raced against the link's
//! release signal so they never outlive the player's interest in the match.

use hexfront_protocol::{ClientConfig, GameResult, TankAction, TurnEvent};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};

/// What a match actor tells one side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomMessage {
    /// The side has a seat.
    Joined,
    /// Both sides are seated; this is the side's view of the match.
    GameStarted(ClientConfig),
    /// The side's event log for the turn just resolved.
    TurnResults(Vec<TurnEvent>),
    GameFinished(GameResult),
}

/// What one side tells its match actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerMessage {
    SendTurn(Vec<TankAction>),
    Quit,
}

/// The match actor's end of a link.
#[derive(Debug)]
pub struct SideLink {
    pub(crate) outbound: mpsc::UnboundedSender<RoomMessage>,
    pub(crate) inbound: mpsc::Receiver<PlayerMessage>,
}

/// The connection actor's end of a link.
///
/// Dropping it closes both directions and abandons any send still in
/// flight.
#[derive(Debug)]
pub struct PlayerLink {
    inbound: mpsc::UnboundedReceiver<RoomMessage>,
    sender: mpsc::Sender<PlayerMessage>,
    released: watch::Sender<bool>,
}

/// Creates the two ends of a link. `buffer` bounds the player → match
/// direction.
pub fn link(buffer: usize) -> (PlayerLink, SideLink) {
    let (room_tx, room_rx) = mpsc::unbounded_channel();
    let (player_tx, player_rx) = mpsc::channel(buffer.max(1));
    let (released, _) = watch::channel(false);

    (
        PlayerLink {
            inbound: room_rx,
            sender: player_tx,
            released,
        },
        SideLink {
            outbound: room_tx,
            inbound: player_rx,
        },
    )
}

impl PlayerLink {
    /// Receives the next message from the match. `None` once the match
    /// has dropped its end.
    pub async fn recv(&mut self) -> Option<RoomMessage> {
        self.inbound.recv().await
    }

    /// Best-effort send to the match. Never blocks the caller.
    ///
    /// If the channel is full, delivery continues on a separate task that
    /// gives up as soon as this link is dropped.
    pub fn send(&self, msg: PlayerMessage) {
        let msg = match self.sender.try_send(msg) {
            Ok(()) => return,
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("match already gone, message dropped");
                return;
            }
            Err(TrySendError::Full(msg)) => msg,
        };

        let sender = self.sender.clone();
        let mut released = self.released.subscribe();
        tokio::spawn(async move {
            tokio::select! {
                result = sender.send(msg) => {
                    if result.is_err() {
                        tracing::debug!("match went away during send");
                    }
                }
                _ = until_released(&mut released) => {
                    tracing::debug!("link released, pending send abandoned");
                }
            }
        });
    }
}

async fn until_released(released: &mut watch::Receiver<bool>) {
    // An error means the link is gone, which counts as released.
    let _ = released.wait_for(|done| *done).await;
}

impl Drop for PlayerLink {
    fn drop(&mut self) {
        self.released.send_replace(true);
    }
}
