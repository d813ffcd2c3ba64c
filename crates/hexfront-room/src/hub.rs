//! Registry: maps room codes to running match actors.
//!
//! The map lives inside a single task and is never locked. Join requests
//! for an unseen code create a match actor on the spot; close notices
//! from match actors remove their entry again.

use std::collections::HashMap;

use hexfront_protocol::{RoomCode, RoomId};
use hexfront_sim::MatchConfig;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::room::{ClosedRoom, RoomHandle, spawn_room};
use crate::{RoomConfig, RoomError, SideLink};

/// A player's request to be seated in the match behind `code`.
#[derive(Debug)]
pub struct JoinRequest {
    pub code: RoomCode,
    pub link: SideLink,
}

/// Handle to the registry task. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HubHandle {
    sender: mpsc::Sender<JoinRequest>,
}

impl HubHandle {
    /// Queues a join request.
    ///
    /// Success only means the registry accepted the request; the outcome
    /// arrives on the player's end of the link (`Joined`, or the stream
    /// closing).
    ///
    /// # Errors
    /// [`RoomError::HubUnavailable`] if the registry task has stopped.
    pub async fn join(&self, code: RoomCode, link: SideLink) -> Result<(), RoomError> {
        self.sender
            .send(JoinRequest { code, link })
            .await
            .map_err(|_| RoomError::HubUnavailable)
    }
}

/// The registry actor.
pub struct Hub {
    rooms: HashMap<RoomCode, RoomHandle>,
    requests: mpsc::Receiver<JoinRequest>,
    closed_tx: mpsc::UnboundedSender<ClosedRoom>,
    closed_rx: mpsc::UnboundedReceiver<ClosedRoom>,
    match_config: MatchConfig,
    config: RoomConfig,
    next_room_id: u64,
}

impl Hub {
    /// Creates a registry and the handle used to reach it.
    pub fn new(match_config: MatchConfig, config: RoomConfig) -> (Self, HubHandle) {
        let (tx, rx) = mpsc::channel(config.request_buffer.max(1));
        let (closed_tx, closed_rx) = mpsc::unbounded_channel();
        let hub = Self {
            rooms: HashMap::new(),
            requests: rx,
            closed_tx,
            closed_rx,
            match_config,
            config,
            next_room_id: 1,
        };
        (hub, HubHandle { sender: tx })
    }

    /// Runs the dispatch loop until every [`HubHandle`] is dropped.
    pub async fn run(mut self) {
        tracing::info!("room registry started");

        loop {
            tokio::select! {
                request = self.requests.recv() => match request {
                    Some(request) => self.route(request),
                    None => break,
                },
                Some(closed) = self.closed_rx.recv() => self.reclaim(closed),
            }
        }

        tracing::info!(rooms = self.rooms.len(), "room registry stopped");
    }

    /// Number of live match actors.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn route(&mut self, JoinRequest { code, link }: JoinRequest) {
        if !self.rooms.contains_key(&code) {
            let room_id = RoomId(self.next_room_id);
            self.next_room_id += 1;
            let handle = spawn_room(
                room_id,
                code.clone(),
                self.match_config.clone(),
                self.config.request_buffer,
                self.closed_tx.clone(),
            );
            tracing::info!(%room_id, %code, "room created");
            self.rooms.insert(code.clone(), handle);
        }
        let Some(handle) = self.rooms.get(&code) else {
            return;
        };

        tracing::debug!(room_id = %handle.room_id(), %code, "routing join request");
        let result = handle.join(link);
        let stale = handle.is_closed();
        if let Err(e) = result {
            tracing::warn!(error = %e, "join request dropped");
            if stale {
                tracing::warn!(%code, "removing stale room");
                self.rooms.remove(&code);
            }
        }
    }

    fn reclaim(&mut self, ClosedRoom { code, room_id }: ClosedRoom) {
        match self.rooms.get(&code) {
            Some(handle) if handle.room_id() == room_id => {
                // Dropping the handle releases the actor.
                self.rooms.remove(&code);
                tracing::info!(%room_id, %code, "room reclaimed");
            }
            _ => {
                tracing::warn!(%room_id, %code, "close notice for unregistered room");
            }
        }
    }
}

/// Spawns the registry on its own task.
pub fn spawn_hub(match_config: MatchConfig, config: RoomConfig) -> (HubHandle, JoinHandle<()>) {
    let (hub, handle) = Hub::new(match_config, config);
    (handle, tokio::spawn(hub.run()))
}
