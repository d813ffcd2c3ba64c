//! Per-connection actor: carries out [`fsm`](crate::fsm) transitions.
//!
//! Each accepted connection gets one actor task plus one reader task.
//! The reader decodes frames and hands them over a channel, so the actor
//! can wait on the client and on its match at the same time:
//!
//! ```text
//! socket ──recv──► reader ──ClientMessage──┐
//!                                          ▼
//! match ──RoomMessage──────────────────► actor ──send──► socket
//! ```

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use hexfront_protocol::{ClientMessage, Codec, Envelope, ServerMessage};
use hexfront_room::{HubHandle, PlayerLink, RoomMessage, link};
use hexfront_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::HexfrontError;
use crate::fsm::{Effect, PlayerEvent, PlayerState, Transition, transition};

/// Decoded client messages waiting for the actor.
const CLIENT_BUFFER: usize = 16;

/// Runs one connection from accept to close.
///
/// Returns once both the client and the match side have let go, or with
/// an error on a protocol violation or a stopped registry. Either way the socket is closed and
/// any link is dropped on return.
pub(crate) async fn handle_connection<C>(
    conn: WebSocketConnection,
    hub: HubHandle,
    codec: C,
    link_buffer: usize,
) -> Result<(), HexfrontError>
where
    C: Codec + Clone,
{
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::info!(%conn_id, peer = %conn.peer_addr(), "player connected");

    let (tx, rx) = mpsc::channel(CLIENT_BUFFER);
    let reader = spawn_reader(Arc::clone(&conn), codec.clone(), tx);

    let mut player = Player {
        conn_id,
        conn: Arc::clone(&conn),
        reader,
        hub,
        codec,
        link_buffer,
        state: PlayerState::NotInRoom,
        client: Some(rx),
        link: None,
        pending: VecDeque::new(),
        write_broken: false,
        seq: 1,
        start: Instant::now(),
    };
    let result = player.run().await;

    player.reader.abort();
    if let Err(e) = conn.close().await {
        tracing::trace!(%conn_id, error = %e, "close after shutdown");
    }
    tracing::info!(%conn_id, state = %player.state, "player left");
    result
}

/// Reads frames until the socket closes, skipping anything undecodable.
fn spawn_reader<C: Codec>(
    conn: Arc<WebSocketConnection>,
    codec: C,
    tx: mpsc::Sender<ClientMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let conn_id = conn.id();
        loop {
            let data = match conn.recv().await {
                Ok(Some(data)) => data,
                Ok(None) => {
                    tracing::debug!(%conn_id, "client closed connection");
                    break;
                }
                Err(e) => {
                    tracing::debug!(%conn_id, error = %e, "recv error");
                    break;
                }
            };

            let decoded = codec
                .decode::<Envelope<ClientMessage>>(&data)
                .and_then(Envelope::into_payload);
            let msg = match decoded {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!(%conn_id, error = %e, "frame dropped");
                    continue;
                }
            };

            if tx.send(msg).await.is_err() {
                break;
            }
        }
    })
}

struct Player<C> {
    conn_id: ConnectionId,
    conn: Arc<WebSocketConnection>,
    reader: JoinHandle<()>,
    hub: HubHandle,
    codec: C,
    link_buffer: usize,
    state: PlayerState,
    /// `None` once the reader is done.
    client: Option<mpsc::Receiver<ClientMessage>>,
    /// `None` outside a match.
    link: Option<PlayerLink>,
    /// Events raised by the runtime itself, handled before new input.
    pending: VecDeque<PlayerEvent>,
    write_broken: bool,
    seq: u64,
    start: Instant,
}

impl<C: Codec> Player<C> {
    async fn run(&mut self) -> Result<(), HexfrontError> {
        loop {
            let event = match self.pending.pop_front() {
                Some(event) => event,
                None => self.next_event().await,
            };

            let Transition { next, effects } = transition(self.state, event)?;
            if next != self.state {
                tracing::debug!(conn_id = %self.conn_id, from = %self.state, to = %next, "player transition");
            }
            self.state = next;

            for effect in effects {
                if self.apply(effect).await? {
                    return Ok(());
                }
            }
        }
    }

    /// Waits on whichever stream delivers first. A closed stream reports
    /// `None` once and is not polled again.
    async fn next_event(&mut self) -> PlayerEvent {
        let event = tokio::select! {
            msg = recv_client(&mut self.client) => PlayerEvent::Client(msg),
            msg = recv_room(&mut self.link) => PlayerEvent::Room(msg),
        };
        if matches!(event, PlayerEvent::Client(None)) {
            self.client = None;
        }
        event
    }

    /// Carries out one effect. Returns `true` when the actor should stop.
    async fn apply(&mut self, effect: Effect) -> Result<bool, HexfrontError> {
        match effect {
            Effect::JoinRoom(code) => {
                let (player_link, side_link) = link(self.link_buffer);
                self.link = Some(player_link);
                tracing::debug!(conn_id = %self.conn_id, %code, "join requested");
                // Only fails once the registry has stopped, and no later
                // join can succeed either.
                self.hub.join(code, side_link).await?;
            }
            Effect::Forward(msg) => match &self.link {
                Some(link) => link.send(msg),
                None => tracing::debug!(conn_id = %self.conn_id, "no match to forward to"),
            },
            Effect::Write(msg) => self.write(msg).await?,
            Effect::ReleaseRoom => self.link = None,
            Effect::Terminate => return Ok(true),
        }
        Ok(false)
    }

    /// Sends one frame. A failed send shuts the socket down and queues
    /// [`PlayerEvent::WriteFailed`]; later writes are skipped.
    async fn write(&mut self, msg: ServerMessage) -> Result<(), HexfrontError> {
        if self.write_broken {
            return Ok(());
        }

        let envelope = Envelope::new(
            next_seq(&mut self.seq),
            self.start.elapsed().as_millis() as u64,
            msg,
        );
        let bytes = self.codec.encode(&envelope)?;

        if let Err(e) = self.conn.send(&bytes).await {
            tracing::debug!(conn_id = %self.conn_id, error = %e, "write failed");
            self.write_broken = true;
            self.reader.abort();
            let _ = self.conn.close().await;
            self.pending.push_back(PlayerEvent::WriteFailed);
        }
        Ok(())
    }
}

async fn recv_client(client: &mut Option<mpsc::Receiver<ClientMessage>>) -> Option<ClientMessage> {
    match client {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn recv_room(link: &mut Option<PlayerLink>) -> Option<RoomMessage> {
    match link {
        Some(link) => link.recv().await,
        None => std::future::pending().await,
    }
}

/// Increments and returns the next sequence number.
fn next_seq(seq: &mut u64) -> u64 {
    let current = *seq;
    *seq += 1;
    current
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures_util::SinkExt;
    use hexfront_protocol::{JsonCodec, RoomCode};
    use hexfront_room::{Hub, RoomConfig, RoomError};
    use hexfront_sim::MatchConfig;
    use hexfront_transport::{Transport, WebSocketTransport};
    use tokio_tungstenite::tungstenite::Message;

    use super::*;

    #[tokio::test]
    async fn test_join_after_registry_stopped_ends_connection() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0").await.unwrap();
        let addr = transport.local_addr().unwrap();

        let client = tokio::spawn(async move {
            let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
                .await
                .unwrap();
            let join = Envelope::new(
                0,
                0,
                ClientMessage::JoinRoom {
                    room_code: RoomCode::new("gone"),
                },
            );
            let text = serde_json::to_string(&join).unwrap();
            ws.send(Message::Text(text.into())).await.unwrap();
            ws
        });

        let conn = transport.accept().await.unwrap();
        let (hub, handle) = Hub::new(MatchConfig::basic(), RoomConfig::default());
        drop(hub);

        let result = tokio::time::timeout(
            Duration::from_secs(2),
            handle_connection(conn, handle, JsonCodec, 4),
        )
        .await
        .expect("connection should end");
        assert!(matches!(
            result,
            Err(HexfrontError::Room(RoomError::HubUnavailable))
        ));
        drop(client.await.unwrap());
    }
}
