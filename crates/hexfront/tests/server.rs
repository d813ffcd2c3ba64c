//! Integration tests for the hexfront server: real sockets, real actors.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use hexfront::prelude::*;
use tokio_tungstenite::tungstenite::Message;

const WAIT: Duration = Duration::from_secs(2);

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

// =========================================================================
// Helpers
// =========================================================================

/// One tank each on a strip of nine cells, five apart. Side one moves
/// first and can reach firing range in one turn.
fn duel() -> MatchConfig {
    MatchConfig {
        side1_tanks: vec![TankConfig {
            id: TankId(1),
            position: Vector::new(-2, 0),
        }],
        side2_tanks: vec![TankConfig {
            id: TankId(2),
            position: Vector::new(3, 0),
        }],
        hexes: (-4..=4)
            .map(|x| SceneConfig {
                position: Vector::new(x, 0),
                variant: 0,
            })
            .collect(),
        sites: vec![],
        drive_range: 3,
        visibility_range: 2,
        fire_range: 2,
        shrink: ShrinkConfig {
            after: 100,
            interval: 1,
            center: Vector::ZERO,
            radius: 10,
        },
        first_mover: FirstMover::Side1,
    }
}

/// Starts a server on a random port and returns the address.
async fn start_server(scenario: MatchConfig) -> String {
    let server = HexfrontServerBuilder::new()
        .bind("127.0.0.1:0")
        .match_config(scenario)
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    addr
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send(ws: &mut ClientWs, msg: ClientMessage) {
    let text = serde_json::to_string(&Envelope::new(0, 0, msg)).expect("encode");
    ws.send(Message::Text(text.into())).await.expect("send");
}

async fn send_raw(ws: &mut ClientWs, text: &str) {
    ws.send(Message::Text(text.to_string().into()))
        .await
        .expect("send");
}

async fn recv_envelope(ws: &mut ClientWs) -> Envelope<ServerMessage> {
    loop {
        let frame = tokio::time::timeout(WAIT, ws.next())
            .await
            .expect("server should answer in time")
            .expect("stream should be open")
            .expect("frame should be readable");
        match frame {
            Message::Text(text) => return serde_json::from_str(text.as_str()).expect("decode"),
            Message::Binary(data) => return serde_json::from_slice(&data).expect("decode"),
            _ => continue,
        }
    }
}

async fn recv(ws: &mut ClientWs) -> ServerMessage {
    recv_envelope(ws).await.payload
}

async fn join(ws: &mut ClientWs, code: &str) {
    send(
        ws,
        ClientMessage::JoinRoom {
            room_code: RoomCode::new(code),
        },
    )
    .await;
}

/// Connects two clients to `code` and consumes their join and start
/// messages. Side one is the first to join.
async fn seated_pair(addr: &str, code: &str) -> (ClientWs, ClientWs) {
    let mut one = connect(addr).await;
    join(&mut one, code).await;
    assert_eq!(recv(&mut one).await, ServerMessage::RoomJoined);

    let mut two = connect(addr).await;
    join(&mut two, code).await;
    assert_eq!(recv(&mut two).await, ServerMessage::RoomJoined);

    assert!(matches!(recv(&mut one).await, ServerMessage::StartGame { .. }));
    assert!(matches!(recv(&mut two).await, ServerMessage::StartGame { .. }));
    (one, two)
}

fn turn(actions: Vec<TankAction>) -> ClientMessage {
    ClientMessage::SendTurn { actions }
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_two_clients_start_a_match() {
    let addr = start_server(duel()).await;

    let mut one = connect(&addr).await;
    join(&mut one, "start").await;
    let joined = recv_envelope(&mut one).await;
    assert_eq!(joined.payload, ServerMessage::RoomJoined);
    assert_eq!(joined.version, PROTOCOL_VERSION);
    assert_eq!(joined.seq, 1);

    let mut two = connect(&addr).await;
    join(&mut two, "start").await;
    assert_eq!(recv(&mut two).await, ServerMessage::RoomJoined);

    let started = recv_envelope(&mut one).await;
    assert_eq!(started.seq, 2);
    let ServerMessage::StartGame { config } = started.payload else {
        panic!("side one should get its view");
    };
    assert_eq!(config.player_tanks[0].id, TankId(1));
    assert_eq!(config.enemy_tanks[0].id, TankId(2));
    assert_eq!(config.radius, 10);

    let ServerMessage::StartGame { config } = recv(&mut two).await else {
        panic!("side two should get its view");
    };
    assert_eq!(config.player_tanks[0].id, TankId(2));
}

#[tokio::test]
async fn test_quit_forfeits_and_returns_both_to_lobby() {
    let addr = start_server(duel()).await;
    let (mut one, mut two) = seated_pair(&addr, "quit").await;

    send(&mut one, ClientMessage::QuitRoom).await;

    assert_eq!(
        recv(&mut one).await,
        ServerMessage::GameFinished {
            result: GameResult::Lose
        }
    );
    assert_eq!(recv(&mut one).await, ServerMessage::RoomDisconnected);
    assert_eq!(
        recv(&mut two).await,
        ServerMessage::GameFinished {
            result: GameResult::Win
        }
    );
    assert_eq!(recv(&mut two).await, ServerMessage::RoomDisconnected);

    // Back in the lobby, the same connection can join again.
    join(&mut two, "again").await;
    assert_eq!(recv(&mut two).await, ServerMessage::RoomJoined);
}

#[tokio::test]
async fn test_full_match_to_a_kill() {
    let addr = start_server(duel()).await;
    let (mut one, mut two) = seated_pair(&addr, "duel").await;

    // Turn one: side one closes in and spots the enemy.
    send(
        &mut one,
        turn(vec![TankAction::Move {
            tank_id: TankId(1),
            path: vec![
                Vector::new(-2, 0),
                Vector::new(-1, 0),
                Vector::new(0, 0),
                Vector::new(1, 0),
            ],
        }]),
    )
    .await;
    send(&mut two, turn(vec![])).await;

    let ServerMessage::TurnResults { turn_results } = recv(&mut one).await else {
        panic!("side one should get turn results");
    };
    assert!(turn_results.contains(&TurnEvent::NowVisible {
        tank_id: TankId(2),
        position: Vector::new(3, 0),
    }));
    let ServerMessage::TurnResults { turn_results } = recv(&mut two).await else {
        panic!("side two should get turn results");
    };
    assert!(turn_results.contains(&TurnEvent::NowVisible {
        tank_id: TankId(1),
        position: Vector::new(1, 0),
    }));

    // Turn two: side one fires down the strip.
    send(
        &mut one,
        turn(vec![TankAction::Fire {
            tank_id: TankId(1),
            direction: Vector::new(1, 0),
        }]),
    )
    .await;
    send(&mut two, turn(vec![])).await;

    let ServerMessage::TurnResults { turn_results } = recv(&mut one).await else {
        panic!("side one should get turn results");
    };
    assert!(turn_results.contains(&TurnEvent::DestroyingExplosion {
        position: Vector::new(3, 0),
        tank_id: TankId(2),
    }));
    assert!(matches!(recv(&mut two).await, ServerMessage::TurnResults { .. }));

    assert_eq!(
        recv(&mut one).await,
        ServerMessage::GameFinished {
            result: GameResult::Win
        }
    );
    assert_eq!(
        recv(&mut two).await,
        ServerMessage::GameFinished {
            result: GameResult::Lose
        }
    );
    assert_eq!(recv(&mut one).await, ServerMessage::RoomDisconnected);
    assert_eq!(recv(&mut two).await, ServerMessage::RoomDisconnected);
}

#[tokio::test]
async fn test_disconnect_mid_match_forfeits() {
    let addr = start_server(duel()).await;
    let (mut one, two) = seated_pair(&addr, "vanish").await;

    drop(two);

    assert_eq!(
        recv(&mut one).await,
        ServerMessage::GameFinished {
            result: GameResult::Win
        }
    );
    assert_eq!(recv(&mut one).await, ServerMessage::RoomDisconnected);
}

#[tokio::test]
async fn test_third_client_is_turned_away() {
    let addr = start_server(duel()).await;
    let (_one, _two) = seated_pair(&addr, "full").await;

    let mut third = connect(&addr).await;
    join(&mut third, "full").await;
    assert_eq!(recv(&mut third).await, ServerMessage::RoomDisconnected);
}

#[tokio::test]
async fn test_invalid_frames_are_skipped() {
    let addr = start_server(duel()).await;
    let mut ws = connect(&addr).await;

    send_raw(&mut ws, "not json").await;
    send_raw(&mut ws, r#"{"payload":{"type":"Teleport"}}"#).await;
    send_raw(
        &mut ws,
        r#"{"version":99,"payload":{"type":"JoinRoom","roomCode":"future"}}"#,
    )
    .await;

    // A bare payload with no envelope metadata is accepted.
    send_raw(
        &mut ws,
        r#"{"payload":{"type":"JoinRoom","roomCode":"bare"}}"#,
    )
    .await;

    let reply = recv_envelope(&mut ws).await;
    assert_eq!(reply.payload, ServerMessage::RoomJoined);
    assert_eq!(reply.seq, 1, "nothing was sent for the skipped frames");
}

#[tokio::test]
async fn test_turn_in_lobby_is_ignored() {
    let addr = start_server(duel()).await;
    let mut ws = connect(&addr).await;

    send(&mut ws, turn(vec![])).await;
    send(&mut ws, ClientMessage::QuitRoom).await;
    join(&mut ws, "lobby").await;

    assert_eq!(recv(&mut ws).await, ServerMessage::RoomJoined);
}

#[tokio::test]
async fn test_build_rejects_unplayable_scenario() {
    let mut scenario = duel();
    scenario.side2_tanks.clear();

    let result = HexfrontServerBuilder::new()
        .bind("127.0.0.1:0")
        .match_config(scenario)
        .build()
        .await;
    assert!(matches!(result, Err(HexfrontError::Scenario(_))));
}
