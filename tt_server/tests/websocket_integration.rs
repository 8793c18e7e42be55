//! WebSocket integration tests for live sessions.
//!
//! Each test runs the real router on an ephemeral port and drives it with
//! tokio-tungstenite clients, checking exactly which frames each player sees.

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::{net::SocketAddr, time::Duration};
use tokio::{net::TcpStream, time::timeout};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tt_server::api::{AppState, create_router};
use turn_table::{
    GameState, PlayerId, ServerMessage, SessionConfig, SessionCoordinator, SessionHandle,
};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);
const SILENCE_WINDOW: Duration = Duration::from_millis(200);

fn p(n: u64) -> PlayerId {
    PlayerId::new(n)
}

/// Helper to start a server on an ephemeral port
async fn spawn_server() -> (SocketAddr, SessionHandle) {
    let config = SessionConfig::default();
    let session = SessionCoordinator::spawn(&config);
    let app = create_router(AppState {
        session: session.clone(),
        outbox_capacity: config.outbox_capacity,
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, session)
}

/// Test client mirroring what a real player connection sees
struct GameClient {
    id: PlayerId,
    initial: GameState,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl GameClient {
    /// Connect and wait for `initial_state`
    async fn connect(addr: SocketAddr) -> Self {
        let (stream, _) = connect_async(format!("ws://{addr}/ws"))
            .await
            .expect("Failed to connect to WebSocket");

        let mut client = Self {
            id: p(0),
            initial: GameState {
                players: Vec::new(),
                turn: None,
                game_started: false,
            },
            stream,
        };

        match client.recv().await {
            ServerMessage::InitialState {
                player_id,
                game_state,
            } => {
                client.id = player_id;
                client.initial = game_state;
            }
            other => panic!("expected initial_state, got {other:?}"),
        }
        client
    }

    async fn recv(&mut self) -> ServerMessage {
        loop {
            let frame = timeout(RECV_TIMEOUT, self.stream.next())
                .await
                .expect("timed out waiting for a frame")
                .expect("stream ended")
                .expect("websocket error");

            if let Message::Text(text) = frame {
                return ServerMessage::from_json(text.as_str()).expect("undecodable server frame");
            }
        }
    }

    /// Assert that nothing arrives for a short while
    async fn expect_silence(&mut self) {
        if let Ok(Some(frame)) = timeout(SILENCE_WINDOW, self.stream.next()).await {
            panic!("{} expected no frames, got {frame:?}", self.id);
        }
    }

    async fn send_raw(&mut self, text: &str) {
        self.stream.send(Message::Text(text.into())).await.unwrap();
    }

    async fn send_move(&mut self, payload: Value) {
        let frame = json!({"type": "move", "player_id": self.id, "move": payload});
        self.send_raw(&frame.to_string()).await;
    }

    async fn close(mut self) {
        self.stream.close(None).await.unwrap();
    }
}

/// Connect four players and consume everything up to `game_started`
async fn full_table(addr: SocketAddr) -> Vec<GameClient> {
    let mut players = Vec::new();
    for _ in 0..4 {
        players.push(GameClient::connect(addr).await);
    }
    for player in &mut players {
        loop {
            if let ServerMessage::GameStarted { .. } = player.recv().await {
                break;
            }
        }
    }
    players
}

#[tokio::test]
async fn test_four_players_start_game() {
    let (addr, _session) = spawn_server().await;

    let mut p1 = GameClient::connect(addr).await;
    assert_eq!(p1.id, p(1));
    assert_eq!(p1.initial.players, vec![p(1)]);
    assert!(!p1.initial.game_started);

    let mut p2 = GameClient::connect(addr).await;
    assert_eq!(
        p1.recv().await,
        ServerMessage::PlayerConnected { player_id: p(2) }
    );

    let mut p3 = GameClient::connect(addr).await;
    assert_eq!(
        p1.recv().await,
        ServerMessage::PlayerConnected { player_id: p(3) }
    );
    assert_eq!(
        p2.recv().await,
        ServerMessage::PlayerConnected { player_id: p(3) }
    );

    let mut p4 = GameClient::connect(addr).await;
    assert_eq!(p4.initial.players, vec![p(1), p(2), p(3), p(4)]);
    for client in [&mut p1, &mut p2, &mut p3] {
        assert_eq!(
            client.recv().await,
            ServerMessage::PlayerConnected { player_id: p(4) }
        );
    }

    for client in [&mut p1, &mut p2, &mut p3, &mut p4] {
        assert_eq!(
            client.recv().await,
            ServerMessage::GameStarted { turn: p(1) }
        );
    }

    // The newcomer never hears about itself.
    p4.expect_silence().await;
}

#[tokio::test]
async fn test_turn_holder_move_is_broadcast() {
    let (addr, _session) = spawn_server().await;
    let mut players = full_table(addr).await;

    players[0].send_move(json!("e4")).await;

    for client in &mut players {
        assert_eq!(
            client.recv().await,
            ServerMessage::GameUpdate {
                payload: json!("e4"),
                player_id: p(1),
                turn: Some(p(2)),
            }
        );
    }
}

#[tokio::test]
async fn test_out_of_turn_move_is_silent() {
    let (addr, session) = spawn_server().await;
    let mut players = full_table(addr).await;

    players[1].send_move(json!("d4")).await;
    players[3].send_move(json!({"piece": "knight"})).await;

    for client in &mut players {
        client.expect_silence().await;
    }
    assert_eq!(session.snapshot().await.unwrap().turn, Some(p(1)));
}

#[tokio::test]
async fn test_malformed_frames_keep_connection_open() {
    let (addr, _session) = spawn_server().await;
    let mut players = full_table(addr).await;

    players[0].send_raw("not json at all").await;
    players[0].send_raw(r#"{"type":"chat","text":"hello"}"#).await;
    players[0].send_raw(r#"{"move":"e4"}"#).await;
    players[0]
        .stream
        .send(Message::Binary(vec![1u8, 2, 3].into()))
        .await
        .unwrap();
    players[0].expect_silence().await;

    players[0].send_move(json!("e4")).await;
    for client in &mut players {
        assert!(matches!(
            client.recv().await,
            ServerMessage::GameUpdate { player_id, .. } if player_id == p(1)
        ));
    }
}

#[tokio::test]
async fn test_claimed_player_id_is_ignored() {
    let (addr, _session) = spawn_server().await;
    let mut players = full_table(addr).await;

    // P2 pretends to be P1; the session only trusts the connection.
    players[1]
        .send_raw(r#"{"type":"move","player_id":"P1","move":"spoof"}"#)
        .await;
    for client in &mut players {
        client.expect_silence().await;
    }
}

#[tokio::test]
async fn test_unparseable_player_id_does_not_drop_holder_move() {
    let (addr, session) = spawn_server().await;
    let mut players = full_table(addr).await;

    players[0]
        .send_raw(r#"{"type":"move","player_id":"p1","move":"e4"}"#)
        .await;
    for client in &mut players {
        assert_eq!(
            client.recv().await,
            ServerMessage::GameUpdate {
                payload: json!("e4"),
                player_id: p(1),
                turn: Some(p(2)),
            }
        );
    }

    players[1]
        .send_raw(r#"{"type":"move","player_id":1,"move":"e5"}"#)
        .await;
    for client in &mut players {
        assert_eq!(
            client.recv().await,
            ServerMessage::GameUpdate {
                payload: json!("e5"),
                player_id: p(2),
                turn: Some(p(3)),
            }
        );
    }
    assert_eq!(session.snapshot().await.unwrap().turn, Some(p(3)));
}

#[tokio::test]
async fn test_holder_disconnect_then_new_player_takes_turn() {
    let (addr, session) = spawn_server().await;
    let mut players = full_table(addr).await;

    players[0].send_move(json!("e4")).await;
    for client in &mut players {
        assert!(matches!(client.recv().await, ServerMessage::GameUpdate { .. }));
    }

    // P2 holds the turn and leaves.
    let p2 = players.remove(1);
    p2.close().await;
    for client in &mut players {
        assert_eq!(
            client.recv().await,
            ServerMessage::PlayerDisconnected { player_id: p(2) }
        );
    }

    let snapshot = session.snapshot().await.unwrap();
    assert_eq!(snapshot.turn, None);
    assert_eq!(snapshot.players, vec![p(1), p(3), p(4)]);

    // Nobody can move while the turn is vacant.
    players[0].send_move(json!("Nf3")).await;
    for client in &mut players {
        client.expect_silence().await;
    }

    let mut p5 = GameClient::connect(addr).await;
    assert_eq!(p5.id, p(5));
    assert_eq!(
        p5.initial,
        GameState {
            players: vec![p(1), p(3), p(4), p(5)],
            turn: None,
            game_started: true,
        }
    );
    assert_eq!(p5.recv().await, ServerMessage::TurnUpdate { turn: p(5) });

    for client in &mut players {
        assert_eq!(
            client.recv().await,
            ServerMessage::PlayerConnected { player_id: p(5) }
        );
        assert_eq!(client.recv().await, ServerMessage::TurnUpdate { turn: p(5) });
    }

    p5.send_move(json!("Y")).await;
    players.push(p5);
    for client in &mut players {
        assert_eq!(
            client.recv().await,
            ServerMessage::GameUpdate {
                payload: json!("Y"),
                player_id: p(5),
                turn: Some(p(1)),
            }
        );
    }
}

#[tokio::test]
async fn test_join_after_start_with_occupied_turn() {
    let (addr, session) = spawn_server().await;
    let mut players = full_table(addr).await;

    let p3 = players.remove(2);
    p3.close().await;
    for client in &mut players {
        assert_eq!(
            client.recv().await,
            ServerMessage::PlayerDisconnected { player_id: p(3) }
        );
    }

    let mut p5 = GameClient::connect(addr).await;
    assert!(p5.initial.game_started);
    assert_eq!(p5.initial.turn, Some(p(1)));
    p5.expect_silence().await;

    for client in &mut players {
        assert_eq!(
            client.recv().await,
            ServerMessage::PlayerConnected { player_id: p(5) }
        );
        client.expect_silence().await;
    }

    let snapshot = session.snapshot().await.unwrap();
    assert_eq!(snapshot.players, vec![p(1), p(2), p(4), p(5)]);
    assert_eq!(snapshot.turn, Some(p(1)));
}

#[tokio::test]
async fn test_non_holder_disconnect_keeps_turn() {
    let (addr, _session) = spawn_server().await;
    let mut players = full_table(addr).await;

    let p4 = players.pop().unwrap();
    p4.close().await;
    for client in &mut players {
        assert_eq!(
            client.recv().await,
            ServerMessage::PlayerDisconnected { player_id: p(4) }
        );
    }

    // P1 still holds the turn and the rotation skips the departed seat.
    for (holder, next) in [(0, p(2)), (1, p(3)), (2, p(1))] {
        players[holder].send_move(json!("x")).await;
        for client in &mut players {
            assert!(matches!(
                client.recv().await,
                ServerMessage::GameUpdate { turn, .. } if turn == Some(next)
            ));
        }
    }
}
