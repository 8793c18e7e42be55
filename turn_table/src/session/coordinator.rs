//! Session coordinator actor.
//!
//! Every connect, disconnect and move is funneled through one inbox and
//! applied in arrival order, so a transition is always computed against the
//! state left by the previous one. Outgoing messages are built inside the
//! step that produced them and enqueued into connection outboxes; the actor
//! itself never touches a socket.

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use super::{
    config::SessionConfig,
    connection::{Connection, ConnectionId},
    errors::SessionClosed,
    messages::SessionMessage,
    state::SessionState,
};
use crate::protocol::{ClientMessage, GameState, PlayerId, ServerMessage};

/// Cloneable handle for sending events to a session
#[derive(Clone, Debug)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionMessage>,
}

impl SessionHandle {
    fn new(sender: mpsc::Sender<SessionMessage>) -> Self {
        Self { sender }
    }

    async fn send(&self, message: SessionMessage) -> Result<(), SessionClosed> {
        self.sender.send(message).await.map_err(|_| SessionClosed)
    }

    /// Seat a new connection and return the identity minted for it.
    ///
    /// By the time this returns, `initial_state` (and any start or turn
    /// broadcast the join caused) is already in the connection's outbox.
    pub async fn connect(&self, connection: Connection) -> Result<PlayerId, SessionClosed> {
        let (response, rx) = oneshot::channel();
        self.send(SessionMessage::Connect {
            connection,
            response,
        })
        .await?;
        rx.await.map_err(|_| SessionClosed)
    }

    /// Report that a connection has gone away. Unknown ids are ignored.
    pub async fn disconnect(&self, connection_id: ConnectionId) -> Result<(), SessionClosed> {
        self.send(SessionMessage::Disconnect { connection_id }).await
    }

    /// Forward a decoded client frame.
    pub async fn submit(
        &self,
        connection_id: ConnectionId,
        message: ClientMessage,
    ) -> Result<(), SessionClosed> {
        self.send(SessionMessage::Submit {
            connection_id,
            message,
        })
        .await
    }

    pub async fn snapshot(&self) -> Result<GameState, SessionClosed> {
        let (response, rx) = oneshot::channel();
        self.send(SessionMessage::GetSnapshot { response }).await?;
        rx.await.map_err(|_| SessionClosed)
    }

    pub async fn shutdown(&self) -> Result<(), SessionClosed> {
        self.send(SessionMessage::Shutdown).await
    }
}

/// Actor owning the state of one session
pub struct SessionCoordinator {
    state: SessionState,

    inbox: mpsc::Receiver<SessionMessage>,

    /// Sequence number of the last minted identity
    last_player: u64,

    /// Connections whose outbox rejected a message during the current step
    failed: Vec<ConnectionId>,

    is_closed: bool,
}

impl SessionCoordinator {
    /// Create a new coordinator and the handle used to reach it
    pub fn new(config: &SessionConfig) -> (Self, SessionHandle) {
        let (sender, inbox) = mpsc::channel(config.inbox_capacity);

        let actor = Self {
            state: SessionState::new(config.seats),
            inbox,
            last_player: 0,
            failed: Vec::new(),
            is_closed: false,
        };

        (actor, SessionHandle::new(sender))
    }

    /// Create a coordinator and run it on the current tokio runtime
    pub fn spawn(config: &SessionConfig) -> SessionHandle {
        let (actor, handle) = Self::new(config);
        tokio::spawn(actor.run());
        handle
    }

    /// Run the coordinator event loop until shutdown or until every handle
    /// is dropped
    pub async fn run(mut self) {
        log::info!("Session starting with {} seats", self.state.seats());

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message);

            if self.is_closed {
                break;
            }
        }

        log::info!("Session closed with {} players connected", self.state.len());
    }

    fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Connect {
                connection,
                response,
            } => {
                let player = self.on_connect(connection);
                if response.send(player).is_err() {
                    log::debug!("Connect caller for {} went away before reply", player);
                }
            }

            SessionMessage::Disconnect { connection_id } => {
                self.on_disconnect(connection_id);
            }

            SessionMessage::Submit {
                connection_id,
                message,
            } => match message {
                ClientMessage::Move { payload } => self.on_move(connection_id, payload),
                ClientMessage::Unknown => {
                    log::debug!("Ignoring unknown message type from {}", connection_id);
                }
            },

            SessionMessage::GetSnapshot { response } => {
                let _ = response.send(self.state.snapshot());
            }

            SessionMessage::Shutdown => {
                self.is_closed = true;
            }
        }

        self.drop_failed_connections();
    }

    fn mint_player(&mut self) -> PlayerId {
        self.last_player += 1;
        PlayerId::new(self.last_player)
    }

    fn on_connect(&mut self, connection: Connection) -> PlayerId {
        let player = self.mint_player();

        self.broadcast(&ServerMessage::PlayerConnected { player_id: player });

        if let Err(e) = self.state.register(player, connection.clone()) {
            log::error!("Failed to register {}: {}", player, e);
            return player;
        }
        log::info!(
            "{} joined on connection {} ({}/{} seats)",
            player,
            connection.id(),
            self.state.len(),
            self.state.seats()
        );

        self.send_to(
            &connection,
            ServerMessage::InitialState {
                player_id: player,
                game_state: self.state.snapshot(),
            },
        );

        if self.state.ready_to_start() {
            match self.state.start_game() {
                Ok(turn) => {
                    log::info!("Game started, {} moves first", turn);
                    self.broadcast(&ServerMessage::GameStarted { turn });
                }
                Err(e) => log::error!("Failed to start game: {}", e),
            }
        } else if self.state.is_started() && self.state.turn().is_none() {
            match self.state.fill_vacant_turn(player) {
                Ok(()) => {
                    log::info!("Vacant turn handed to {}", player);
                    self.broadcast(&ServerMessage::TurnUpdate { turn: player });
                }
                Err(e) => log::error!("Failed to fill vacant turn: {}", e),
            }
        }

        player
    }

    fn on_disconnect(&mut self, connection_id: ConnectionId) {
        let Some(player) = self.state.player_for(connection_id) else {
            return;
        };

        let held_turn = self.state.turn() == Some(player);
        self.state.unregister(player);

        if held_turn {
            log::info!("{} left while holding the turn, turn is vacant", player);
        } else {
            log::info!("{} left", player);
        }

        self.broadcast(&ServerMessage::PlayerDisconnected { player_id: player });
    }

    fn on_move(&mut self, connection_id: ConnectionId, payload: Value) {
        let Some(player) = self.state.player_for(connection_id) else {
            log::debug!("Dropping move from unregistered connection {}", connection_id);
            return;
        };

        if self.state.turn() != Some(player) {
            log::debug!(
                "Dropping out-of-turn move from {} (turn: {:?})",
                player,
                self.state.turn()
            );
            return;
        }

        let turn = self.state.advance_turn();
        log::debug!("{} moved, turn passes to {:?}", player, turn);

        self.broadcast(&ServerMessage::GameUpdate {
            payload,
            player_id: player,
            turn,
        });
    }

    /// Enqueue `message` for every connection in the roster.
    fn broadcast(&mut self, message: &ServerMessage) {
        for connection in self.state.connections() {
            if let Err(e) = connection.deliver(message.clone()) {
                log::warn!(
                    "Failed to deliver {} to connection {}: {}",
                    message.kind(),
                    connection.id(),
                    e
                );
                self.failed.push(connection.id());
            }
        }
    }

    fn send_to(&mut self, connection: &Connection, message: ServerMessage) {
        let kind = message.kind();
        if let Err(e) = connection.deliver(message) {
            log::warn!(
                "Failed to deliver {} to connection {}: {}",
                kind,
                connection.id(),
                e
            );
            self.failed.push(connection.id());
        }
    }

    /// A connection that could not take a message is treated as closed.
    /// Dropping it may fail further deliveries, so drain until stable.
    fn drop_failed_connections(&mut self) {
        while let Some(connection_id) = self.failed.pop() {
            self.on_disconnect(connection_id);
        }
    }
}
