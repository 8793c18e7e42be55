//! Coordinator actor message types.

use tokio::sync::oneshot;

use super::connection::{Connection, ConnectionId};
use crate::protocol::{ClientMessage, GameState, PlayerId};

/// Events that can be sent to a SessionCoordinator
#[derive(Debug)]
pub enum SessionMessage {
    /// A transport connection was accepted and wants a seat
    Connect {
        connection: Connection,
        response: oneshot::Sender<PlayerId>,
    },

    /// A transport connection closed or failed
    Disconnect { connection_id: ConnectionId },

    /// A decoded frame from a connection
    Submit {
        connection_id: ConnectionId,
        message: ClientMessage,
    },

    /// Get the current roster and turn
    GetSnapshot {
        response: oneshot::Sender<GameState>,
    },

    /// Stop the coordinator
    Shutdown,
}
