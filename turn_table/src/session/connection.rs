//! Connection handles held by the session.

use std::fmt;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use super::errors::DeliveryError;
use crate::protocol::ServerMessage;

/// Server-side id of a transport connection.
///
/// Distinct from [`PlayerId`](crate::protocol::PlayerId): the transport mints
/// one per accepted socket, before the session has assigned an identity.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Send capability for one connection.
///
/// Messages go into a bounded outbox that the connection's own writer task
/// drains onto the socket, so delivering never waits on network I/O.
#[derive(Clone, Debug)]
pub struct Connection {
    id: ConnectionId,
    outbox: mpsc::Sender<ServerMessage>,
}

impl Connection {
    pub fn new(id: ConnectionId, outbox: mpsc::Sender<ServerMessage>) -> Self {
        Self { id, outbox }
    }

    /// Create a connection with a fresh id along with the receiving end of
    /// its outbox.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ServerMessage>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self::new(ConnectionId::new(), sender), receiver)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Enqueue a message without waiting.
    pub fn deliver(&self, message: ServerMessage) -> Result<(), DeliveryError> {
        self.outbox.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Full,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}
