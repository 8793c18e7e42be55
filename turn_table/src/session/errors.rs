//! Session error types.

use thiserror::Error;

use super::connection::ConnectionId;
use crate::protocol::PlayerId;

/// Invariant violations raised by session state transitions.
///
/// None of these are reachable through the coordinator's event surface; if
/// one surfaces it points at a coordinator bug, not at a misbehaving client.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("player {0} is already registered")]
    DuplicatePlayer(PlayerId),

    #[error("connection {0} is already registered")]
    DuplicateConnection(ConnectionId),

    #[error("player {0} is not in the roster")]
    UnknownPlayer(PlayerId),

    #[error("game already started")]
    AlreadyStarted,

    #[error("game has not started")]
    NotStarted,

    #[error("cannot start a game with an empty roster")]
    EmptyRoster,

    #[error("turn is held by {0}")]
    TurnOccupied(PlayerId),
}

/// Failure to enqueue a message into a connection's outbox.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// The connection is not draining its outbox fast enough
    #[error("outbox full")]
    Full,

    /// The connection's writer has gone away
    #[error("connection closed")]
    Closed,
}

/// The coordinator task is no longer running.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("session is closed")]
pub struct SessionClosed;
