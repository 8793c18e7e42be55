//! # Turn Table
//!
//! Coordination core for a four-seat, turn-based multiplayer game played
//! over persistent message-oriented connections.
//!
//! The library admits players, assigns turn order by connection order,
//! rotates the turn on accepted moves and keeps every participant's view of
//! the roster consistent across connects, disconnects and concurrent moves.
//! Moves are opaque: the session forwards them and never judges them.
//!
//! ## Session lifecycle
//!
//! - **Lobby**: players join until every seat is filled
//! - **Active**: the game has started and one player holds the turn
//! - **Vacant**: the turn holder left; the next player to join takes the turn
//!
//! ## Core Modules
//!
//! - [`session`]: session state, coordinator actor and connection handles
//! - [`protocol`]: JSON message shapes exchanged with players

/// Wire protocol shared by server and clients.
pub mod protocol;
pub use protocol::{ClientMessage, GameState, PlayerId, ProtocolError, ServerMessage};

/// Session state and the coordinator actor.
pub mod session;
pub use session::{
    Connection, ConnectionId, SessionConfig, SessionCoordinator, SessionError, SessionHandle,
};
