//! Session coordination for a single turn-based game.
//!
//! This module implements:
//! - SessionState: roster, turn ownership and start status, with no I/O
//! - SessionCoordinator: async actor serializing connect, disconnect and
//!   move events and fanning notifications out to connections
//! - Connection: non-blocking send capability for one player socket
//!
//! ## Architecture
//!
//! The coordinator runs in its own Tokio task with an mpsc inbox. Transport
//! tasks hold a cloneable [`SessionHandle`] and never touch the state
//! directly. Each connection owns a bounded outbox drained by its own
//! writer, so a slow socket can only ever stall itself.
//!
//! ## Example
//!
//! ```
//! use turn_table::session::{Connection, SessionConfig, SessionCoordinator};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let handle = SessionCoordinator::spawn(&SessionConfig::default());
//!
//! let (connection, mut outbox) = Connection::channel(32);
//! let player = handle.connect(connection).await.unwrap();
//! assert_eq!(player.to_string(), "P1");
//!
//! let hello = outbox.recv().await.unwrap();
//! assert_eq!(hello.kind(), "initial_state");
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod coordinator;
pub mod errors;
pub mod messages;
pub mod state;

pub use config::{DEFAULT_SEATS, SessionConfig};
pub use connection::{Connection, ConnectionId};
pub use coordinator::{SessionCoordinator, SessionHandle};
pub use errors::{DeliveryError, SessionClosed, SessionError};
pub use messages::SessionMessage;
pub use state::{SessionPhase, SessionState};
