//! Wire protocol between players and the session server.
//!
//! Every frame is a UTF-8 JSON object with a discriminating `type` field.
//! The server never interprets move payloads; they are forwarded verbatim.

/// Protocol error types.
pub mod errors;

/// Message shapes exchanged over a player connection.
pub mod messages;

pub use errors::ProtocolError;
pub use messages::{ClientMessage, GameState, PlayerId, ServerMessage};
