//! Protocol error types for encoding and decoding frames.

use thiserror::Error;

/// Errors that can occur while encoding or decoding protocol frames
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Failed to encode a server message
    #[error("Failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    /// Failed to decode a client frame
    #[error("Failed to decode message: {0}")]
    Decode(#[source] serde_json::Error),

    /// Player identity token was not of the form `P<n>`
    #[error("Invalid player id: {0:?}")]
    InvalidPlayerId(String),
}

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;
