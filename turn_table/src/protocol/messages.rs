use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::Value;
use std::{fmt, str::FromStr};

use super::errors::{ProtocolError, Result};

/// Opaque player identity minted once per successful connection.
///
/// Identities are assigned from a strictly increasing sequence and travel on
/// the wire as `"P<n>"`. They are never reused, so ordering by identity is
/// ordering by connection time.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PlayerId(u64);

impl PlayerId {
    pub const fn new(sequence: u64) -> Self {
        Self(sequence)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

impl FromStr for PlayerId {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s
            .strip_prefix('P')
            .filter(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()))
            .ok_or_else(|| ProtocolError::InvalidPlayerId(s.to_string()))?;
        digits
            .parse()
            .map(Self)
            .map_err(|_| ProtocolError::InvalidPlayerId(s.to_string()))
    }
}

impl Serialize for PlayerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PlayerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let repr = String::deserialize(deserializer)?;
        repr.parse().map_err(de::Error::custom)
    }
}

/// Point-in-time view of the session carried by `initial_state`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GameState {
    /// Connected players in connection order.
    pub players: Vec<PlayerId>,
    /// Current turn holder, `null` while the turn is vacant or before the
    /// game starts.
    pub turn: Option<PlayerId>,
    pub game_started: bool,
}

/// Messages pushed from the server to player connections.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent only to a newly registered connection.
    InitialState {
        player_id: PlayerId,
        game_state: GameState,
    },
    /// Announces a newcomer to everyone already in the roster.
    PlayerConnected { player_id: PlayerId },
    /// Announces a departure to the remaining roster.
    PlayerDisconnected { player_id: PlayerId },
    /// Sent to everyone once, when the last seat fills.
    GameStarted { turn: PlayerId },
    /// A vacant turn was handed to a newly joined player.
    TurnUpdate { turn: PlayerId },
    /// An accepted move and the resulting turn holder.
    GameUpdate {
        #[serde(rename = "move")]
        payload: Value,
        player_id: PlayerId,
        turn: Option<PlayerId>,
    },
}

impl ServerMessage {
    /// Encode as a JSON text frame.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    /// Decode a JSON text frame received from the server.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }

    /// Wire name of the message type.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InitialState { .. } => "initial_state",
            Self::PlayerConnected { .. } => "player_connected",
            Self::PlayerDisconnected { .. } => "player_disconnected",
            Self::GameStarted { .. } => "game_started",
            Self::TurnUpdate { .. } => "turn_update",
            Self::GameUpdate { .. } => "game_update",
        }
    }
}

/// Messages received from player connections.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// A move attempt. The sender is always taken from the connection; any
    /// `player_id` the client sends is skipped without being parsed.
    Move {
        #[serde(rename = "move")]
        payload: Value,
    },
    /// Any well-formed frame with an unrecognized `type`.
    #[serde(other)]
    Unknown,
}

impl ClientMessage {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }
}
