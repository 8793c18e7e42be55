//! Authoritative roster and turn state for one session.
//!
//! Pure data and transition logic. Exclusive access is the owner's concern;
//! the coordinator actor is the only owner.

use std::collections::HashMap;

use super::{
    config::DEFAULT_SEATS,
    connection::{Connection, ConnectionId},
    errors::SessionError,
};
use crate::protocol::{GameState, PlayerId};

/// Coarse phase derived from `(started, turn)`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionPhase {
    /// Waiting for the seats to fill.
    Lobby,
    /// Started with a turn holder.
    Active,
    /// Started, but the turn holder left and nobody has joined since.
    Vacant,
}

#[derive(Debug)]
pub struct SessionState {
    seats: usize,
    /// Connected players in connection order.
    roster: Vec<PlayerId>,
    connections: HashMap<PlayerId, Connection>,
    owners: HashMap<ConnectionId, PlayerId>,
    /// Invariant: `Some(p)` implies `p` is in `roster`.
    turn: Option<PlayerId>,
    started: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(DEFAULT_SEATS)
    }
}

impl SessionState {
    pub fn new(seats: usize) -> Self {
        Self {
            seats,
            roster: Vec::with_capacity(seats),
            connections: HashMap::with_capacity(seats),
            owners: HashMap::with_capacity(seats),
            turn: None,
            started: false,
        }
    }

    /// Append `player` to the roster tail and bind it to `connection`.
    pub fn register(
        &mut self,
        player: PlayerId,
        connection: Connection,
    ) -> Result<(), SessionError> {
        if self.connections.contains_key(&player) {
            return Err(SessionError::DuplicatePlayer(player));
        }
        if self.owners.contains_key(&connection.id()) {
            return Err(SessionError::DuplicateConnection(connection.id()));
        }

        self.owners.insert(connection.id(), player);
        self.connections.insert(player, connection);
        self.roster.push(player);
        Ok(())
    }

    /// Remove `player`, vacating the turn if they held it.
    ///
    /// Returns the connection that was bound to the player, or `None` if the
    /// player was not registered.
    pub fn unregister(&mut self, player: PlayerId) -> Option<Connection> {
        let connection = self.connections.remove(&player)?;
        self.owners.remove(&connection.id());
        self.roster.retain(|p| *p != player);

        if self.turn == Some(player) {
            self.turn = None;
        }

        Some(connection)
    }

    /// Mark the game started and hand the turn to the first roster entry.
    pub fn start_game(&mut self) -> Result<PlayerId, SessionError> {
        if self.started {
            return Err(SessionError::AlreadyStarted);
        }
        let first = *self.roster.first().ok_or(SessionError::EmptyRoster)?;

        self.started = true;
        self.turn = Some(first);
        Ok(first)
    }

    /// Pass the turn to the holder's successor in roster order, wrapping at
    /// the tail.
    ///
    /// A holder missing from the roster restarts at the first entry; an
    /// empty roster vacates the turn.
    pub fn advance_turn(&mut self) -> Option<PlayerId> {
        let position = self
            .turn
            .and_then(|holder| self.roster.iter().position(|p| *p == holder));

        self.turn = if self.roster.is_empty() {
            None
        } else {
            match position {
                Some(i) => Some(self.roster[(i + 1) % self.roster.len()]),
                None => self.roster.first().copied(),
            }
        };
        self.turn
    }

    /// Hand an abandoned turn to `player`.
    pub fn fill_vacant_turn(&mut self, player: PlayerId) -> Result<(), SessionError> {
        if !self.started {
            return Err(SessionError::NotStarted);
        }
        if let Some(holder) = self.turn {
            return Err(SessionError::TurnOccupied(holder));
        }
        if !self.connections.contains_key(&player) {
            return Err(SessionError::UnknownPlayer(player));
        }

        self.turn = Some(player);
        Ok(())
    }

    pub fn snapshot(&self) -> GameState {
        GameState {
            players: self.roster.clone(),
            turn: self.turn,
            game_started: self.started,
        }
    }

    /// True when the roster has just filled every seat of an unstarted game.
    pub fn ready_to_start(&self) -> bool {
        !self.started && self.roster.len() == self.seats
    }

    pub fn phase(&self) -> SessionPhase {
        match (self.started, self.turn) {
            (false, _) => SessionPhase::Lobby,
            (true, Some(_)) => SessionPhase::Active,
            (true, None) => SessionPhase::Vacant,
        }
    }

    pub fn seats(&self) -> usize {
        self.seats
    }

    pub fn roster(&self) -> &[PlayerId] {
        &self.roster
    }

    pub fn turn(&self) -> Option<PlayerId> {
        self.turn
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    /// Player bound to a connection.
    pub fn player_for(&self, connection_id: ConnectionId) -> Option<PlayerId> {
        self.owners.get(&connection_id).copied()
    }

    pub fn connection_for(&self, player: PlayerId) -> Option<&Connection> {
        self.connections.get(&player)
    }

    /// Connections of the roster, in roster order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.roster.iter().filter_map(|p| self.connections.get(p))
    }
}
