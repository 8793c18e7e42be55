//! Session configuration.

use serde::{Deserialize, Serialize};

/// Number of seats the game is designed around.
pub const DEFAULT_SEATS: usize = 4;

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Roster size at which the game starts (default: 4)
    pub seats: usize,

    /// Capacity of the coordinator's event inbox
    pub inbox_capacity: usize,

    /// Capacity of each connection's outbox. A connection that falls this
    /// far behind is dropped from the session.
    pub outbox_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seats: DEFAULT_SEATS,
            inbox_capacity: 100,
            outbox_capacity: 32,
        }
    }
}

impl SessionConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.seats == 0 {
            return Err("Seats must be at least 1".to_string());
        }

        if self.inbox_capacity == 0 {
            return Err("Inbox capacity must be greater than 0".to_string());
        }

        // Registering a newcomer needs room for initial_state plus the
        // start or turn broadcast in the same step.
        if self.outbox_capacity < 2 {
            return Err("Outbox capacity must be at least 2".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SessionConfig::default();
        assert_eq!(config.seats, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_seats_rejected() {
        let config = SessionConfig {
            seats: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tiny_outbox_rejected() {
        let config = SessionConfig {
            outbox_capacity: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
