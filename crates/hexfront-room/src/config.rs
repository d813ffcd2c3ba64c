//! Room configuration and state machine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Channel sizes for the registry and its match actors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Buffer of the registry's request queue and of each match actor's
    /// join queue.
    pub request_buffer: usize,

    /// Buffer of each player → match channel.
    pub link_buffer: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            request_buffer: 64,
            link_buffer: 16,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// The lifecycle state of a match actor.
///
/// ```text
/// WaitingForSide1 → WaitingForSide2 → Running → Closing
///                          └───────────────────────┘
/// ```
///
/// - **WaitingForSide1**: freshly created, nobody seated.
/// - **WaitingForSide2**: one side seated. Its turns are ignored; its
///   quit closes the room.
/// - **Running**: both seated, the simulation is live. Further joins are
///   turned away.
/// - **Closing**: both links dropped and the registry notified. Joins are
///   turned away until the registry releases the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomState {
    WaitingForSide1,
    WaitingForSide2,
    Running,
    Closing,
}

impl RoomState {
    /// Returns `true` if the room is accepting new players.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::WaitingForSide1 | Self::WaitingForSide2)
    }

    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::WaitingForSide1, Self::WaitingForSide2)
                | (Self::WaitingForSide2, Self::Running)
                | (Self::WaitingForSide2, Self::Closing)
                | (Self::Running, Self::Closing)
        )
    }
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WaitingForSide1 => write!(f, "WaitingForSide1"),
            Self::WaitingForSide2 => write!(f, "WaitingForSide2"),
            Self::Running => write!(f, "Running"),
            Self::Closing => write!(f, "Closing"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_state_can_transition_to() {
        assert!(RoomState::WaitingForSide1.can_transition_to(RoomState::WaitingForSide2));
        assert!(RoomState::WaitingForSide2.can_transition_to(RoomState::Running));
        assert!(RoomState::WaitingForSide2.can_transition_to(RoomState::Closing));
        assert!(RoomState::Running.can_transition_to(RoomState::Closing));

        assert!(!RoomState::WaitingForSide1.can_transition_to(RoomState::Running));
        assert!(!RoomState::Running.can_transition_to(RoomState::WaitingForSide2));
        assert!(!RoomState::Closing.can_transition_to(RoomState::WaitingForSide1));
        assert!(!RoomState::Closing.can_transition_to(RoomState::Closing));
    }

    #[test]
    fn test_room_state_is_joinable() {
        assert!(RoomState::WaitingForSide1.is_joinable());
        assert!(RoomState::WaitingForSide2.is_joinable());
        assert!(!RoomState::Running.is_joinable());
        assert!(!RoomState::Closing.is_joinable());
    }

    #[test]
    fn test_room_state_display() {
        assert_eq!(RoomState::WaitingForSide2.to_string(), "WaitingForSide2");
        assert_eq!(RoomState::Closing.to_string(), "Closing");
    }

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.request_buffer, 64);
        assert_eq!(config.link_buffer, 16);
    }
}
