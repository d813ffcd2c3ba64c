use hexfront_protocol::{TankId, Vector};

use crate::Side;

/// Reasons a [`MatchConfig`](crate::MatchConfig) cannot start a match.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("drive range must be at least 1")]
    ZeroDriveRange,

    #[error("fire range must be at least 1")]
    ZeroFireRange,

    #[error("shrink interval must be at least 1")]
    ZeroShrinkInterval,

    #[error("{side} has no tanks")]
    EmptyRoster { side: Side },

    #[error("{side} lists tank {id} more than once")]
    DuplicateTank { side: Side, id: TankId },

    /// The tank sits on an unmapped or non-traversable cell.
    #[error("{side} tank {id} starts on unusable cell {position}")]
    BlockedStart {
        side: Side,
        id: TankId,
        position: Vector,
    },

    #[error("two tanks start on cell {0}")]
    SharedCell(Vector),
}
