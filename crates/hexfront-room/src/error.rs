//! Error types for the room layer.

use hexfront_protocol::{RoomCode, RoomId};

/// Errors that can occur while routing players to matches.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The registry task has stopped.
    #[error("room registry is unavailable")]
    HubUnavailable,

    /// The match actor behind this code cannot take the request.
    #[error("room {0} ({1}) is unavailable")]
    RoomUnavailable(RoomCode, RoomId),
}
