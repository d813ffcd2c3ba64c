//! Unified error type for the hexfront server.

use hexfront_protocol::ProtocolError;
use hexfront_room::RoomError;
use hexfront_sim::ConfigError;
use hexfront_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each wrapped variant generates the `From`
/// impl, so `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum HexfrontError {
    /// A transport-level error (accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The registry or a match could not be reached.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The match scenario cannot start a game.
    #[error("invalid scenario: {0}")]
    Scenario(#[from] ConfigError),

    /// Server settings could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// A peer actor sent something its counterpart's state does not allow.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
}

#[cfg(test)]
mod tests {
    use hexfront_protocol::{RoomCode, RoomId};

    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::Bind {
            addr: "10.0.0.1:80".into(),
            source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
        };
        let hexfront_err: HexfrontError = err.into();
        assert!(matches!(hexfront_err, HexfrontError::Transport(_)));
        assert!(hexfront_err.to_string().contains("10.0.0.1:80"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let hexfront_err: HexfrontError = err.into();
        assert!(matches!(hexfront_err, HexfrontError::Protocol(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::RoomUnavailable(RoomCode::new("abc"), RoomId(3));
        let hexfront_err: HexfrontError = err.into();
        assert!(matches!(hexfront_err, HexfrontError::Room(_)));
        assert!(hexfront_err.to_string().contains("abc"));
    }

    #[test]
    fn test_from_scenario_error() {
        let err = ConfigError::ZeroDriveRange;
        let hexfront_err: HexfrontError = err.into();
        assert!(matches!(hexfront_err, HexfrontError::Scenario(_)));
        assert_eq!(
            hexfront_err.to_string(),
            "invalid scenario: drive range must be at least 1"
        );
    }
}
