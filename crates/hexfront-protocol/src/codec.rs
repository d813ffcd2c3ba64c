//! Turning envelopes into frames and back.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Converts wire values to bytes and back.
///
/// The connection actor holds a codec and never touches a serialization
/// library directly, so the wire format is swappable in one place.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if the value cannot be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Parses a frame into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] for malformed or mistyped input.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that speaks JSON, which is what the browser client uses.
///
/// ```rust
/// use hexfront_protocol::{Codec, Envelope, JsonCodec, ServerMessage};
///
/// let codec = JsonCodec;
/// let envelope = Envelope::new(1, 0, ServerMessage::RoomJoined);
///
/// let bytes = codec.encode(&envelope).unwrap();
/// let decoded: Envelope<ServerMessage> = codec.decode(&bytes).unwrap();
/// assert_eq!(envelope, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientMessage, Envelope, RoomCode};

    #[test]
    fn test_decode_client_frame() {
        let frame = br#"{"version":1,"seq":3,"timestamp":40,
            "payload":{"type":"JoinRoom","roomCode":"den"}}"#;
        let env: Envelope<ClientMessage> = JsonCodec.decode(frame).unwrap();
        assert_eq!(env.seq, 3);
        assert_eq!(
            env.payload,
            ClientMessage::JoinRoom {
                room_code: RoomCode::new("den")
            }
        );
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let result: Result<Envelope<ClientMessage>, _> =
            JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_encoded_frame_is_utf8_json() {
        let bytes = JsonCodec
            .encode(&Envelope::new(0, 0, ClientMessage::QuitRoom))
            .unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.contains(r#""type":"QuitRoom""#));
    }
}
