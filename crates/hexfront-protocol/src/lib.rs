//! Wire protocol for hexfront.
//!
//! - **Geometry** ([`Vector`]): axial hex coordinates and the hex metric.
//! - **Types** ([`Envelope`], [`ClientMessage`], [`ServerMessage`],
//!   [`TurnEvent`], ...): everything that travels between browser and
//!   server.
//! - **Codec** ([`Codec`], [`JsonCodec`]): frames to values and back.
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope) → Player actor
//! ```

mod codec;
mod error;
mod types;
mod vector;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientConfig, ClientMessage, Envelope, GameResult, PROTOCOL_VERSION,
    RoomCode, RoomId, SceneConfig, ServerMessage, TankAction, TankConfig,
    TankId, TurnEvent,
};
pub use vector::Vector;
