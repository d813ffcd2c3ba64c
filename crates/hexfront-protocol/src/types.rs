//! Wire types for hexfront.
//!
//! Everything in this module travels between browser and server. All
//! payload enums are internally tagged (`{"type": "Variant", ...}`) with
//! camelCase field names, which is what the web client reads.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ProtocolError, Vector};

/// The protocol version stamped on every envelope.
pub const PROTOCOL_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifies a tank within its side's roster.
///
/// Serialized as a plain number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TankId(pub u32);

impl fmt::Display for TankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T-{}", self.0)
    }
}

/// The opaque code players type in to meet in the same match.
///
/// Two join requests with the same code land in the same match; an
/// unseen code starts a new one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(pub String);

impl RoomCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-assigned identity of one match instance.
///
/// A code can be reused after its match closes, so the registry tells
/// successive matches apart by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Match configuration, as seen by one side
// ---------------------------------------------------------------------------

/// Outcome of a match from one side's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Win,
    Draw,
    Lose,
}

impl GameResult {
    /// The result the other side gets.
    pub fn inverse(self) -> Self {
        match self {
            Self::Win => Self::Lose,
            Self::Draw => Self::Draw,
            Self::Lose => Self::Win,
        }
    }
}

/// A tank's starting placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TankConfig {
    pub id: TankId,
    pub position: Vector,
}

/// A map cell or site overlay with its art variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneConfig {
    pub position: Vector,
    pub variant: u32,
}

/// The configuration one side receives when the match starts.
///
/// Each side sees its own roster as `playerTanks` and the opponent's as
/// `enemyTanks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub player_tanks: Vec<TankConfig>,
    pub enemy_tanks: Vec<TankConfig>,
    pub hexes: Vec<SceneConfig>,
    pub sites: Vec<SceneConfig>,
    pub drive_range: u32,
    pub visibility_range: u32,
    pub fire_range: u32,
    pub center: Vector,
    pub radius: u32,
}

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// One order for one tank within a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum TankAction {
    /// Drive along `path`, which starts at the tank's current cell.
    Move {
        #[serde(alias = "id")]
        tank_id: TankId,
        path: Vec<Vector>,
    },
    /// Fire along a unit `direction`.
    Fire {
        #[serde(alias = "id")]
        tank_id: TankId,
        #[serde(alias = "dir")]
        direction: Vector,
    },
}

impl TankAction {
    pub fn tank_id(&self) -> TankId {
        match self {
            Self::Move { tank_id, .. } | Self::Fire { tank_id, .. } => *tank_id,
        }
    }
}

/// Messages a client sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Join (or open) the match behind `room_code`.
    JoinRoom { room_code: RoomCode },
    /// Submit this side's orders for the current turn.
    SendTurn {
        #[serde(default)]
        actions: Vec<TankAction>,
    },
    /// Leave the current match. Forfeits a running game.
    QuitRoom,
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// One step of a resolved turn, as observed by one side.
///
/// Each side receives its own ordered list; fog of war decides which of
/// the opponent's events make it into that list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum TurnEvent {
    /// A tank leaves `from` towards `to`.
    MoveStart { tank_id: TankId, from: Vector, to: Vector },
    /// A tank passes through `via` on its way from `from` to `to`.
    MoveStep {
        tank_id: TankId,
        from: Vector,
        via: Vector,
        to: Vector,
    },
    /// A tank arrives at `to`, coming from `from`.
    MoveEnd { tank_id: TankId, from: Vector, to: Vector },
    /// A tank fired along `direction`.
    Fired { tank_id: TankId, direction: Vector },
    /// A shell landed on an empty cell.
    Explosion { position: Vector },
    /// A shell landed on and destroyed `tank_id`.
    DestroyingExplosion { position: Vector, tank_id: TankId },
    /// An opposing tank is known to be destroyed. Sent once per tank.
    Destroyed { position: Vector, tank_id: TankId },
    /// An opposing tank came into view.
    NowVisible { tank_id: TankId, position: Vector },
    /// An opposing tank left view.
    NowHidden { tank_id: TankId, position: Vector },
    /// Cells at or beyond `radius` go away at the end of next turn.
    BoundaryWarning { radius: u32 },
    /// Cells at or beyond `radius` are gone.
    BoundaryShrunk { radius: u32 },
}

/// Messages the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Both sides are present; here is your view of the match.
    StartGame { config: ClientConfig },
    /// Your view of the turn that was just resolved.
    TurnResults { turn_results: Vec<TurnEvent> },
    /// You are seated in the match.
    RoomJoined,
    /// The match stream closed; you are back in the lobby.
    RoomDisconnected,
    /// The match is over.
    GameFinished { result: GameResult },
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

fn default_version() -> u32 {
    PROTOCOL_VERSION
}

/// The top-level frame. Every message on the wire is an envelope.
///
/// ```text
/// { "version": 1, "seq": 7, "timestamp": 1520,
///   "payload": { "type": "TurnResults", "turnResults": [...] } }
/// ```
///
/// `version` defaults to [`PROTOCOL_VERSION`] and `seq`/`timestamp` to 0,
/// so a bare `{"payload": {...}}` from a client is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Per-connection sequence number, assigned by the sender.
    #[serde(default)]
    pub seq: u64,

    /// Milliseconds since the sender's connection started.
    #[serde(default)]
    pub timestamp: u64,

    pub payload: T,
}

impl<T> Envelope<T> {
    /// Wraps a payload in an envelope stamped with the current version.
    pub fn new(seq: u64, timestamp: u64, payload: T) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            seq,
            timestamp,
            payload,
        }
    }

    /// Unwraps the payload of an envelope this build can handle.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidMessage`] if `version` is not
    /// [`PROTOCOL_VERSION`].
    pub fn into_payload(self) -> Result<T, ProtocolError> {
        if self.version != PROTOCOL_VERSION {
            return Err(ProtocolError::InvalidMessage(format!(
                "unsupported protocol version {}",
                self.version
            )));
        }
        Ok(self.payload)
    }
}

// =========================================================================
// Tests
// =========================================================================
