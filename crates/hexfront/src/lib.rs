//! # hexfront
//!
//! Authoritative server for two-player, turn-based hex tank matches.
//!
//! Clients connect over WebSocket, join a match by room code, and submit
//! one set of orders per turn. The server resolves both sides' orders
//! together and sends each side only what its tanks can see.
//!
//! ```text
//! client ─ws─► player actor ──join──► hub ──► room actor (GameState)
//!                   ▲                              │
//!                   └────── per-side results ◄─────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hexfront::prelude::*;
//!
//! # async fn start() -> Result<(), HexfrontError> {
//! let config = ServerConfig::from_env();
//! let server = HexfrontServerBuilder::from_config(&config)
//!     .match_config(config.load_match_config()?)
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
pub mod fsm;
mod player;
mod server;

pub use config::ServerConfig;
pub use error::HexfrontError;
pub use server::{HexfrontServer, HexfrontServerBuilder};

/// Everything needed to configure and run a server, or to talk to one.
pub mod prelude {
    pub use crate::{HexfrontError, HexfrontServer, HexfrontServerBuilder, ServerConfig};
    pub use hexfront_protocol::{
        ClientConfig, ClientMessage, Envelope, GameResult, PROTOCOL_VERSION, RoomCode,
        SceneConfig, ServerMessage, TankAction, TankConfig, TankId, TurnEvent, Vector,
    };
    pub use hexfront_room::RoomConfig;
    pub use hexfront_sim::{FirstMover, MatchConfig, ShrinkConfig};
}
