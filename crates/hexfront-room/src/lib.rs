//! Match actors and the room registry for hexfront.
//!
//! Every match runs as its own Tokio task and owns its
//! [`GameState`](hexfront_sim::GameState) outright. Connection actors talk
//! to it only through a [`PlayerLink`]/[`SideLink`] channel pair, and the
//! [`Hub`] task routes join requests by room code.
//!
//! ```text
//! player ──JoinRequest──► Hub ──SideLink──► room task
//!   ▲                                          │
//!   └──────────── RoomMessage (per side) ◄─────┘
//! ```
//!
//! # Key types
//!
//! - [`HubHandle`]: the only way in; cloned into every connection
//! - [`link`]: builds the channel pair for one side of one match
//! - [`RoomState`]: lifecycle of a match actor
//! - [`RoomConfig`]: channel sizes

mod config;
mod error;
mod hub;
mod link;
mod room;

pub use config::{RoomConfig, RoomState};
pub use error::RoomError;
pub use hub::{Hub, HubHandle, JoinRequest, spawn_hub};
pub use link::{PlayerLink, PlayerMessage, RoomMessage, SideLink, link};
