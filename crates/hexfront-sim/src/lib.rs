//! Authoritative match simulation for hexfront.
//!
//! A [`GameState`] owns the cell map and both tank rosters of one match
//! and is mutated only by [`GameState::resolve_actions`]. It does no I/O
//! and never blocks; the match actor that owns it is responsible for
//! sequencing turns.
//!
//! ```text
//! MatchConfig ──► GameState::new ──► resolve_actions(side1, side2)
//!                                        │
//!                                        ▼
//!                           [side1 events, side2 events]
//! ```
//!
//! Each side only ever gets its own event list. Fog of war decides which
//! of the opponent's doings make it into that list.

mod config;
mod error;
mod side;
mod state;

pub use config::{FirstMover, MatchConfig, ShrinkConfig};
pub use error::ConfigError;
pub use side::Side;
pub use state::{GameState, MatchOutcome, Tank};
