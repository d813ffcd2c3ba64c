//! Match configuration.
//!
//! A [`MatchConfig`] is authored as JSON (camelCase) or taken from
//! [`MatchConfig::basic`]. It is immutable once a
//! [`GameState`](crate::GameState) has been built from it.

use std::collections::{HashMap, HashSet};

use hexfront_protocol::{ClientConfig, SceneConfig, TankConfig, Vector};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, Side};

/// Which side resolves its half-turn first on turn one.
///
/// The order alternates every turn after that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FirstMover {
    #[default]
    Side1,
    Side2,
    /// Coin flip when the match starts.
    Random,
}

impl FirstMover {
    /// Returns `true` if side one moves first.
    pub fn side1_first(self) -> bool {
        match self {
            FirstMover::Side1 => true,
            FirstMover::Side2 => false,
            FirstMover::Random => rand::rng().random_bool(0.5),
        }
    }
}

/// The shrinking-boundary schedule.
///
/// On turn `after`, and every `interval` turns after that, every cell
/// and tank at distance `>= radius` from `center` is removed and the
/// radius drops by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShrinkConfig {
    pub after: u32,
    pub interval: u32,
    pub center: Vector,
    pub radius: u32,
}

impl ShrinkConfig {
    /// Whether the boundary shrinks at the end of `turn`.
    pub fn shrinks_on(&self, turn: u32) -> bool {
        self.interval > 0 && turn >= self.after && (turn - self.after) % self.interval == 0
    }
}

/// Everything needed to start a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchConfig {
    pub side1_tanks: Vec<TankConfig>,
    pub side2_tanks: Vec<TankConfig>,
    /// Mapped cells. Anything not listed is out of bounds.
    pub hexes: Vec<SceneConfig>,
    /// Overlays that make their cell non-traversable.
    #[serde(default)]
    pub sites: Vec<SceneConfig>,
    /// Maximum number of steps in one move.
    pub drive_range: u32,
    pub visibility_range: u32,
    pub fire_range: u32,
    pub shrink: ShrinkConfig,
    #[serde(default)]
    pub first_mover: FirstMover,
}

impl MatchConfig {
    /// The built-in scenario: three tanks against one on a small map.
    pub fn basic() -> Self {
        let hex = |x, y, variant| SceneConfig {
            position: Vector::new(x, y),
            variant,
        };
        let tank = |id, x, y| TankConfig {
            id: hexfront_protocol::TankId(id),
            position: Vector::new(x, y),
        };

        Self {
            side1_tanks: vec![tank(1, 0, 0), tank(2, 2, -2), tank(4, -2, -1)],
            side2_tanks: vec![tank(9, 0, 1)],
            hexes: vec![
                hex(1, -2, 2),
                hex(2, -2, 1),
                hex(-2, -1, 2),
                hex(-1, -1, 2),
                hex(0, -1, 2),
                hex(-2, 0, 0),
                hex(0, 0, 0),
                hex(1, 0, 1),
                hex(-2, 1, 0),
                hex(-1, 1, 0),
                hex(0, 1, 0),
                hex(1, 1, 1),
                hex(-2, 2, 0),
                hex(-1, 2, 0),
            ],
            sites: vec![hex(1, 0, 8), hex(-1, 2, 6)],
            drive_range: 6,
            visibility_range: 2,
            fire_range: 3,
            shrink: ShrinkConfig {
                after: 4,
                interval: 2,
                center: Vector::ZERO,
                radius: 4,
            },
            first_mover: FirstMover::Side1,
        }
    }

    pub fn tanks(&self, side: Side) -> &[TankConfig] {
        match side {
            Side::One => &self.side1_tanks,
            Side::Two => &self.side2_tanks,
        }
    }

    /// Cells keyed by position, `true` when traversable.
    pub(crate) fn cell_map(&self) -> HashMap<Vector, bool> {
        let mut cells: HashMap<Vector, bool> =
            self.hexes.iter().map(|h| (h.position, true)).collect();
        for site in &self.sites {
            if let Some(traversable) = cells.get_mut(&site.position) {
                *traversable = false;
            }
        }
        cells
    }

    /// Checks that a match can be started from this configuration.
    ///
    /// # Errors
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.drive_range == 0 {
            return Err(ConfigError::ZeroDriveRange);
        }
        if self.fire_range == 0 {
            return Err(ConfigError::ZeroFireRange);
        }
        if self.shrink.interval == 0 {
            return Err(ConfigError::ZeroShrinkInterval);
        }

        let cells = self.cell_map();
        let mut occupied = HashSet::new();
        for side in Side::ALL {
            let tanks = self.tanks(side);
            if tanks.is_empty() {
                return Err(ConfigError::EmptyRoster { side });
            }
            let mut ids = HashSet::new();
            for tank in tanks {
                if !ids.insert(tank.id) {
                    return Err(ConfigError::DuplicateTank { side, id: tank.id });
                }
                if cells.get(&tank.position) != Some(&true) {
                    return Err(ConfigError::BlockedStart {
                        side,
                        id: tank.id,
                        position: tank.position,
                    });
                }
                if !occupied.insert(tank.position) {
                    return Err(ConfigError::SharedCell(tank.position));
                }
            }
        }
        Ok(())
    }

    /// The view of this configuration handed to `side` at game start.
    ///
    /// The side's own roster is `player_tanks`, the opponent's is
    /// `enemy_tanks`.
    pub fn client_config(&self, side: Side) -> ClientConfig {
        ClientConfig {
            player_tanks: self.tanks(side).to_vec(),
            enemy_tanks: self.tanks(side.opponent()).to_vec(),
            hexes: self.hexes.clone(),
            sites: self.sites.clone(),
            drive_range: self.drive_range,
            visibility_range: self.visibility_range,
            fire_range: self.fire_range,
            center: self.shrink.center,
            radius: self.shrink.radius,
        }
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::basic()
    }
}
