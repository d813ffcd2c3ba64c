use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two participants in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    One,
    Two,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::One, Side::Two];

    /// Position of this side in per-side arrays.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Side::One => 0,
            Side::Two => 1,
        }
    }

    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::One => f.write_str("side1"),
            Side::Two => f.write_str("side2"),
        }
    }
}
