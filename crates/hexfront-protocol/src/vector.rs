//! Hexagonal axial coordinates.
//!
//! A [`Vector`] addresses a cell on the hex grid using two axial axes.
//! The third cube axis is implied (`z = -x - y`), which is why the
//! distance metric looks at `x + y` as well as `x` and `y`.

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A signed axial coordinate pair on the hex grid.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
)]
pub struct Vector {
    pub x: i32,
    pub y: i32,
}

impl Vector {
    /// The origin.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// The six unit directions, clockwise from `+x`.
    pub const DIRECTIONS: [Self; 6] = [
        Self { x: 1, y: 0 },
        Self { x: 0, y: 1 },
        Self { x: -1, y: 1 },
        Self { x: -1, y: 0 },
        Self { x: 0, y: -1 },
        Self { x: 1, y: -1 },
    ];

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise sum. Wraps at the `i32` edges instead of panicking;
    /// coordinates that far out are never on a map.
    #[inline]
    pub fn add(self, other: Self) -> Self {
        Self {
            x: self.x.wrapping_add(other.x),
            y: self.y.wrapping_add(other.y),
        }
    }

    /// Component-wise difference, wrapping like [`Vector::add`].
    #[inline]
    pub fn sub(self, other: Self) -> Self {
        Self {
            x: self.x.wrapping_sub(other.x),
            y: self.y.wrapping_sub(other.y),
        }
    }

    /// Hex distance: `max(|dx|, |dy|, |dx + dy|)`.
    ///
    /// This is the metric for visibility, fire range and the shrinking
    /// boundary. It is not Euclidean. Computed in `i64` so any pair of
    /// coordinates has a distance; results past `u32::MAX` saturate.
    #[inline]
    pub fn distance(self, other: Self) -> u32 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        let d = dx.abs().max(dy.abs()).max((dx + dy).abs());
        u32::try_from(d).unwrap_or(u32::MAX)
    }

    /// True for exactly the six neighbours of the origin.
    #[inline]
    pub fn is_unit(self) -> bool {
        self.distance(Self::ZERO) == 1
    }
}

impl Add for Vector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Vector::add(self, rhs)
    }
}

impl Sub for Vector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Vector::sub(self, rhs)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Vector> {
        let mut out = Vec::new();
        for x in -4..=4 {
            for y in -4..=4 {
                out.push(Vector::new(x, y));
            }
        }
        out
    }

    #[test]
    fn test_distance_is_symmetric_and_zero_on_self() {
        let points = sample();
        for &a in &points {
            assert_eq!(a.distance(a), 0);
            for &b in &points {
                assert_eq!(a.distance(b), b.distance(a), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_distance_uses_hex_metric() {
        assert_eq!(Vector::new(2, -2).distance(Vector::ZERO), 2);
        assert_eq!(Vector::new(-2, -1).distance(Vector::ZERO), 3);
        assert_eq!(Vector::new(3, 0).distance(Vector::new(-2, 0)), 5);
        // Euclidean would say ~1.41 here; the hex metric says 2.
        assert_eq!(Vector::new(1, 1).distance(Vector::ZERO), 2);
        assert_eq!(Vector::new(1, -1).distance(Vector::ZERO), 1);
    }

    #[test]
    fn test_exactly_six_unit_vectors() {
        let units: Vec<Vector> =
            sample().into_iter().filter(|v| v.is_unit()).collect();
        assert_eq!(units.len(), 6);
        for dir in Vector::DIRECTIONS {
            assert!(units.contains(&dir));
            assert!(dir.is_unit());
        }
        assert!(!Vector::ZERO.is_unit());
        assert!(!Vector::new(1, 1).is_unit());
    }

    #[test]
    fn test_add_sub_operators_agree_with_methods() {
        let a = Vector::new(2, -3);
        let b = Vector::new(-1, 4);
        assert_eq!(a + b, Vector::new(1, 1));
        assert_eq!(a - b, Vector::new(3, -7));
        assert_eq!((a + b) - b, a);
    }

    #[test]
    fn test_distance_is_total_at_i32_edges() {
        let far = Vector::new(i32::MIN, 0);
        assert_eq!(far.distance(Vector::new(1, 0)), i32::MAX as u32 + 2);
        assert_eq!(Vector::new(i32::MAX, 0).distance(far), u32::MAX);
        assert_eq!(
            Vector::new(i32::MAX, i32::MAX).distance(Vector::ZERO),
            u32::MAX - 1
        );
        // 2 * (2^32 - 1) does not fit.
        assert_eq!(
            Vector::new(i32::MAX, i32::MAX).distance(Vector::new(i32::MIN, i32::MIN)),
            u32::MAX
        );
        assert_eq!(
            Vector::new(i32::MAX, i32::MIN).distance(Vector::ZERO),
            i32::MAX as u32 + 1
        );
        assert!(!Vector::new(i32::MAX, 1).is_unit());
        assert!(!Vector::new(i32::MIN, i32::MAX).is_unit());
        assert!(!far.is_unit());
    }

    #[test]
    fn test_add_sub_wrap_instead_of_panicking() {
        let edge = Vector::new(i32::MAX, i32::MIN);
        assert_eq!(edge + Vector::new(1, 0), Vector::new(i32::MIN, i32::MIN));
        assert_eq!(edge - Vector::new(0, 1), Vector::new(i32::MAX, i32::MAX));
    }

    #[test]
    fn test_vector_json_shape() {
        let json = serde_json::to_value(Vector::new(2, -1)).unwrap();
        assert_eq!(json, serde_json::json!({ "x": 2, "y": -1 }));
    }
}
