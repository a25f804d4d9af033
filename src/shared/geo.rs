use serde::{Deserialize, Serialize};

/// Intra-complex walking, blocks per second.
pub const RUNNING_SPEED: f64 = 5.612;
/// Declared interchange walking, blocks per second.
pub const TRANSFER_SPEED: f64 = 4.317;
/// Undeclared cross-country walking, blocks per second.
pub const WILD_WALKING_SPEED: f64 = 2.25;

/// A world position on the map plane. The vertical axis is ignored for
/// pathfinding purposes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub z: f64,
}

impl From<(f64, f64)> for Position {
    fn from(value: (f64, f64)) -> Self {
        Self {
            x: value.0,
            z: value.1,
        }
    }
}

impl Position {
    pub fn distance_squared(&self, other: &Self) -> f64 {
        (self.x - other.x).powi(2) + (self.z - other.z).powi(2)
    }

    pub fn distance(&self, other: &Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// Distance rendered the way walk-leg labels expect it, two decimals max.
pub fn round_blocks(blocks: f64) -> f64 {
    (blocks * 100.0).round() / 100.0
}

#[test]
fn distance_axis_aligned() {
    let a = Position { x: 0.0, z: 0.0 };
    let b = Position { x: 0.0, z: 30.0 };
    assert_eq!(a.distance(&b), 30.0);
}

#[test]
fn distance_diagonal() {
    let a = Position { x: 3.0, z: 0.0 };
    let b = Position { x: 0.0, z: 4.0 };
    assert_eq!(a.distance(&b), 5.0);
}

#[test]
fn distance_squared_skips_sqrt() {
    let a = Position { x: 1.0, z: 1.0 };
    let b = Position { x: 4.0, z: 5.0 };
    assert_eq!(a.distance_squared(&b), 25.0);
}

#[test]
fn round_blocks_two_decimals() {
    assert_eq!(round_blocks(21.58497), 21.58);
    assert_eq!(round_blocks(21.586), 21.59);
}
