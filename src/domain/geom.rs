/// Wall-space vector.
///
/// `x` runs left/right across the wall, `y` runs up from the base (y = 0),
/// `z` is depth off the wall surface and never takes part in reach checks.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Vec3 { x, y, z }
    }

    pub fn offset(self, by: Vec3) -> Vec3 {
        Vec3::new(self.x + by.x, self.y + by.y, self.z + by.z)
    }

    /// Euclidean distance in the wall plane (z ignored).
    pub fn planar_distance(self, other: Vec3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Integer grid key for a wall coordinate.
///
/// Halves round toward +infinity, so `-2.5` keys to `-2` and `2.5` to `3`.
/// Every hold insert and lookup goes through this one function.
pub fn grid_key(x: f32, y: f32) -> (i32, i32) {
    ((x + 0.5).floor() as i32, (y + 0.5).floor() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planar_distance_ignores_depth() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 4.0, 9.0);
        assert!((a.planar_distance(b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn grid_key_rounds_halves_up() {
        assert_eq!(grid_key(-2.5, 2.5), (-2, 3));
        assert_eq!(grid_key(-2.6, 0.49), (-3, 0));
        assert_eq!(grid_key(1.0, 28.0), (1, 28));
    }
}
