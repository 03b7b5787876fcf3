/// Wall model: the registry of colored holds.
///
/// Holds are keyed by their rounded integer grid cell (see `grid_key`), so a
/// fractional placement can never produce two holds for one cell. Lookups
/// are exact-key; `holds_in_range` is the one distance query and scans every
/// hold (routes carry tens of holds, not thousands).

use std::collections::HashMap;

use thiserror::Error;

use crate::domain::geom::grid_key;
use crate::domain::hold::{Hold, HoldColor};

pub const DEFAULT_WIDTH: i32 = 20;
pub const DEFAULT_HEIGHT: i32 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WallError {
    #[error("two holds share grid cell ({x}, {y})")]
    DuplicateHold { x: i32, y: i32 },
}

#[derive(Clone, Debug)]
pub struct Wall {
    holds: HashMap<(i32, i32), Hold>,
    pub width: i32,
    pub height: i32,
}

impl Wall {
    pub fn new(width: i32, height: i32) -> Self {
        Wall { holds: HashMap::with_capacity(32), width, height }
    }

    /// Register a hold, overwriting whatever occupied that cell.
    /// Returns the replaced hold, if any.
    #[allow(dead_code)]
    pub fn add_hold(&mut self, x: f32, y: f32, color: HoldColor) -> Option<Hold> {
        let (gx, gy) = grid_key(x, y);
        self.holds.insert((gx, gy), Hold::new(gx, gy, color))
    }

    /// Construction-time insert: a second hold on an occupied cell is an error.
    pub fn try_add_hold(&mut self, x: f32, y: f32, color: HoldColor) -> Result<(), WallError> {
        let (gx, gy) = grid_key(x, y);
        if self.holds.contains_key(&(gx, gy)) {
            return Err(WallError::DuplicateHold { x: gx, y: gy });
        }
        self.holds.insert((gx, gy), Hold::new(gx, gy, color));
        Ok(())
    }

    #[allow(dead_code)]
    pub fn has_hold_at(&self, x: f32, y: f32) -> bool {
        self.holds.contains_key(&grid_key(x, y))
    }

    pub fn hold_at(&self, x: f32, y: f32) -> Option<Hold> {
        self.holds.get(&grid_key(x, y)).copied()
    }

    /// Every hold within `radius` (inclusive) of `(x, y)`.
    pub fn holds_in_range(&self, x: f32, y: f32, radius: f32) -> Vec<Hold> {
        self.holds
            .values()
            .filter(|h| {
                let dx = h.x as f32 - x;
                let dy = h.y as f32 - y;
                (dx * dx + dy * dy).sqrt() <= radius
            })
            .copied()
            .collect()
    }

    pub fn holds(&self) -> impl Iterator<Item = &Hold> {
        self.holds.values()
    }

    pub fn len(&self) -> usize {
        self.holds.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.holds.is_empty()
    }

    /// Grid row of the highest hold: reaching it means the top of the route.
    pub fn summit_row(&self) -> Option<i32> {
        self.holds.values().map(|h| h.y).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall_from(holds: &[(f32, f32, HoldColor)]) -> Wall {
        let mut w = Wall::new(DEFAULT_WIDTH, DEFAULT_HEIGHT);
        for &(x, y, c) in holds {
            w.add_hold(x, y, c);
        }
        w
    }

    #[test]
    fn lookup_agrees_with_presence() {
        let w = wall_from(&[(-2.0, 2.0, HoldColor::Red), (2.0, 2.0, HoldColor::Blue)]);
        for &(x, y) in &[(-2.0, 2.0), (2.0, 2.0), (0.0, 0.0), (5.0, 9.0)] {
            assert_eq!(w.has_hold_at(x, y), w.hold_at(x, y).is_some());
        }
        assert_eq!(w.hold_at(-2.0, 2.0).map(|h| h.color), Some(HoldColor::Red));
        assert_eq!(w.hold_at(2.0, 2.0).map(|h| h.color), Some(HoldColor::Blue));
    }

    #[test]
    fn fractional_placement_uses_rounded_key() {
        let w = wall_from(&[(1.4, 2.6, HoldColor::Blue)]);
        assert!(w.has_hold_at(1.0, 3.0));
        assert!(w.has_hold_at(0.8, 3.2));
        assert_eq!(w.hold_at(1.0, 3.0), Some(Hold::new(1, 3, HoldColor::Blue)));
    }

    #[test]
    fn add_hold_overwrites_same_cell() {
        let mut w = wall_from(&[(0.0, 5.0, HoldColor::Red)]);
        let old = w.add_hold(0.2, 4.9, HoldColor::Blue);
        assert_eq!(old.map(|h| h.color), Some(HoldColor::Red));
        assert_eq!(w.len(), 1);
        assert_eq!(w.hold_at(0.0, 5.0).map(|h| h.color), Some(HoldColor::Blue));
    }

    #[test]
    fn try_add_hold_refuses_collision() {
        let mut w = Wall::new(DEFAULT_WIDTH, DEFAULT_HEIGHT);
        assert!(w.try_add_hold(3.0, 6.0, HoldColor::Red).is_ok());
        assert_eq!(
            w.try_add_hold(3.4, 6.0, HoldColor::Blue),
            Err(WallError::DuplicateHold { x: 3, y: 6 }),
        );
        assert_eq!(w.hold_at(3.0, 6.0).map(|h| h.color), Some(HoldColor::Red));
    }

    #[test]
    fn range_is_inclusive_euclidean() {
        let w = wall_from(&[
            (0.0, 0.0, HoldColor::Red),
            (1.0, 0.0, HoldColor::Blue),
            (1.0, 1.0, HoldColor::Red),
            (3.0, 0.0, HoldColor::Blue),
        ]);
        let mut near: Vec<(i32, i32)> = w.holds_in_range(0.0, 0.0, 1.0)
            .iter().map(|h| (h.x, h.y)).collect();
        near.sort();
        assert_eq!(near, vec![(0, 0), (1, 0)]);
        assert_eq!(w.holds_in_range(0.0, 0.0, 1.5).len(), 3);
    }

    #[test]
    fn summit_is_highest_row() {
        let w = wall_from(&[(0.0, 3.0, HoldColor::Red), (1.0, 28.0, HoldColor::Blue)]);
        assert_eq!(w.summit_row(), Some(28));
        assert_eq!(Wall::new(4, 4).summit_row(), None);
    }
}
