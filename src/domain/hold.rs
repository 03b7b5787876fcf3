/// Climbing holds and their owning color.
/// A hold never changes after it is placed; ownership decides who may grip it.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoldColor {
    Red,
    Blue,
}

impl HoldColor {
    pub fn label(self) -> &'static str {
        match self {
            HoldColor::Red => "Red",
            HoldColor::Blue => "Blue",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Hold {
    pub x: i32,
    pub y: i32,
    pub color: HoldColor,
}

impl Hold {
    pub fn new(x: i32, y: i32, color: HoldColor) -> Self {
        Hold { x, y, color }
    }

    /// Can an actor of `color` grip this hold directly?
    pub fn usable_by(&self, color: HoldColor) -> bool {
        self.color == color
    }
}
