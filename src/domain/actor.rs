/// Actors: the two climbers, their body anchors, and the partner-grip record.
///
/// An actor's identity (id + color) is fixed at construction. Position and
/// anchor highlights are the only things that change during a session.

use serde::{Deserialize, Serialize};

use super::geom::Vec3;
use super::hold::HoldColor;

/// Player identity. Player 1 climbs red, Player 2 climbs blue.
/// On the wire a player is the plain number `1` or `2`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    pub const BOTH: [PlayerId; 2] = [PlayerId::One, PlayerId::Two];

    pub fn partner(self) -> PlayerId {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }

    pub fn color(self) -> HoldColor {
        match self {
            PlayerId::One => HoldColor::Red,
            PlayerId::Two => HoldColor::Blue,
        }
    }

    pub fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }

    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }
}

impl TryFrom<u8> for PlayerId {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(PlayerId::One),
            2 => Ok(PlayerId::Two),
            other => Err(format!("player id must be 1 or 2, got {other}")),
        }
    }
}

impl From<PlayerId> for u8 {
    fn from(id: PlayerId) -> u8 {
        id.number()
    }
}

/// The six body points a partner may use in place of a wall hold.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorName {
    Feet,
    Knees,
    Hips,
    Hands,
    Elbows,
    Shoulders,
}

impl AnchorName {
    /// Scan order for nearest-anchor selection. Ties keep the earlier entry.
    pub const ALL: [AnchorName; 6] = [
        AnchorName::Feet,
        AnchorName::Knees,
        AnchorName::Hips,
        AnchorName::Hands,
        AnchorName::Elbows,
        AnchorName::Shoulders,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AnchorName::Feet => "feet",
            AnchorName::Knees => "knees",
            AnchorName::Hips => "hips",
            AnchorName::Hands => "hands",
            AnchorName::Elbows => "elbows",
            AnchorName::Shoulders => "shoulders",
        }
    }

    /// Offset from the actor's position for an upright climber.
    pub fn default_offset(self) -> Vec3 {
        match self {
            AnchorName::Feet => Vec3::new(0.0, -0.8, 0.0),
            AnchorName::Knees => Vec3::new(0.0, -0.4, 0.0),
            AnchorName::Hips => Vec3::new(0.0, -0.2, 0.0),
            AnchorName::Hands => Vec3::new(0.0, 0.7, 0.0),
            AnchorName::Elbows => Vec3::new(0.0, 0.3, 0.0),
            AnchorName::Shoulders => Vec3::new(0.0, 0.1, 0.0),
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Which partner anchor is standing in for a wall hold.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BodyHoldUse {
    pub partner: PlayerId,
    pub anchor: AnchorName,
}

#[derive(Clone, Debug)]
pub struct Actor {
    id: PlayerId,
    color: HoldColor,
    position: Vec3,
    anchors: [Vec3; 6],
    highlighted: [bool; 6],
    pub using_body_hold: Option<BodyHoldUse>,
}

impl Actor {
    pub fn new(id: PlayerId, position: Vec3) -> Self {
        Actor {
            id,
            color: id.color(),
            position,
            anchors: AnchorName::ALL.map(AnchorName::default_offset),
            highlighted: [false; 6],
            using_body_hold: None,
        }
    }

    /// Replace one anchor offset (posed climbers, test fixtures).
    #[allow(dead_code)]
    pub fn with_anchor_offset(mut self, name: AnchorName, offset: Vec3) -> Self {
        self.anchors[name.slot()] = offset;
        self
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn color(&self) -> HoldColor {
        self.color
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unconditional overwrite. Used for accepted moves and remote moves alike.
    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vec3::new(x, y, z);
    }

    pub fn anchor_offset(&self, name: AnchorName) -> Vec3 {
        self.anchors[name.slot()]
    }

    pub fn anchor_world_position(&self, name: AnchorName) -> Vec3 {
        self.position.offset(self.anchor_offset(name))
    }

    /// All anchors with their world positions, in scan order.
    pub fn anchors_world(&self) -> impl Iterator<Item = (AnchorName, Vec3)> + '_ {
        AnchorName::ALL
            .into_iter()
            .map(move |name| (name, self.anchor_world_position(name)))
    }

    /// Visual only: marks the anchor the partner is currently gripping.
    pub fn highlight_anchor(&mut self, name: AnchorName, on: bool) {
        self.highlighted[name.slot()] = on;
    }

    pub fn is_highlighted(&self, name: AnchorName) -> bool {
        self.highlighted[name.slot()]
    }

    pub fn clear_highlights(&mut self) {
        self.highlighted = [false; 6];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_follows_player_number() {
        let red = Actor::new(PlayerId::One, Vec3::ZERO);
        let blue = Actor::new(PlayerId::Two, Vec3::ZERO);
        assert_eq!(red.color(), HoldColor::Red);
        assert_eq!(blue.color(), HoldColor::Blue);
        assert_eq!(PlayerId::One.partner(), PlayerId::Two);
    }

    #[test]
    fn anchor_world_position_adds_offset() {
        let mut a = Actor::new(PlayerId::Two, Vec3::new(2.0, 5.0, 0.0));
        let feet = a.anchor_world_position(AnchorName::Feet);
        assert!((feet.y - 4.2).abs() < 1e-6);
        a.set_position(-1.0, 3.0, 0.0);
        let hands = a.anchor_world_position(AnchorName::Hands);
        assert!((hands.x + 1.0).abs() < 1e-6);
        assert!((hands.y - 3.7).abs() < 1e-6);
    }

    #[test]
    fn custom_offset_replaces_one_anchor() {
        let a = Actor::new(PlayerId::One, Vec3::ZERO)
            .with_anchor_offset(AnchorName::Feet, Vec3::new(-0.9, -0.1, 0.0));
        assert_eq!(a.anchor_offset(AnchorName::Feet), Vec3::new(-0.9, -0.1, 0.0));
        assert_eq!(a.anchor_offset(AnchorName::Knees), AnchorName::Knees.default_offset());
    }

    #[test]
    fn highlight_is_per_anchor() {
        let mut a = Actor::new(PlayerId::One, Vec3::ZERO);
        a.highlight_anchor(AnchorName::Hips, true);
        assert!(a.is_highlighted(AnchorName::Hips));
        assert!(!a.is_highlighted(AnchorName::Hands));
        a.clear_highlights();
        assert!(!a.is_highlighted(AnchorName::Hips));
    }

    #[test]
    fn player_id_wire_form_is_a_number() {
        assert_eq!(serde_json::to_string(&PlayerId::Two).unwrap(), "2");
        let back: PlayerId = serde_json::from_str("1").unwrap();
        assert_eq!(back, PlayerId::One);
        assert!(serde_json::from_str::<PlayerId>("3").is_err());
    }
}
