/// Move rules: what makes a one-cell climb legal.
///
/// Pure functions over wall and actor data. No side effects; the engine
/// in `sim::engine` applies the consequences.
///
/// ## Wall Check
/// ┌────────────────────────────────┬──────────────┬──────────────────────┐
/// │ Hold at candidate cell          │ Verdict      │ Notes                │
/// ├────────────────────────────────┼──────────────┼──────────────────────┤
/// │ present, color == mover color   │ OwnHold      │ accept, drop partner │
/// │ present, color != mover color   │ ForeignHold  │ reject, no fallback  │
/// │ absent                          │ Empty        │ try body hold        │
/// └────────────────────────────────┴──────────────┴──────────────────────┘
///
/// ## Body-Hold Check (only on Empty)
/// ┌────────────────────────────────────────────┬──────────────────────┐
/// │ Condition                                   │ Result               │
/// ├────────────────────────────────────────────┼──────────────────────┤
/// │ no partner                                  │ reject (NoPartner)   │
/// │ dist(candidate, partner) > partner_reach    │ reject (OutOfReach)  │
/// │ no anchor with dist <= anchor_reach         │ reject (NoAnchor)    │
/// │ otherwise                                   │ nearest such anchor  │
/// └────────────────────────────────────────────┴──────────────────────┘
///
/// All distances are planar (x, y). Anchors farther than `anchor_reach`
/// are never selected, even when they are the closest ones.

use super::actor::{Actor, AnchorName};
use super::geom::Vec3;
use super::hold::{Hold, HoldColor};

/// Discrete climb direction, one grid unit per move.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MoveDir {
    Up,
    Down,
    Left,
    Right,
}

impl MoveDir {
    pub fn as_str(self) -> &'static str {
        match self {
            MoveDir::Up => "up",
            MoveDir::Down => "down",
            MoveDir::Left => "left",
            MoveDir::Right => "right",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WallVerdict {
    OwnHold,
    ForeignHold(HoldColor),
    Empty,
}

/// Why a move did not happen. Never shown to the player.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Rejection {
    /// The cell holds the other color's hold.
    ForeignHold(HoldColor),
    /// Empty cell and the partner is too far away.
    OutOfReach,
    /// Partner close enough, but none of their anchors is.
    NoAnchor,
    /// Body-hold check with no second actor present.
    NoPartner,
    /// The actor is driven by the remote peer, not by this client.
    RemoteControlled,
}

/// Reach limits for the body-hold fallback.
#[derive(Clone, Copy, Debug)]
pub struct Reach {
    pub partner: f32,
    pub anchor: f32,
}

impl Default for Reach {
    fn default() -> Self {
        Reach { partner: 1.5, anchor: 1.0 }
    }
}

/// Position one unit along `dir`. Down never goes below the wall base.
pub fn candidate_position(from: Vec3, dir: MoveDir) -> Vec3 {
    let mut to = from;
    match dir {
        MoveDir::Up => to.y += 1.0,
        MoveDir::Down => to.y = (to.y - 1.0).max(0.0),
        MoveDir::Left => to.x -= 1.0,
        MoveDir::Right => to.x += 1.0,
    }
    to
}

pub fn wall_verdict(hold: Option<Hold>, mover: HoldColor) -> WallVerdict {
    match hold {
        Some(h) if h.usable_by(mover) => WallVerdict::OwnHold,
        Some(h) => WallVerdict::ForeignHold(h.color),
        None => WallVerdict::Empty,
    }
}

/// Nearest partner anchor within `reach` of `candidate`.
/// Strict `<` keeps the first anchor in scan order on ties.
pub fn nearest_anchor(candidate: Vec3, partner: &Actor, reach: f32) -> Option<(AnchorName, f32)> {
    let mut best: Option<(AnchorName, f32)> = None;
    for (name, pos) in partner.anchors_world() {
        let d = candidate.planar_distance(pos);
        if d > reach {
            continue;
        }
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((name, d)),
        }
    }
    best
}

/// Body-hold decision for an empty candidate cell.
pub fn body_hold_anchor(candidate: Vec3, partner: Option<&Actor>, reach: Reach) -> Result<AnchorName, Rejection> {
    let partner = partner.ok_or(Rejection::NoPartner)?;
    if candidate.planar_distance(partner.position()) > reach.partner {
        return Err(Rejection::OutOfReach);
    }
    nearest_anchor(candidate, partner, reach.anchor)
        .map(|(name, _)| name)
        .ok_or(Rejection::NoAnchor)
}
