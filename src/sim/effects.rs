/// Cosmetic timers: emotes over a climber's head and limb-swing animations.
///
/// Each effect carries its own expiry. Nothing here is consulted by the
/// move rules, so an effect still playing never delays the next move.

use std::time::{Duration, Instant};

use crate::domain::actor::PlayerId;
use crate::domain::rules::MoveDir;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EmoteKind {
    Heart,
    Question,
    Wave,
}

#[derive(Clone, Copy, Debug)]
struct Emote {
    player: PlayerId,
    kind: EmoteKind,
    until: Instant,
}

#[derive(Clone, Copy, Debug)]
struct ClimbAnim {
    player: PlayerId,
    dir: MoveDir,
    started: Instant,
}

#[derive(Clone, Debug)]
pub struct Effects {
    emotes: Vec<Emote>,
    climbs: Vec<ClimbAnim>,
    emote_for: Duration,
    climb_for: Duration,
}

impl Effects {
    pub fn new(emote_for: Duration, climb_for: Duration) -> Self {
        Effects {
            emotes: Vec::with_capacity(4),
            climbs: Vec::with_capacity(2),
            emote_for,
            climb_for,
        }
    }

    /// Show an emote; a newer one replaces the player's current emote.
    pub fn show_emote(&mut self, player: PlayerId, kind: EmoteKind, now: Instant) {
        self.emotes.retain(|e| e.player != player);
        self.emotes.push(Emote { player, kind, until: now + self.emote_for });
    }

    pub fn start_climb(&mut self, player: PlayerId, dir: MoveDir, now: Instant) {
        self.climbs.retain(|c| c.player != player);
        self.climbs.push(ClimbAnim { player, dir, started: now });
    }

    pub fn emote_of(&self, player: PlayerId, now: Instant) -> Option<EmoteKind> {
        self.emotes
            .iter()
            .find(|e| e.player == player && now < e.until)
            .map(|e| e.kind)
    }

    /// Direction and progress (0.0 → 1.0) of a running climb animation.
    pub fn climb_of(&self, player: PlayerId, now: Instant) -> Option<(MoveDir, f32)> {
        let c = self.climbs.iter().find(|c| c.player == player)?;
        let elapsed = now.saturating_duration_since(c.started);
        if elapsed >= self.climb_for || self.climb_for.is_zero() {
            return None;
        }
        Some((c.dir, elapsed.as_secs_f32() / self.climb_for.as_secs_f32()))
    }

    /// Drop everything that has finished playing.
    pub fn prune(&mut self, now: Instant) {
        self.emotes.retain(|e| now < e.until);
        let climb_for = self.climb_for;
        self.climbs.retain(|c| now.saturating_duration_since(c.started) < climb_for);
    }

    /// Teardown: cancel every pending timer.
    pub fn clear(&mut self) {
        self.emotes.clear();
        self.climbs.clear();
    }

    #[allow(dead_code)]
    pub fn is_idle(&self) -> bool {
        self.emotes.is_empty() && self.climbs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fx() -> Effects {
        Effects::new(Duration::from_millis(2000), Duration::from_millis(400))
    }

    #[test]
    fn emote_expires_after_its_duration() {
        let t0 = Instant::now();
        let mut e = fx();
        e.show_emote(PlayerId::One, EmoteKind::Heart, t0);
        assert_eq!(e.emote_of(PlayerId::One, t0 + Duration::from_millis(1999)), Some(EmoteKind::Heart));
        assert_eq!(e.emote_of(PlayerId::One, t0 + Duration::from_millis(2000)), None);
        e.prune(t0 + Duration::from_millis(2500));
        assert!(e.is_idle());
    }

    #[test]
    fn newer_emote_replaces_older() {
        let t0 = Instant::now();
        let mut e = fx();
        e.show_emote(PlayerId::Two, EmoteKind::Wave, t0);
        e.show_emote(PlayerId::Two, EmoteKind::Question, t0);
        assert_eq!(e.emote_of(PlayerId::Two, t0), Some(EmoteKind::Question));
        assert_eq!(e.emote_of(PlayerId::One, t0), None);
    }

    #[test]
    fn climb_progress_runs_zero_to_one() {
        let t0 = Instant::now();
        let mut e = fx();
        e.start_climb(PlayerId::One, MoveDir::Up, t0);
        let (dir, p) = e.climb_of(PlayerId::One, t0 + Duration::from_millis(200)).unwrap();
        assert_eq!(dir, MoveDir::Up);
        assert!((p - 0.5).abs() < 0.01);
        assert!(e.climb_of(PlayerId::One, t0 + Duration::from_millis(400)).is_none());
    }

    #[test]
    fn clear_cancels_everything() {
        let t0 = Instant::now();
        let mut e = fx();
        e.show_emote(PlayerId::One, EmoteKind::Heart, t0);
        e.start_climb(PlayerId::Two, MoveDir::Left, t0);
        e.clear();
        assert!(e.is_idle());
    }
}
