/// Input coordinator: key edges in, move and interact intents out.
///
/// ## Control schemes
/// ┌─────────────┬──────────────┬──────────┐
/// │ Scheme      │ Move         │ Interact │
/// ├─────────────┼──────────────┼──────────┤
/// │ Left hand   │ W A S D      │ Space    │
/// │ Right hand  │ Arrow keys   │ Enter    │
/// └─────────────┴──────────────┴──────────┘
///
/// Local mode binds the left-hand scheme to Player 1 and the right-hand
/// scheme to Player 2. Networked mode binds both schemes to the local
/// player. The touch surface (gamepad) drives `touch_player` in local mode
/// and the local player in networked mode, sharing that player's key state.
///
/// ## Gating
///   - Move: down edge of a key not already held, and at least
///     `move_delay` since that player's last emitted move
///   - Interact: every down edge, never delayed
///   - Up edges always clear the held bit

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use crate::config::{SessionConfig, SessionMode};
use crate::domain::actor::PlayerId;
use crate::domain::rules::MoveDir;
use crate::sim::engine::MoveIntent;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Control {
    Move(MoveDir),
    Interact,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Intent {
    Move(MoveIntent),
    Interact(PlayerId),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Scheme {
    LeftHand,
    RightHand,
}

fn binding(code: KeyCode) -> Option<(Scheme, Control)> {
    let bound = match code {
        KeyCode::Char('w') => (Scheme::LeftHand, Control::Move(MoveDir::Up)),
        KeyCode::Char('s') => (Scheme::LeftHand, Control::Move(MoveDir::Down)),
        KeyCode::Char('a') => (Scheme::LeftHand, Control::Move(MoveDir::Left)),
        KeyCode::Char('d') => (Scheme::LeftHand, Control::Move(MoveDir::Right)),
        KeyCode::Char(' ') => (Scheme::LeftHand, Control::Interact),
        KeyCode::Up => (Scheme::RightHand, Control::Move(MoveDir::Up)),
        KeyCode::Down => (Scheme::RightHand, Control::Move(MoveDir::Down)),
        KeyCode::Left => (Scheme::RightHand, Control::Move(MoveDir::Left)),
        KeyCode::Right => (Scheme::RightHand, Control::Move(MoveDir::Right)),
        KeyCode::Enter => (Scheme::RightHand, Control::Interact),
        _ => return None,
    };
    Some(bound)
}

pub struct InputCoordinator {
    /// Held controls per player, keyed by the surface that pressed them.
    held: [HashSet<(Surface, Control)>; 2],
    last_move: [Option<Instant>; 2],
    move_delay: Duration,
    mode: SessionMode,
    local_player: PlayerId,
    touch_player: PlayerId,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum Surface {
    Keys(KeyCode),
    Touch,
}

impl InputCoordinator {
    pub fn new(session: &SessionConfig, move_delay: Duration) -> Self {
        InputCoordinator {
            held: [HashSet::new(), HashSet::new()],
            last_move: [None, None],
            move_delay,
            mode: session.mode,
            local_player: session.local_player,
            touch_player: session.touch_player,
        }
    }

    /// A keyboard edge. Unbound keys yield nothing.
    pub fn on_key(&mut self, code: KeyCode, down: bool, now: Instant) -> Option<Intent> {
        let (scheme, control) = binding(code)?;
        let player = self.player_for(scheme);
        self.edge(player, Surface::Keys(code), control, down, now)
    }

    /// An edge from the secondary (touch / gamepad) surface.
    pub fn on_touch(&mut self, control: Control, down: bool, now: Instant) -> Option<Intent> {
        let player = match self.mode {
            SessionMode::Networked => self.local_player,
            SessionMode::Local => self.touch_player,
        };
        self.edge(player, Surface::Touch, control, down, now)
    }

    #[allow(dead_code)]
    pub fn is_held(&self, player: PlayerId, control: Control) -> bool {
        self.held[player.index()].iter().any(|(_, c)| *c == control)
    }

    fn player_for(&self, scheme: Scheme) -> PlayerId {
        match (self.mode, scheme) {
            (SessionMode::Networked, _) => self.local_player,
            (SessionMode::Local, Scheme::LeftHand) => PlayerId::One,
            (SessionMode::Local, Scheme::RightHand) => PlayerId::Two,
        }
    }

    fn edge(&mut self, player: PlayerId, surface: Surface, control: Control, down: bool, now: Instant) -> Option<Intent> {
        let held = &mut self.held[player.index()];
        if !down {
            held.remove(&(surface, control));
            return None;
        }
        if !held.insert((surface, control)) {
            return None; // repeat
        }
        match control {
            Control::Interact => Some(Intent::Interact(player)),
            Control::Move(dir) => {
                let slot = &mut self.last_move[player.index()];
                let ready = match *slot {
                    None => true,
                    Some(at) => now.saturating_duration_since(at) >= self.move_delay,
                };
                if !ready {
                    return None;
                }
                *slot = Some(now);
                Some(Intent::Move(MoveIntent { player, dir }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn local() -> InputCoordinator {
        let cfg = GameConfig::default();
        InputCoordinator::new(&cfg.session, cfg.timing.move_delay)
    }

    fn mv(player: PlayerId, dir: MoveDir) -> Option<Intent> {
        Some(Intent::Move(MoveIntent { player, dir }))
    }

    #[test]
    fn schemes_drive_separate_players_in_local_mode() {
        let mut c = local();
        let t0 = Instant::now();
        assert_eq!(c.on_key(KeyCode::Char('w'), true, t0), mv(PlayerId::One, MoveDir::Up));
        assert_eq!(c.on_key(KeyCode::Left, true, t0), mv(PlayerId::Two, MoveDir::Left));
        assert_eq!(c.on_key(KeyCode::Enter, true, t0), Some(Intent::Interact(PlayerId::Two)));
        assert_eq!(c.on_key(KeyCode::Char('x'), true, t0), None);
    }

    #[test]
    fn move_delay_swallows_fast_presses() {
        let mut c = local();
        let t0 = Instant::now();
        assert!(c.on_key(KeyCode::Char('w'), true, t0).is_some());
        c.on_key(KeyCode::Char('w'), false, t0 + Duration::from_millis(50));
        assert_eq!(c.on_key(KeyCode::Char('w'), true, t0 + Duration::from_millis(150)), None);
        c.on_key(KeyCode::Char('w'), false, t0 + Duration::from_millis(160));
        assert_eq!(
            c.on_key(KeyCode::Char('w'), true, t0 + Duration::from_millis(200)),
            mv(PlayerId::One, MoveDir::Up),
        );
    }

    #[test]
    fn delay_is_per_player() {
        let mut c = local();
        let t0 = Instant::now();
        assert!(c.on_key(KeyCode::Char('d'), true, t0).is_some());
        assert!(c.on_key(KeyCode::Right, true, t0 + Duration::from_millis(10)).is_some());
    }

    #[test]
    fn held_key_does_not_repeat() {
        let mut c = local();
        let t0 = Instant::now();
        assert!(c.on_key(KeyCode::Up, true, t0).is_some());
        assert_eq!(c.on_key(KeyCode::Up, true, t0 + Duration::from_millis(500)), None);
        assert!(c.is_held(PlayerId::Two, Control::Move(MoveDir::Up)));
        c.on_key(KeyCode::Up, false, t0 + Duration::from_millis(600));
        assert!(!c.is_held(PlayerId::Two, Control::Move(MoveDir::Up)));
    }

    #[test]
    fn interact_is_never_delayed() {
        let mut c = local();
        let t0 = Instant::now();
        c.on_key(KeyCode::Char('w'), true, t0);
        assert_eq!(c.on_key(KeyCode::Char(' '), true, t0), Some(Intent::Interact(PlayerId::One)));
        c.on_key(KeyCode::Char(' '), false, t0);
        assert_eq!(c.on_key(KeyCode::Char(' '), true, t0), Some(Intent::Interact(PlayerId::One)));
    }

    #[test]
    fn networked_mode_routes_both_schemes_to_local_player() {
        let cfg = GameConfig::from_toml_str("[session]\nmode = \"networked\"\nlocal_player = 2\n").unwrap();
        let mut c = InputCoordinator::new(&cfg.session, cfg.timing.move_delay);
        let t0 = Instant::now();
        assert_eq!(c.on_key(KeyCode::Char('a'), true, t0), mv(PlayerId::Two, MoveDir::Left));
        assert_eq!(c.on_key(KeyCode::Char(' '), true, t0), Some(Intent::Interact(PlayerId::Two)));
    }

    #[test]
    fn touch_shares_player_one_state() {
        let mut c = local();
        let t0 = Instant::now();
        assert_eq!(c.on_touch(Control::Move(MoveDir::Up), true, t0), mv(PlayerId::One, MoveDir::Up));
        // Same player's delay applies to the keyboard too
        assert_eq!(c.on_key(KeyCode::Char('d'), true, t0 + Duration::from_millis(100)), None);
        assert!(c.is_held(PlayerId::One, Control::Move(MoveDir::Up)));
        c.on_touch(Control::Move(MoveDir::Up), false, t0);
        assert!(!c.is_held(PlayerId::One, Control::Move(MoveDir::Up)));
    }

    #[test]
    fn touch_follows_local_player_when_networked() {
        let cfg = GameConfig::from_toml_str("[session]\nmode = \"networked\"\nlocal_player = 2\n").unwrap();
        assert_eq!(cfg.session.touch_player, PlayerId::One);
        let mut c = InputCoordinator::new(&cfg.session, cfg.timing.move_delay);
        let t0 = Instant::now();
        assert_eq!(c.on_touch(Control::Move(MoveDir::Up), true, t0), mv(PlayerId::Two, MoveDir::Up));
        assert_eq!(c.on_touch(Control::Interact, true, t0), Some(Intent::Interact(PlayerId::Two)));
    }
}
