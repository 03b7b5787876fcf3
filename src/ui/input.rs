/// Terminal key reader: turns crossterm events into down/up edges.
///
/// Repeats of a key already held are swallowed, so each physical press
/// yields one `down` edge. Release comes from crossterm's keyboard
/// enhancement when the terminal supports it. Otherwise a key counts as
/// released once no Press/Repeat has arrived for `HOLD_TIMEOUT`.
///
/// Letters are folded to lowercase: `W` and `w` are the same key.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::warn;

/// Without Release events, a key this long silent is considered up.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct KeyTransition {
    pub code: KeyCode,
    pub down: bool,
}

pub struct InputState {
    /// Last Press/Repeat per held key.
    last_active: HashMap<KeyCode, Instant>,

    /// Raw key presses from the latest drain, for host keys (quit, help).
    pub raw_events: Vec<KeyEvent>,

    /// Honor Release events. Only set once keyboard enhancement is on.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Read every pending terminal event without blocking.
    pub fn drain_events(&mut self, now: Instant) -> Vec<KeyTransition> {
        self.raw_events.clear();
        let mut out = Vec::new();

        loop {
            match poll(Duration::ZERO) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    warn!("terminal poll failed: {e}");
                    break;
                }
            }
            match event::read() {
                Ok(Event::Key(key)) => {
                    if key.kind != KeyEventKind::Release {
                        self.raw_events.push(key);
                    }
                    self.apply(key, now, &mut out);
                }
                Ok(_) => {}
                Err(e) => warn!("terminal read failed: {e}"),
            }
        }

        self.expire(now, &mut out);
        out
    }

    /// Fold one key event into the held set, pushing any edge it causes.
    fn apply(&mut self, key: KeyEvent, now: Instant, out: &mut Vec<KeyTransition>) {
        let code = normalize(key.code);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                if self.last_active.remove(&code).is_some() {
                    out.push(KeyTransition { code, down: false });
                }
            }
            KeyEventKind::Release => {}
            _ => {
                if self.last_active.insert(code, now).is_none() {
                    out.push(KeyTransition { code, down: true });
                }
            }
        }
    }

    /// Timeout release for terminals that never report Release.
    fn expire(&mut self, now: Instant, out: &mut Vec<KeyTransition>) {
        let expired: Vec<KeyCode> = self.last_active
            .iter()
            .filter(|(_, t)| now.saturating_duration_since(**t) >= HOLD_TIMEOUT)
            .map(|(c, _)| *c)
            .collect();
        for code in expired {
            self.last_active.remove(&code);
            out.push(KeyTransition { code, down: false });
        }
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.raw_events.iter().any(|k| k.code == code)
    }
}

fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(c: char) -> KeyEvent {
        KeyEvent::new_with_kind(KeyCode::Char(c), KeyModifiers::NONE, KeyEventKind::Press)
    }

    fn release(c: char) -> KeyEvent {
        KeyEvent::new_with_kind(KeyCode::Char(c), KeyModifiers::NONE, KeyEventKind::Release)
    }

    #[test]
    fn repeats_produce_one_down_edge() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        let mut out = Vec::new();
        input.apply(press('w'), t0, &mut out);
        input.apply(press('W'), t0 + Duration::from_millis(30), &mut out);
        assert_eq!(out, vec![KeyTransition { code: KeyCode::Char('w'), down: true }]);
    }

    #[test]
    fn release_event_honored_only_when_enabled() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        let mut out = Vec::new();
        input.apply(press('a'), t0, &mut out);
        input.apply(release('a'), t0, &mut out);
        assert_eq!(out.len(), 1);

        input.honor_release = true;
        input.apply(release('a'), t0, &mut out);
        assert_eq!(out[1], KeyTransition { code: KeyCode::Char('a'), down: false });
    }

    #[test]
    fn silent_key_times_out_to_up() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        let mut out = Vec::new();
        input.apply(press('d'), t0, &mut out);
        input.expire(t0 + Duration::from_millis(100), &mut out);
        assert_eq!(out.len(), 1);
        input.expire(t0 + HOLD_TIMEOUT, &mut out);
        assert_eq!(out[1], KeyTransition { code: KeyCode::Char('d'), down: false });
        // A fresh press after release is a new edge
        input.apply(press('d'), t0 + Duration::from_millis(400), &mut out);
        assert_eq!(out.len(), 3);
    }
}
