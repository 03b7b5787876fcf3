/// Gamepad reader using gilrs: the secondary control surface.
///
/// Emits the same `Control` edges as the keyboard, which the input
/// coordinator routes to `session.touch_player`.
///
/// Default mapping (buttons configurable in `[gamepad]`):
///   D-pad / Left Stick  →  Climb
///   A / Start           →  Interact
///   B / Select          →  Dismiss overlay

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};
#[cfg(feature = "gamepad")]
use tracing::{debug, info};

use crate::config::GamepadConfig;
use crate::domain::rules::MoveDir;
use super::controls::Control;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER" => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// One frame's worth of pad output.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PadFrame {
    pub edges: Vec<(Control, bool)>,
    pub dismiss: bool,
}

/// Action-to-button mapping (loaded from config).
struct ActionMap {
    interact: Vec<Btn>,
    dismiss: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            interact: vec![Btn::A, Btn::Start],
            dismiss: vec![Btn::B, Btn::Select],
        }
    }
}

const DIRS: [MoveDir; 4] = [MoveDir::Up, MoveDir::Down, MoveDir::Left, MoveDir::Right];

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    /// Buttons currently down.
    held: Vec<Btn>,
    /// D-pad held, in `DIRS` order.
    dpad: [bool; 4],
    stick_x: f32,
    stick_y: f32,
    /// Combined D-pad/stick state reported last frame, in `DIRS` order.
    dir_reported: [bool; 4],
    interact_reported: bool,

    action_map: ActionMap,
    pending: PadFrame,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                if has_pad {
                    info!("gamepad detected");
                }
                (Some(g), has_pad)
            }
            Err(e) => {
                debug!("gamepad support unavailable: {e}");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            held: Vec::with_capacity(4),
            dpad: [false; 4],
            stick_x: 0.0,
            stick_y: 0.0,
            dir_reported: [false; 4],
            interact_reported: false,
            action_map: ActionMap::default(),
            pending: PadFrame::default(),
            connected,
        }
    }

    /// Load button mapping from config. Empty or unknown lists keep the defaults.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names.iter().filter_map(|s| Btn::from_name(s)).collect()
        }
        let interact = parse_list(&cfg.interact);
        if !interact.is_empty() {
            self.action_map.interact = interact;
        }
        let dismiss = parse_list(&cfg.dismiss);
        if !dismiss.is_empty() {
            self.action_map.dismiss = dismiss;
        }
    }

    /// Poll the pad and return this frame's edges.
    pub fn update(&mut self) -> PadFrame {
        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
        self.derive_edges();
        std::mem::take(&mut self.pending)
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };
        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => {
                    info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    info!("gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, down: bool) {
        let dpad_slot = match gilrs_btn {
            Button::DPadUp => Some(0),
            Button::DPadDown => Some(1),
            Button::DPadLeft => Some(2),
            Button::DPadRight => Some(3),
            _ => None,
        };
        if let Some(i) = dpad_slot {
            self.dpad[i] = down;
            return;
        }
        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.press_button(btn, down);
        }
    }

    fn press_button(&mut self, btn: Btn, down: bool) {
        if down {
            if !self.held.contains(&btn) {
                self.held.push(btn);
                if self.action_map.dismiss.contains(&btn) {
                    self.pending.dismiss = true;
                }
            }
        } else {
            self.held.retain(|b| *b != btn);
        }
    }

    /// Compare the combined D-pad/stick/interact state with what was last
    /// reported and queue an edge for every change.
    fn derive_edges(&mut self) {
        let stick = [
            self.stick_y > STICK_DEADZONE,
            self.stick_y < -STICK_DEADZONE,
            self.stick_x < -STICK_DEADZONE,
            self.stick_x > STICK_DEADZONE,
        ];
        for (i, dir) in DIRS.iter().enumerate() {
            let now_held = self.dpad[i] || stick[i];
            if now_held != self.dir_reported[i] {
                self.dir_reported[i] = now_held;
                self.pending.edges.push((Control::Move(*dir), now_held));
            }
        }
        let interact = self.action_map.interact.iter().any(|b| self.held.contains(b));
        if interact != self.interact_reported {
            self.interact_reported = interact;
            self.pending.edges.push((Control::Interact, interact));
        }
    }

    fn release_all(&mut self) {
        self.held.clear();
        self.dpad = [false; 4];
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}
