/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::actor::PlayerId;
use crate::domain::rules::Reach;
use crate::sim::deck::DeckPolicy;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub rules: RulesConfig,
    pub session: SessionConfig,
    pub gamepad: GamepadConfig,
    pub routes_dir: PathBuf,
    pub route: Option<String>,
    pub log_file: PathBuf,
}

#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub tick_rate: Duration,
    pub move_delay: Duration,
    pub question_cooldown: Duration,
    pub emote: Duration,
    pub climb_anim: Duration,
}

#[derive(Clone, Debug)]
pub struct RulesConfig {
    pub reach: Reach,
    pub deck_policy: DeckPolicy,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// One terminal, two keyboard schemes, both actors local.
    Local,
    /// One local actor; the partner's moves arrive over the peer link.
    Networked,
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub mode: SessionMode,
    pub local_player: PlayerId,
    pub room: Option<String>,
    pub mailbox_dir: PathBuf,
    pub touch_player: PlayerId,
}

impl SessionConfig {
    /// Is this actor driven from this terminal?
    pub fn controls(&self, player: PlayerId) -> bool {
        match self.mode {
            SessionMode::Local => true,
            SessionMode::Networked => player == self.local_player,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub interact: Vec<String>,
    pub dismiss: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config.toml parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid player id in [session]: {0}")]
    Player(String),
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    session: TomlSession,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_move_delay")]
    move_delay_ms: u64,
    #[serde(default = "default_question_cooldown")]
    question_cooldown_ms: u64,
    #[serde(default = "default_emote")]
    emote_ms: u64,
    #[serde(default = "default_climb_anim")]
    climb_anim_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_partner_reach")]
    partner_reach: f32,
    #[serde(default = "default_anchor_reach")]
    anchor_reach: f32,
    #[serde(default = "default_deck_policy")]
    deck_policy: DeckPolicy,
}

#[derive(Deserialize, Debug)]
struct TomlSession {
    #[serde(default = "default_mode")]
    mode: SessionMode,
    #[serde(default = "default_player")]
    local_player: u8,
    #[serde(default)]
    room: String,
    #[serde(default)]
    mailbox_dir: String,
    #[serde(default = "default_player")]
    touch_player: u8,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_interact")]
    interact: Vec<String>,
    #[serde(default = "default_pad_dismiss")]
    dismiss: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_routes_dir")]
    routes_dir: String,
    #[serde(default)]
    route: String,
    #[serde(default = "default_log_file")]
    log_file: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 50 }
fn default_move_delay() -> u64 { 200 }        // deliberate climbing pace
fn default_question_cooldown() -> u64 { 3000 }
fn default_emote() -> u64 { 2000 }
fn default_climb_anim() -> u64 { 400 }
fn default_partner_reach() -> f32 { 1.5 }
fn default_anchor_reach() -> f32 { 1.0 }
fn default_deck_policy() -> DeckPolicy { DeckPolicy::Progressive }
fn default_mode() -> SessionMode { SessionMode::Local }
fn default_player() -> u8 { 1 }
fn default_pad_interact() -> Vec<String> { vec!["A".into(), "Start".into()] }
fn default_pad_dismiss() -> Vec<String> { vec!["B".into(), "Select".into()] }
fn default_routes_dir() -> String { "routes".into() }
fn default_log_file() -> String { "tandemclimb.log".into() }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_rate_ms: default_tick_rate(),
            move_delay_ms: default_move_delay(),
            question_cooldown_ms: default_question_cooldown(),
            emote_ms: default_emote(),
            climb_anim_ms: default_climb_anim(),
        }
    }
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            partner_reach: default_partner_reach(),
            anchor_reach: default_anchor_reach(),
            deck_policy: default_deck_policy(),
        }
    }
}

impl Default for TomlSession {
    fn default() -> Self {
        TomlSession {
            mode: default_mode(),
            local_player: default_player(),
            room: String::new(),
            mailbox_dir: String::new(),
            touch_player: default_player(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            interact: default_pad_interact(),
            dismiss: default_pad_dismiss(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            routes_dir: default_routes_dir(),
            route: String::new(),
            log_file: default_log_file(),
        }
    }
}

// ── Loading ──

impl Default for GameConfig {
    fn default() -> Self {
        let search_dirs = vec![PathBuf::from(".")];
        build(TomlConfig::default(), &search_dirs)
            .unwrap_or_else(|_| unreachable!("default player ids are valid"))
    }
}

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) XDG data home, (4) system data directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    ///
    /// Runs before logging is up, so problems come back as messages for the
    /// caller to report once it can.
    pub fn load() -> (Self, Vec<String>) {
        load_from(&candidate_dirs())
    }

    /// Parse a config document. Paths resolve against the current directory.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        parse_document(text, &[PathBuf::from(".")])
    }
}

fn parse_document(text: &str, search_dirs: &[PathBuf]) -> Result<GameConfig, ConfigError> {
    let toml_cfg: TomlConfig = toml::from_str(text)?;
    build(toml_cfg, search_dirs)
}

fn parse_player(n: u8) -> Result<PlayerId, ConfigError> {
    PlayerId::try_from(n).map_err(ConfigError::Player)
}

fn build(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Result<GameConfig, ConfigError> {
    let t = &toml_cfg.timing;
    let general = &toml_cfg.general;

    // Resolve routes directory the same way levels are found: first hit wins
    let routes_dir = if PathBuf::from(&general.routes_dir).is_absolute() {
        PathBuf::from(&general.routes_dir)
    } else {
        search_dirs.iter()
            .map(|d| d.join(&general.routes_dir))
            .find(|p| p.is_dir())
            .unwrap_or_else(|| PathBuf::from(&general.routes_dir))
    };

    let mailbox_dir = if toml_cfg.session.mailbox_dir.is_empty() {
        std::env::temp_dir().join("tandemclimb")
    } else {
        PathBuf::from(&toml_cfg.session.mailbox_dir)
    };

    let room = toml_cfg.session.room.trim().to_uppercase();

    Ok(GameConfig {
        timing: TimingConfig {
            tick_rate: Duration::from_millis(t.tick_rate_ms),
            move_delay: Duration::from_millis(t.move_delay_ms),
            question_cooldown: Duration::from_millis(t.question_cooldown_ms),
            emote: Duration::from_millis(t.emote_ms),
            climb_anim: Duration::from_millis(t.climb_anim_ms),
        },
        rules: RulesConfig {
            reach: Reach {
                partner: toml_cfg.rules.partner_reach,
                anchor: toml_cfg.rules.anchor_reach,
            },
            deck_policy: toml_cfg.rules.deck_policy,
        },
        session: SessionConfig {
            mode: toml_cfg.session.mode,
            local_player: parse_player(toml_cfg.session.local_player)?,
            room: if room.is_empty() { None } else { Some(room) },
            mailbox_dir,
            touch_player: parse_player(toml_cfg.session.touch_player)?,
        },
        gamepad: GamepadConfig {
            interact: toml_cfg.gamepad.interact,
            dismiss: toml_cfg.gamepad.dismiss,
        },
        routes_dir,
        route: if general.route.is_empty() { None } else { Some(general.route.clone()) },
        log_file: PathBuf::from(&general.log_file),
    })
}

/// Candidate directories to search: exe dir + CWD + data paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/tandemclimb)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/tandemclimb");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory
    let sys = PathBuf::from("/usr/share/tandemclimb");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories. The first readable file
/// wins; a broken one means defaults, not the next directory.
fn load_from(search_dirs: &[PathBuf]) -> (GameConfig, Vec<String>) {
    let mut warnings = Vec::new();
    let defaults = || {
        build(TomlConfig::default(), search_dirs).unwrap_or_else(|_| GameConfig::default())
    };
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => match parse_document(&text, search_dirs) {
                Ok(cfg) => return (cfg, warnings),
                Err(e) => {
                    warnings.push(format!("{}: {e}; using default settings", path.display()));
                    return (defaults(), warnings);
                }
            },
            Err(e) => warnings.push(format!("could not read {}: {e}", path.display())),
        }
    }
    (defaults(), warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.timing.move_delay, Duration::from_millis(200));
        assert_eq!(cfg.timing.question_cooldown, Duration::from_millis(3000));
        assert_eq!(cfg.rules.deck_policy, DeckPolicy::Progressive);
        assert!((cfg.rules.reach.partner - 1.5).abs() < 1e-6);
        assert!((cfg.rules.reach.anchor - 1.0).abs() < 1e-6);
        assert_eq!(cfg.session.mode, SessionMode::Local);
        assert!(cfg.route.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[rules]\ndeck_policy = \"loop\"\n\n[session]\nmode = \"networked\"\nlocal_player = 2\nroom = \"ab12cd\"\n",
        ).unwrap();
        assert_eq!(cfg.rules.deck_policy, DeckPolicy::Loop);
        assert_eq!(cfg.session.mode, SessionMode::Networked);
        assert_eq!(cfg.session.local_player, PlayerId::Two);
        assert_eq!(cfg.session.room.as_deref(), Some("AB12CD"));
        assert_eq!(cfg.timing.move_delay, Duration::from_millis(200));
    }

    #[test]
    fn networked_mode_controls_only_local_player() {
        let cfg = GameConfig::from_toml_str("[session]\nmode = \"networked\"\nlocal_player = 2\n").unwrap();
        assert!(cfg.session.controls(PlayerId::Two));
        assert!(!cfg.session.controls(PlayerId::One));
        let local = GameConfig::from_toml_str("").unwrap();
        assert!(local.session.controls(PlayerId::One) && local.session.controls(PlayerId::Two));
    }

    #[test]
    fn bad_player_id_is_an_error() {
        let r = GameConfig::from_toml_str("[session]\nlocal_player = 3\n");
        assert!(matches!(r, Err(ConfigError::Player(_))));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(matches!(GameConfig::from_toml_str("[timing\n"), Err(ConfigError::Parse(_))));
    }

    fn config_dir(tag: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tandemclimb-config-{}-{}", tag, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), contents).unwrap();
        dir
    }

    #[test]
    fn broken_file_falls_back_with_a_message() {
        let dir = config_dir("broken", "[timing\nmove_delay_ms = 50\n");
        let (cfg, warnings) = load_from(&[dir.clone()]);
        assert_eq!(cfg.timing.move_delay, Duration::from_millis(200));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("config.toml"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn invalid_player_in_file_falls_back_with_a_message() {
        let dir = config_dir("player", "[session]\nlocal_player = 7\n");
        let (cfg, warnings) = load_from(&[dir.clone()]);
        assert_eq!(cfg.session.local_player, PlayerId::One);
        assert_eq!(warnings.len(), 1);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn good_file_loads_quietly() {
        let dir = config_dir("good", "[timing]\nmove_delay_ms = 150\n");
        let (cfg, warnings) = load_from(&[dir.clone()]);
        assert_eq!(cfg.timing.move_delay, Duration::from_millis(150));
        assert!(warnings.is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
