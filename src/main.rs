/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags};
use crossterm::{execute, terminal};
use rand::Rng;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use config::{GameConfig, SessionMode};
use domain::actor::PlayerId;
use sim::deck::DeckError;
use sim::engine;
use sim::event::GameEvent;
use sim::peer::{MailboxLink, OfflineLink, PeerError, PeerLink, PeerMessage};
use sim::route;
use sim::session::Session;
use ui::controls::{InputCoordinator, Intent};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::{self, SoundEngine};
use ui::{Overlay, Renderable, SceneView};

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let (config, config_warnings) = GameConfig::load();
    for w in &config_warnings {
        eprintln!("Warning: {w}");
    }
    init_tracing(&config.log_file);
    for w in &config_warnings {
        warn!("{w}");
    }

    let route = route::resolve(&config);
    let mut session = match Session::new(&route, &config) {
        Ok(s) => s,
        Err(e) => {
            error!("route {} is unusable: {e}", route.name);
            eprintln!("Route {} is unusable: {e}", route.name);
            return;
        }
    };
    info!(route = %session.route_name, mode = ?config.session.mode, "session started");

    let mut link = match open_link(&config) {
        Ok(l) => l,
        Err(e) => {
            error!("could not open peer link: {e}");
            eprintln!("Could not open room: {e}");
            return;
        }
    };

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }
    let enhanced = enable_key_release();

    let sound = SoundEngine::new();

    let result = game_loop(&mut session, link.as_mut(), &mut renderer, sound.as_ref(), &config, enhanced);

    if let Err(e) = session.teardown(link.as_mut()) {
        eprintln!("Leaving the room failed: {e}");
    }
    if enhanced {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        error!("game loop failed: {e}");
        eprintln!("Game error: {e}");
    }

    let report = session.deck.progress_report();
    println!();
    println!("Thanks for climbing together!");
    println!("Questions shared: {}/{} (level {})", report.asked_count, report.total, report.level);
}

/// Log to a file: the terminal belongs to the renderer.
fn init_tracing(path: &Path) {
    let file = match File::create(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Logging disabled: cannot create {}: {e}", path.display());
            return;
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .init();
}

fn open_link(config: &GameConfig) -> Result<Box<dyn PeerLink>, PeerError> {
    let s = &config.session;
    if s.mode == SessionMode::Local {
        return Ok(Box::new(OfflineLink));
    }
    let mut rng = rand::thread_rng();
    let link = match &s.room {
        Some(code) => MailboxLink::join_room(&s.mailbox_dir, code, &mut rng)?,
        None => MailboxLink::create_room(&s.mailbox_dir, &mut rng)?,
    };
    Ok(Box::new(link))
}

/// Ask for Release events. Without them, input falls back to hold timeouts.
fn enable_key_release() -> bool {
    match terminal::supports_keyboard_enhancement() {
        Ok(true) => execute!(
            io::stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )
        .is_ok(),
        _ => false,
    }
}

fn game_loop(
    session: &mut Session,
    link: &mut dyn PeerLink,
    renderer: &mut Renderer,
    sfx: Option<&SoundEngine>,
    config: &GameConfig,
    enhanced: bool,
) -> io::Result<()> {
    let mut kb = InputState::new();
    kb.honor_release = enhanced;
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut coordinator = InputCoordinator::new(&config.session, config.timing.move_delay);

    let tick_rate = config.timing.tick_rate;
    let mut last_tick = Instant::now();
    let mut overlay = Overlay::None;
    let mut was_connected = link.is_connected();
    let mut events: Vec<GameEvent> = Vec::new();
    let mut rng = rand::thread_rng();

    loop {
        let now = Instant::now();
        let keys = kb.drain_events(now);
        let pad = gp.update();

        if kb.ctrl_c_pressed() || kb.was_pressed(KeyCode::Esc) {
            break;
        }
        handle_host_keys(session, &kb, pad.dismiss, &mut overlay, now, &mut rng, &mut events);

        let mut intents: Vec<Intent> = keys
            .iter()
            .filter_map(|t| coordinator.on_key(t.code, t.down, now))
            .collect();
        intents.extend(pad.edges.iter().filter_map(|&(c, down)| coordinator.on_touch(c, down, now)));
        for intent in intents {
            dispatch(session, intent, now, &mut events);
        }

        if now.duration_since(last_tick) >= tick_rate {
            let connected = link.is_connected();
            if connected && !was_connected {
                announce_positions(session);
            }
            was_connected = connected;
            sync_peer(session, link, now, &mut events);
            session.effects.prune(now);
            last_tick = now;
        }

        for event in events.drain(..) {
            if let (Some(engine), Some(cue)) = (sfx, sound::cue_for(&event)) {
                engine.play(cue);
            }
            match event {
                GameEvent::QuestionTriggered(q) => {
                    info!(question = q.id(), asker = q.asker.number(), "question shown");
                    overlay = Overlay::None;
                }
                GameEvent::SummitReached => session.notify("Summit reached together!", now),
                _ => {}
            }
        }

        let mut status = link.describe();
        if gp.connected {
            status.push_str(" · gamepad");
        }
        renderer.render(&SceneView { session: &*session, now, overlay, link_status: &status })?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn dispatch(session: &mut Session, intent: Intent, now: Instant, events: &mut Vec<GameEvent>) {
    match intent {
        Intent::Move(mv) => {
            if let Err(DeckError::Exhausted { total }) = engine::request_move(session, mv, now, events) {
                session.notify(format!("All {total} questions shared. F2 starts over."), now);
            }
        }
        Intent::Interact(player) => engine::interact(session, player, now, events),
    }
}

/// F1 help, Tab progress, F2 reset questions, F3 another question from the
/// same category. A pad dismiss closes overlays.
fn handle_host_keys(
    session: &mut Session,
    kb: &InputState,
    dismiss: bool,
    overlay: &mut Overlay,
    now: Instant,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) {
    let toggle = |overlay: &mut Overlay, which: Overlay| {
        *overlay = if *overlay == which { Overlay::None } else { which };
    };
    if kb.was_pressed(KeyCode::F(1)) {
        toggle(overlay, Overlay::Help);
    }
    if kb.was_pressed(KeyCode::Tab) {
        toggle(overlay, Overlay::Progress);
    }
    if kb.was_pressed(KeyCode::F(2)) {
        session.reset_deck();
        session.notify("Questions reset", now);
    }
    if kb.was_pressed(KeyCode::F(3)) {
        if session.mode() == SessionMode::Networked {
            // Partner decks only follow in-order draws
            session.notify("Category swaps are for local play", now);
        } else if let Err(DeckError::Exhausted { total }) = engine::ask_same_category(session, rng, events) {
            session.notify(format!("All {total} questions shared. F2 starts over."), now);
        }
    }
    if dismiss {
        *overlay = Overlay::None;
    }
}

/// Tell a newly joined partner where our climbers already are.
fn announce_positions(session: &mut Session) {
    for id in PlayerId::BOTH {
        if session.controls(id) {
            let msg = PeerMessage::PlayerMove { player_id: id, position: session.actor(id).position() };
            session.queue_message(msg);
        }
    }
}

fn sync_peer(session: &mut Session, link: &mut dyn PeerLink, now: Instant, events: &mut Vec<GameEvent>) {
    for msg in session.drain_outbox() {
        if let Err(e) = link.send_message(&msg) {
            warn!("peer send failed: {e}");
        }
    }
    match link.poll_messages() {
        Ok(inbound) => {
            for msg in &inbound {
                engine::apply_remote(session, msg, now, events);
            }
        }
        Err(e) => warn!("peer poll failed: {e}"),
    }
    if session.mode() == SessionMode::Networked {
        session.set_partner_present(link.is_connected());
    }
}
