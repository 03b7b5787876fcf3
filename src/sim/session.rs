/// Session: everything one climb owns, passed explicitly to the engine.
///
/// ## Ownership
///   - `wall`     built once from the route, never mutated afterwards
///   - `actors`   one per player, indexed by `PlayerId::index()`
///   - `deck`     cursor + asked set; survives until `reset_deck`
///   - `effects`  cosmetic timers, cleared on teardown
///   - `outbox`   peer messages produced by local moves, drained each tick
///
/// ## Control
///
/// `SessionConfig::controls` decides which actors take keyboard intents.
/// In networked mode the partner actor only moves through `apply_remote`,
/// and it counts as absent for body holds until the link reports a
/// partner (`set_partner_present`).

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::config::{GameConfig, SessionConfig, SessionMode};
use crate::domain::actor::{Actor, PlayerId};
use crate::domain::geom::Vec3;
use crate::domain::question::DrawnQuestion;
use crate::domain::rules::Reach;
use super::deck::QuestionDeck;
use super::effects::Effects;
use super::peer::{PeerError, PeerLink, PeerMessage};
use super::route::RouteDef;
use super::wall::{Wall, WallError};

pub struct Session {
    pub route_name: String,
    pub wall: Wall,
    actors: [Actor; 2],
    pub deck: QuestionDeck,
    pub effects: Effects,
    pub reach: Reach,
    control: SessionConfig,
    question_cooldown: Duration,
    pub(crate) last_body_hold_at: Option<Instant>,
    partner_present: bool,
    outbox: Vec<PeerMessage>,
    pub(crate) remote_questions: HashSet<u8>,
    pub active_question: Option<DrawnQuestion>,
    pub summit_reached: bool,
    notice: Option<(String, Instant)>,
}

const NOTICE_FOR: Duration = Duration::from_millis(3000);

impl Session {
    pub fn new(route: &RouteDef, config: &GameConfig) -> Result<Self, WallError> {
        let wall = route.build_wall()?;
        let mut session = Session::from_parts(wall, route.spawns, config);
        session.route_name = route.name.clone();
        Ok(session)
    }

    pub fn from_parts(wall: Wall, spawns: [Vec3; 2], config: &GameConfig) -> Self {
        let actors = [
            Actor::new(PlayerId::One, spawns[0]),
            Actor::new(PlayerId::Two, spawns[1]),
        ];
        Session {
            route_name: String::new(),
            wall,
            actors,
            deck: QuestionDeck::new(config.rules.deck_policy),
            effects: Effects::new(config.timing.emote, config.timing.climb_anim),
            reach: config.rules.reach,
            control: config.session.clone(),
            question_cooldown: config.timing.question_cooldown,
            last_body_hold_at: None,
            partner_present: config.session.mode == SessionMode::Local,
            outbox: Vec::new(),
            remote_questions: HashSet::new(),
            active_question: None,
            summit_reached: false,
            notice: None,
        }
    }

    // ── Actors ──

    pub fn actor(&self, id: PlayerId) -> &Actor {
        &self.actors[id.index()]
    }

    pub fn actor_mut(&mut self, id: PlayerId) -> &mut Actor {
        &mut self.actors[id.index()]
    }

    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter().filter(move |a| self.is_present(a.id()))
    }

    /// The other climber, if it is on the wall.
    pub fn partner_of(&self, id: PlayerId) -> Option<&Actor> {
        let partner = id.partner();
        self.is_present(partner).then(|| self.actor(partner))
    }

    pub fn is_present(&self, id: PlayerId) -> bool {
        self.control.controls(id) || self.partner_present
    }

    pub fn set_partner_present(&mut self, present: bool) {
        if present != self.partner_present {
            info!(present, "partner presence changed");
            self.partner_present = present;
        }
    }

    // ── Control ──

    pub fn controls(&self, id: PlayerId) -> bool {
        self.control.controls(id)
    }

    pub fn mode(&self) -> SessionMode {
        self.control.mode
    }

    /// The actor whose body a remote climber grips.
    pub fn local_player(&self) -> PlayerId {
        self.control.local_player
    }

    // ── Question cooldown ──

    /// True when no body-hold question fired within the cooldown window.
    pub fn cooldown_elapsed(&self, now: Instant) -> bool {
        match self.last_body_hold_at {
            None => true,
            Some(at) => now.saturating_duration_since(at) > self.question_cooldown,
        }
    }

    pub fn reset_deck(&mut self) {
        self.deck.reset();
        self.remote_questions.clear();
        self.active_question = None;
        info!("question deck reset");
    }

    // ── Peer outbox ──

    pub(crate) fn queue_message(&mut self, msg: PeerMessage) {
        self.outbox.push(msg);
    }

    pub fn drain_outbox(&mut self) -> Vec<PeerMessage> {
        std::mem::take(&mut self.outbox)
    }

    // ── Status notice ──

    pub fn notify(&mut self, text: impl Into<String>, now: Instant) {
        self.notice = Some((text.into(), now + NOTICE_FOR));
    }

    pub fn notice(&self, now: Instant) -> Option<&str> {
        match &self.notice {
            Some((text, until)) if now < *until => Some(text.as_str()),
            _ => None,
        }
    }

    // ── Teardown ──

    /// Stop the peer link and cancel every pending timer.
    pub fn teardown(&mut self, link: &mut dyn PeerLink) -> Result<(), PeerError> {
        self.effects.clear();
        self.outbox.clear();
        self.notice = None;
        let result = link.disconnect();
        if let Err(e) = &result {
            warn!("peer disconnect failed: {e}");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::peer::OfflineLink;
    use crate::sim::route;
    use crate::sim::effects::EmoteKind;

    fn networked(local: u8) -> GameConfig {
        GameConfig::from_toml_str(&format!("[session]\nmode = \"networked\"\nlocal_player = {local}\n")).unwrap()
    }

    #[test]
    fn builds_from_builtin_route() {
        let s = Session::new(&route::builtin(), &GameConfig::default()).unwrap();
        assert_eq!(s.route_name, "Tandem Wall");
        assert_eq!(s.actor(PlayerId::One).position(), Vec3::new(-2.0, 2.0, 0.0));
        assert_eq!(s.actor(PlayerId::Two).position(), Vec3::new(2.0, 2.0, 0.0));
        assert_eq!(s.actors().count(), 2);
        assert!(s.partner_of(PlayerId::One).is_some());
    }

    #[test]
    fn networked_partner_absent_until_link_connects() {
        let mut s = Session::new(&route::builtin(), &networked(2)).unwrap();
        assert!(s.partner_of(PlayerId::Two).is_none());
        assert_eq!(s.actors().count(), 1);
        s.set_partner_present(true);
        assert_eq!(s.partner_of(PlayerId::Two).map(|a| a.id()), Some(PlayerId::One));
        assert!(!s.controls(PlayerId::One));
    }

    #[test]
    fn cooldown_is_strictly_longer_than_window() {
        let mut s = Session::new(&route::builtin(), &GameConfig::default()).unwrap();
        let t0 = Instant::now();
        assert!(s.cooldown_elapsed(t0));
        s.last_body_hold_at = Some(t0);
        assert!(!s.cooldown_elapsed(t0 + Duration::from_millis(3000)));
        assert!(s.cooldown_elapsed(t0 + Duration::from_millis(3001)));
    }

    #[test]
    fn teardown_clears_timers_and_outbox() {
        let mut s = Session::new(&route::builtin(), &GameConfig::default()).unwrap();
        let now = Instant::now();
        s.effects.show_emote(PlayerId::One, EmoteKind::Wave, now);
        s.queue_message(PeerMessage::PlayerMove { player_id: PlayerId::One, position: Vec3::ZERO });
        s.teardown(&mut OfflineLink).unwrap();
        assert!(s.effects.is_idle());
        assert!(s.drain_outbox().is_empty());
    }

    #[test]
    fn notice_expires() {
        let mut s = Session::new(&route::builtin(), &GameConfig::default()).unwrap();
        let t0 = Instant::now();
        s.notify("hello", t0);
        assert_eq!(s.notice(t0), Some("hello"));
        assert_eq!(s.notice(t0 + NOTICE_FOR), None);
    }
}
