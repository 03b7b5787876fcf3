/// The cooperation engine: validates local moves and applies peer messages.
///
/// ## `request_move` processing order
///   1. Control check (remote-driven actors take no local intents)
///   2. Candidate cell, one unit along the direction
///   3. Wall check (own hold accepts, foreign hold rejects outright)
///   4. Body-hold check, only for an empty cell
///   5. Commit: position, climb animation, `playerMove` to the outbox
///   6. Grip bookkeeping: release the previous anchor, highlight the new one
///   7. Summit check
///   8. Question trigger, body holds only, gated by the cooldown
///
/// A rejection touches nothing. The only error is `DeckError::Exhausted`
/// from step 8; the move itself has already been committed by then.
///
/// Peer messages bypass validation entirely: a remote position is written
/// as given. Applying the same message twice is a no-op.

use std::time::Instant;

use rand::Rng;
use tracing::{debug, info};

use crate::domain::actor::{AnchorName, BodyHoldUse, PlayerId};
use crate::domain::rules::{self, MoveDir, Rejection, WallVerdict};
use super::deck::DeckError;
use super::effects::EmoteKind;
use super::event::{GameEvent, Grip};
use super::peer::PeerMessage;
use super::session::Session;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MoveIntent {
    pub player: PlayerId,
    pub dir: MoveDir,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveOutcome {
    Accepted(Grip),
    Rejected(Rejection),
}

// ══════════════════════════════════════════════════════════════
// Local moves
// ══════════════════════════════════════════════════════════════

pub fn request_move(
    session: &mut Session,
    intent: MoveIntent,
    now: Instant,
    events: &mut Vec<GameEvent>,
) -> Result<MoveOutcome, DeckError> {
    let grip = match evaluate(session, intent) {
        Ok(grip) => grip,
        Err(why) => {
            debug!(player = intent.player.number(), dir = intent.dir.as_str(), ?why, "move rejected");
            return Ok(MoveOutcome::Rejected(why));
        }
    };

    let player = intent.player;
    let candidate = rules::candidate_position(session.actor(player).position(), intent.dir);

    let mover = session.actor_mut(player);
    mover.set_position(candidate.x, candidate.y, candidate.z);
    let previous = mover.using_body_hold.take();
    session.effects.start_climb(player, intent.dir, now);
    session.queue_message(PeerMessage::PlayerMove { player_id: player, position: candidate });
    debug!(player = player.number(), x = candidate.x, y = candidate.y, ?grip, "move accepted");

    if let Some(prev) = previous {
        release_anchor(session, prev, events);
    }
    if let Grip::BodyHold { partner, anchor } = grip {
        session.actor_mut(partner).highlight_anchor(anchor, true);
        session.actor_mut(player).using_body_hold = Some(BodyHoldUse { partner, anchor });
        events.push(GameEvent::AnchorHighlighted { owner: partner, anchor, on: true });
    }
    events.push(GameEvent::PlayerMoved { player, position: candidate, grip });

    check_summit(session, events);

    if let Grip::BodyHold { partner, anchor } = grip {
        if session.cooldown_elapsed(now) {
            trigger_question(session, player, partner, anchor, now, events)?;
        }
    }

    Ok(MoveOutcome::Accepted(grip))
}

/// The pure decision: which grip supports the move, or why none does.
fn evaluate(session: &Session, intent: MoveIntent) -> Result<Grip, Rejection> {
    if !session.controls(intent.player) {
        return Err(Rejection::RemoteControlled);
    }
    let mover = session.actor(intent.player);
    let candidate = rules::candidate_position(mover.position(), intent.dir);

    match rules::wall_verdict(session.wall.hold_at(candidate.x, candidate.y), mover.color()) {
        WallVerdict::OwnHold => Ok(Grip::WallHold),
        WallVerdict::ForeignHold(color) => Err(Rejection::ForeignHold(color)),
        WallVerdict::Empty => {
            let partner = session.partner_of(intent.player);
            let anchor = rules::body_hold_anchor(candidate, partner, session.reach)?;
            Ok(Grip::BodyHold { partner: intent.player.partner(), anchor })
        }
    }
}

fn release_anchor(session: &mut Session, prev: BodyHoldUse, events: &mut Vec<GameEvent>) {
    session.actor_mut(prev.partner).highlight_anchor(prev.anchor, false);
    events.push(GameEvent::AnchorHighlighted { owner: prev.partner, anchor: prev.anchor, on: false });
}

fn trigger_question(
    session: &mut Session,
    mover: PlayerId,
    partner: PlayerId,
    anchor: AnchorName,
    now: Instant,
    events: &mut Vec<GameEvent>,
) -> Result<(), DeckError> {
    // Restarts on every attempt, exhausted deck included
    session.last_body_hold_at = Some(now);
    let question = session.deck.next_question()?;
    info!(id = question.id(), asker = question.asker.number(), "question triggered");

    session.effects.show_emote(mover, EmoteKind::Heart, now);
    session.effects.show_emote(partner, EmoteKind::Question, now);
    session.queue_message(PeerMessage::BodyHoldInteraction {
        question_id: question.id(),
        anchor_name: anchor,
    });
    session.active_question = Some(question.clone());
    events.push(GameEvent::QuestionTriggered(question));
    Ok(())
}

/// Swap the open question for an unasked one from the same category.
/// Returns `false` when no question is open.
pub fn ask_same_category<R: Rng>(
    session: &mut Session,
    rng: &mut R,
    events: &mut Vec<GameEvent>,
) -> Result<bool, DeckError> {
    let Some(open) = &session.active_question else {
        return Ok(false);
    };
    let category = open.record.category;
    let question = session.deck.question_by_category(category, rng)?;
    info!(id = question.id(), category, "question swapped");
    session.active_question = Some(question.clone());
    events.push(GameEvent::QuestionTriggered(question));
    Ok(true)
}

/// Both climbers at or above the highest hold row. Fires once.
fn check_summit(session: &mut Session, events: &mut Vec<GameEvent>) {
    if session.summit_reached {
        return;
    }
    let Some(top) = session.wall.summit_row() else { return };
    let all_up = PlayerId::BOTH.iter().all(|&p| {
        session.is_present(p) && session.actor(p).position().y >= top as f32
    });
    if all_up {
        session.summit_reached = true;
        info!("summit reached");
        events.push(GameEvent::SummitReached);
    }
}

// ══════════════════════════════════════════════════════════════
// Interact
// ══════════════════════════════════════════════════════════════

/// Dismiss the open question, or wave when nothing is open.
pub fn interact(session: &mut Session, player: PlayerId, now: Instant, events: &mut Vec<GameEvent>) {
    if !session.controls(player) {
        return;
    }
    if let Some(q) = session.active_question.take() {
        debug!(id = q.id(), "question dismissed");
        events.push(GameEvent::QuestionDismissed { id: q.id() });
    } else {
        session.effects.show_emote(player, EmoteKind::Wave, now);
    }
    events.push(GameEvent::Interacted { player });
}

// ══════════════════════════════════════════════════════════════
// Peer messages
// ══════════════════════════════════════════════════════════════

pub fn apply_remote(session: &mut Session, msg: &PeerMessage, now: Instant, events: &mut Vec<GameEvent>) {
    match *msg {
        PeerMessage::PlayerMove { player_id, position } => {
            if session.controls(player_id) {
                return;
            }
            session.set_partner_present(true);
            let actor = session.actor_mut(player_id);
            if actor.position() == position {
                return;
            }
            actor.set_position(position.x, position.y, position.z);
            debug!(player = player_id.number(), x = position.x, y = position.y, "remote move applied");
            events.push(GameEvent::RemoteMoved { player: player_id, position });
            // The partner let go of whatever it was gripping on us
            let local = session.actor_mut(player_id.partner());
            for anchor in AnchorName::ALL {
                if local.is_highlighted(anchor) {
                    events.push(GameEvent::AnchorHighlighted { owner: local.id(), anchor, on: false });
                }
            }
            local.clear_highlights();
            check_summit(session, events);
        }
        PeerMessage::BodyHoldInteraction { question_id, anchor_name } => {
            let local = session.local_player();
            let actor = session.actor_mut(local);
            if !actor.is_highlighted(anchor_name) {
                actor.clear_highlights();
                actor.highlight_anchor(anchor_name, true);
                events.push(GameEvent::AnchorHighlighted { owner: local, anchor: anchor_name, on: true });
            }
            if !session.remote_questions.insert(question_id) {
                return;
            }
            let Some(question) = session.deck.mark_remote(question_id) else {
                debug!(question_id, "unknown remote question id");
                return;
            };
            info!(id = question_id, "remote question triggered");
            session.effects.show_emote(local.partner(), EmoteKind::Heart, now);
            session.effects.show_emote(local, EmoteKind::Question, now);
            session.active_question = Some(question.clone());
            events.push(GameEvent::QuestionTriggered(question));
        }
    }
}
