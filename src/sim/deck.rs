/// The question deck: a fixed order of 36 records plus a draw cursor.
///
/// ## Session state
///   - `draw_index`    next position in the fixed order
///   - `asked`         ids handed out so far (only grows until `reset`)
///   - `current_asker` who reads the next question; flips on every draw
///
/// ## Policies
///   - `Progressive`: the order is walked once. Drawing past the end is
///     `DeckError::Exhausted` and changes nothing.
///   - `Loop`: the cursor wraps to 0 when the order runs out.

use std::collections::HashSet;

use rand::Rng;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::actor::PlayerId;
use crate::domain::question::{DrawnQuestion, QuestionRecord, QUESTIONS};

/// Questions per intimacy level.
const LEVEL_SIZE: usize = 12;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeckPolicy {
    Progressive,
    Loop,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeckError {
    #[error("all {total} questions have been asked")]
    Exhausted { total: usize },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ProgressReport {
    pub asked_count: usize,
    pub total: usize,
    pub level: usize,
    pub percentage: u32,
}

#[derive(Clone, Debug)]
pub struct QuestionDeck {
    questions: &'static [QuestionRecord],
    policy: DeckPolicy,
    draw_index: usize,
    asked: HashSet<u8>,
    current_asker: PlayerId,
}

impl QuestionDeck {
    pub fn new(policy: DeckPolicy) -> Self {
        Self::with_questions(&QUESTIONS, policy)
    }

    pub fn with_questions(questions: &'static [QuestionRecord], policy: DeckPolicy) -> Self {
        QuestionDeck {
            questions,
            policy,
            draw_index: 0,
            asked: HashSet::with_capacity(questions.len()),
            current_asker: PlayerId::One,
        }
    }

    pub fn policy(&self) -> DeckPolicy {
        self.policy
    }

    pub fn draw_index(&self) -> usize {
        self.draw_index
    }

    pub fn current_asker(&self) -> PlayerId {
        self.current_asker
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn is_asked(&self, id: u8) -> bool {
        self.asked.contains(&id)
    }

    /// Draw the record under the cursor and advance.
    pub fn next_question(&mut self) -> Result<DrawnQuestion, DeckError> {
        if self.draw_index >= self.questions.len() {
            match self.policy {
                DeckPolicy::Loop if !self.questions.is_empty() => self.draw_index = 0,
                _ => {
                    warn!(total = self.questions.len(), "question deck exhausted");
                    return Err(DeckError::Exhausted { total: self.questions.len() });
                }
            }
        }
        let record = &self.questions[self.draw_index];
        self.draw_index += 1;
        Ok(self.stamp(record))
    }

    /// Random unasked question from `category` (case-insensitive).
    /// Falls back to the next question in order when the category is used up.
    pub fn question_by_category<R: Rng>(&mut self, category: &str, rng: &mut R) -> Result<DrawnQuestion, DeckError> {
        let open: Vec<&'static QuestionRecord> = self.questions
            .iter()
            .filter(|q| q.category.eq_ignore_ascii_case(category) && !self.asked.contains(&q.id))
            .collect();
        if open.is_empty() {
            return self.next_question();
        }
        let record = open[rng.gen_range(0..open.len())];
        Ok(self.stamp(record))
    }

    /// Apply a draw the partner made. Safe to repeat: the id set and the
    /// cursor only move forward, and the asker is derived from the cursor.
    pub fn mark_remote(&mut self, id: u8) -> Option<DrawnQuestion> {
        let pos = self.questions.iter().position(|q| q.id == id)?;
        self.asked.insert(id);
        if pos + 1 > self.draw_index {
            self.draw_index = pos + 1;
            self.current_asker = asker_for_draw(self.draw_index);
        }
        Some(DrawnQuestion::new(&self.questions[pos], asker_for_draw(pos)))
    }

    pub fn progress_report(&self) -> ProgressReport {
        let asked_count = self.asked.len();
        let total = self.questions.len();
        let percentage = if total == 0 {
            0
        } else {
            ((asked_count as f64 / total as f64) * 100.0).round() as u32
        };
        ProgressReport {
            asked_count,
            total,
            level: asked_count / LEVEL_SIZE + 1,
            percentage,
        }
    }

    pub fn reset(&mut self) {
        self.draw_index = 0;
        self.asked.clear();
        self.current_asker = PlayerId::One;
        debug!("question deck reset");
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&'static str> {
        let mut seen: Vec<&'static str> = Vec::new();
        for q in self.questions {
            if !seen.contains(&q.category) {
                seen.push(q.category);
            }
        }
        seen
    }

    pub fn questions_in_category(&self, category: &str) -> Vec<&'static QuestionRecord> {
        self.questions
            .iter()
            .filter(|q| q.category.eq_ignore_ascii_case(category))
            .collect()
    }

    fn stamp(&mut self, record: &'static QuestionRecord) -> DrawnQuestion {
        self.asked.insert(record.id);
        let drawn = DrawnQuestion::new(record, self.current_asker);
        self.current_asker = self.current_asker.partner();
        debug!(id = record.id, asker = drawn.asker.number(), "question drawn");
        drawn
    }
}

/// Asker of the draw at 0-based position `n` when draws start with Player 1.
fn asker_for_draw(n: usize) -> PlayerId {
    if n % 2 == 0 { PlayerId::One } else { PlayerId::Two }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn draws_walk_the_fixed_order() {
        let mut deck = QuestionDeck::new(DeckPolicy::Progressive);
        let a = deck.next_question().unwrap();
        let b = deck.next_question().unwrap();
        assert_eq!((a.id(), b.id()), (1, 2));
        assert_eq!(deck.draw_index(), 2);
        assert!(deck.is_asked(1) && deck.is_asked(2));
    }

    #[test]
    fn asker_alternates_with_draw_parity() {
        let mut deck = QuestionDeck::new(DeckPolicy::Progressive);
        assert_eq!(deck.current_asker(), PlayerId::One);
        for n in 1..=7 {
            let q = deck.next_question().unwrap();
            let expected_stamp = if n % 2 == 1 { PlayerId::One } else { PlayerId::Two };
            assert_eq!(q.asker, expected_stamp);
            let expected_next = if n % 2 == 0 { PlayerId::One } else { PlayerId::Two };
            assert_eq!(deck.current_asker(), expected_next);
        }
    }

    #[test]
    fn full_pass_then_exhausted() {
        let mut deck = QuestionDeck::new(DeckPolicy::Progressive);
        deck.next_question().unwrap();
        deck.reset();
        for _ in 0..36 {
            deck.next_question().unwrap();
        }
        assert_eq!(deck.progress_report().asked_count, 36);
        let asker_before = deck.current_asker();
        assert_eq!(deck.next_question(), Err(DeckError::Exhausted { total: 36 }));
        // A failed draw changes nothing
        assert_eq!(deck.draw_index(), 36);
        assert_eq!(deck.current_asker(), asker_before);
    }

    #[test]
    fn loop_policy_wraps_to_first() {
        let mut deck = QuestionDeck::new(DeckPolicy::Loop);
        for _ in 0..36 {
            deck.next_question().unwrap();
        }
        let again = deck.next_question().unwrap();
        assert_eq!(again.id(), 1);
        assert_eq!(deck.draw_index(), 1);
        assert_eq!(deck.progress_report().asked_count, 36);
    }

    #[test]
    fn level_boundaries() {
        let mut deck = QuestionDeck::new(DeckPolicy::Progressive);
        let mut levels = vec![deck.progress_report().level];
        for _ in 0..36 {
            deck.next_question().unwrap();
            levels.push(deck.progress_report().level);
        }
        assert_eq!(levels[0], 1);
        assert_eq!(levels[11], 1);
        assert_eq!(levels[12], 2);
        assert_eq!(levels[23], 2);
        assert_eq!(levels[24], 3);
        assert_eq!(levels[35], 3);
        assert_eq!(levels[36], 4);
    }

    #[test]
    fn percentage_rounds() {
        let mut deck = QuestionDeck::new(DeckPolicy::Progressive);
        deck.next_question().unwrap();
        assert_eq!(deck.progress_report().percentage, 3); // 2.77…
        for _ in 0..17 {
            deck.next_question().unwrap();
        }
        assert_eq!(deck.progress_report().percentage, 50);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut deck = QuestionDeck::new(DeckPolicy::Progressive);
        for _ in 0..5 {
            deck.next_question().unwrap();
        }
        deck.reset();
        assert_eq!(deck.draw_index(), 0);
        assert_eq!(deck.current_asker(), PlayerId::One);
        assert_eq!(deck.progress_report().asked_count, 0);
        assert_eq!(deck.next_question().unwrap().id(), 1);
    }

    #[test]
    fn mark_remote_is_idempotent() {
        let mut deck = QuestionDeck::new(DeckPolicy::Progressive);
        let q = deck.mark_remote(3).unwrap();
        assert_eq!(q.id(), 3);
        assert_eq!(q.asker, PlayerId::One); // third draw of the order
        assert_eq!(deck.draw_index(), 3);
        assert_eq!(deck.current_asker(), PlayerId::Two);

        deck.mark_remote(3).unwrap();
        assert_eq!(deck.draw_index(), 3);
        assert_eq!(deck.current_asker(), PlayerId::Two);
        assert_eq!(deck.progress_report().asked_count, 1);

        // An older id never moves the cursor back
        deck.mark_remote(1).unwrap();
        assert_eq!(deck.draw_index(), 3);
        assert!(deck.mark_remote(99).is_none());
    }

    #[test]
    fn category_draw_prefers_unasked_then_falls_back() {
        let mut deck = QuestionDeck::new(DeckPolicy::Progressive);
        let mut rng = StdRng::seed_from_u64(7);
        let in_cat = deck.questions_in_category("memory").len();
        assert_eq!(in_cat, 2);
        let a = deck.question_by_category("Memory", &mut rng).unwrap();
        let b = deck.question_by_category("MEMORY", &mut rng).unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.record.category, "Memory");
        // Category used up: next in order
        let c = deck.question_by_category("memory", &mut rng).unwrap();
        assert_eq!(c.id(), 1);
    }

    #[test]
    fn categories_in_first_seen_order() {
        let deck = QuestionDeck::new(DeckPolicy::Progressive);
        let cats = deck.categories();
        assert_eq!(cats[0], "Getting to Know You");
        assert_eq!(cats[1], "Imagination");
        assert!(cats.contains(&"Vulnerability"));
        assert_eq!(cats.iter().filter(|c| **c == "Family").count(), 1);
    }
}
