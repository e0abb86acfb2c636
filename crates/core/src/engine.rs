use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

use crate::model::{Answer, Feedback, LanguageLevel, Pool, Round, RoundId};
use crate::score::Scoreboard;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineError {
    /// The answer does not reference the round currently awaiting an answer.
    #[error("answer for round {received} does not match the current round")]
    StaleAnswer {
        expected: Option<RoundId>,
        received: RoundId,
    },

    #[error("cannot {action} while the game is {state}")]
    InvalidTransition {
        action: &'static str,
        state: GameState,
    },

    #[error("the item pool has no items to draw")]
    EmptyPool,

    #[error("total rounds must be > 0")]
    InvalidTotalRounds,
}

//
// ─── CONFIG & STATE ────────────────────────────────────────────────────────────
//

/// Game length and whether a level must be picked before playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub total_rounds: u32,
    pub require_level: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            total_rounds: 10,
            require_level: false,
        }
    }
}

/// Externally visible state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    AwaitingLevelSelection,
    Ready,
    RoundActive,
    FeedbackShown,
    Complete,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GameState::AwaitingLevelSelection => "awaiting level selection",
            GameState::Ready => "ready",
            GameState::RoundActive => "in a round",
            GameState::FeedbackShown => "showing feedback",
            GameState::Complete => "complete",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    AwaitingLevel,
    Ready,
    Active(Round),
    Feedback {
        answered: RoundId,
        next: Option<Round>,
    },
    Complete,
}

/// What a continue action led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Next(Round),
    Complete(Scoreboard),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One player's game: the round state machine plus its counters.
///
/// Counters change only after an answer has been matched to the current round.
/// Timestamps are passed in by the caller so the engine stays clock-free.
#[derive(Clone)]
pub struct Session {
    config: EngineConfig,
    level: Option<LanguageLevel>,
    score: u32,
    rounds_completed: u32,
    pool: Option<Pool>,
    cursor: usize,
    phase: Phase,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Creates a session waiting for a level pick, or ready at the default level.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidTotalRounds` if `config.total_rounds` is zero.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        if config.total_rounds == 0 {
            return Err(EngineError::InvalidTotalRounds);
        }
        let (phase, level) = if config.require_level {
            (Phase::AwaitingLevel, None)
        } else {
            (Phase::Ready, Some(LanguageLevel::default()))
        };
        Ok(Self {
            config,
            level,
            score: 0,
            rounds_completed: 0,
            pool: None,
            cursor: 0,
            phase,
            started_at: None,
            completed_at: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    #[must_use]
    pub fn state(&self) -> GameState {
        match self.phase {
            Phase::AwaitingLevel => GameState::AwaitingLevelSelection,
            Phase::Ready => GameState::Ready,
            Phase::Active(_) => GameState::RoundActive,
            Phase::Feedback { .. } => GameState::FeedbackShown,
            Phase::Complete => GameState::Complete,
        }
    }

    #[must_use]
    pub fn level(&self) -> Option<LanguageLevel> {
        self.level
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn rounds_completed(&self) -> u32 {
        self.rounds_completed
    }

    #[must_use]
    pub fn total_rounds(&self) -> u32 {
        self.config.total_rounds
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.phase, Phase::Complete)
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Round awaiting an answer, if any.
    #[must_use]
    pub fn current_round(&self) -> Option<&Round> {
        match &self.phase {
            Phase::Active(round) => Some(round),
            _ => None,
        }
    }

    /// Aggregated counters, derived on every call.
    #[must_use]
    pub fn scoreboard(&self) -> Scoreboard {
        Scoreboard::new(
            self.score,
            self.rounds_completed,
            self.config.total_rounds,
            self.is_complete(),
            self.level,
        )
    }

    /// Records the learner's level.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidTransition` once a game is under way.
    pub fn select_level(&mut self, level: LanguageLevel) -> Result<(), EngineError> {
        match self.phase {
            Phase::AwaitingLevel | Phase::Ready => {
                self.level = Some(level);
                self.phase = Phase::Ready;
                Ok(())
            }
            _ => Err(self.invalid("select a level")),
        }
    }

    /// Hands the session the pool it will draw rounds from.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidTransition` unless the session is ready.
    pub fn attach_pool(&mut self, pool: Pool) -> Result<(), EngineError> {
        if self.phase != Phase::Ready {
            return Err(self.invalid("attach a pool"));
        }
        self.pool = Some(pool);
        self.cursor = 0;
        Ok(())
    }

    /// Draws the first round.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidTransition` unless ready, and
    /// `EngineError::EmptyPool` if there is nothing to draw.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<&Round, EngineError> {
        if self.phase != Phase::Ready {
            return Err(self.invalid("start a round"));
        }
        let round = self.draw_next().ok_or(EngineError::EmptyPool)?;
        self.started_at = Some(now);
        self.phase = Phase::Active(round);
        self.current_round().ok_or(EngineError::EmptyPool)
    }

    /// Scores an answer against the current round and pre-draws the next one.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::StaleAnswer` without touching any counter when the
    /// answer does not reference the round awaiting an answer.
    pub fn submit(&mut self, answer: Answer) -> Result<Feedback, EngineError> {
        let (is_correct, explanation, correct_answer) = match &self.phase {
            Phase::Active(round) if round.id() == answer.round_id => {
                let item = round.item();
                let is_correct = item.key().is_correct(answer.choice);
                (
                    is_correct,
                    item.explanation(is_correct),
                    item.key().correct().to_string(),
                )
            }
            _ => {
                return Err(EngineError::StaleAnswer {
                    expected: self.current_round().map(Round::id),
                    received: answer.round_id,
                });
            }
        };

        if is_correct {
            self.score += 1;
        }
        self.rounds_completed += 1;

        let next = if self.rounds_completed < self.config.total_rounds {
            self.draw_next()
        } else {
            None
        };
        self.phase = Phase::Feedback {
            answered: answer.round_id,
            next: next.clone(),
        };

        Ok(Feedback {
            is_correct,
            explanation,
            correct_answer,
            next_round: next,
        })
    }

    /// Leaves the feedback screen: to the pre-drawn round, or to completion.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidTransition` unless feedback is showing.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<Advance, EngineError> {
        let Phase::Feedback { next, .. } = &self.phase else {
            return Err(self.invalid("continue"));
        };
        match next.clone() {
            Some(round) => {
                self.phase = Phase::Active(round.clone());
                Ok(Advance::Next(round))
            }
            None => {
                self.phase = Phase::Complete;
                self.completed_at = Some(now);
                Ok(Advance::Complete(self.scoreboard()))
            }
        }
    }

    /// Resets counters after a finished game. The level is kept; a new pool
    /// must be attached before the next start.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidTransition` unless the game is complete.
    pub fn restart(&mut self) -> Result<(), EngineError> {
        if self.phase != Phase::Complete {
            return Err(self.invalid("restart"));
        }
        self.score = 0;
        self.rounds_completed = 0;
        self.pool = None;
        self.cursor = 0;
        self.started_at = None;
        self.completed_at = None;
        self.phase = Phase::Ready;
        Ok(())
    }

    /// Id of the last answered round while its feedback is showing.
    #[must_use]
    pub fn answered_round(&self) -> Option<RoundId> {
        match &self.phase {
            Phase::Feedback { answered, .. } => Some(*answered),
            _ => None,
        }
    }

    fn draw_next(&mut self) -> Option<Round> {
        let item = self.pool.as_ref()?.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(Round::draw(item))
    }

    fn invalid(&self, action: &'static str) -> EngineError {
        EngineError::InvalidTransition {
            action,
            state: self.state(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .field("level", &self.level)
            .field("score", &self.score)
            .field("rounds_completed", &self.rounds_completed)
            .field("total_rounds", &self.config.total_rounds)
            .field("pool_len", &self.pool.as_ref().map(Pool::len))
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Choice, Gender, Item, ItemId};
    use crate::time::fixed_now;

    fn word(id: u64, text: &str, gender: Gender) -> Item {
        Item::word(ItemId::new(id), text, gender, None).unwrap()
    }

    fn pool(len: u64) -> Pool {
        Pool::new(
            (1..=len)
                .map(|id| word(id, &format!("mot{id}"), Gender::Feminine))
                .collect(),
        )
    }

    fn started(total_rounds: u32, pool_len: u64) -> Session {
        let mut session = Session::new(EngineConfig {
            total_rounds,
            require_level: false,
        })
        .unwrap();
        session.attach_pool(pool(pool_len)).unwrap();
        session.start(fixed_now()).unwrap();
        session
    }

    fn answer_current(session: &mut Session, choice: Choice) -> Feedback {
        let round_id = session.current_round().unwrap().id();
        session.submit(Answer::new(round_id, choice)).unwrap()
    }

    #[test]
    fn zero_rounds_is_rejected() {
        let err = Session::new(EngineConfig {
            total_rounds: 0,
            require_level: false,
        })
        .unwrap_err();
        assert_eq!(err, EngineError::InvalidTotalRounds);
    }

    #[test]
    fn level_selection_gates_the_game_when_required() {
        let mut session = Session::new(EngineConfig {
            total_rounds: 3,
            require_level: true,
        })
        .unwrap();
        assert_eq!(session.state(), GameState::AwaitingLevelSelection);
        assert!(session.attach_pool(pool(3)).is_err());

        session.select_level(LanguageLevel::Advanced).unwrap();
        assert_eq!(session.state(), GameState::Ready);
        assert_eq!(session.level(), Some(LanguageLevel::Advanced));
    }

    #[test]
    fn start_without_pool_fails() {
        let mut session = Session::new(EngineConfig::default()).unwrap();
        assert_eq!(session.start(fixed_now()).unwrap_err(), EngineError::EmptyPool);
        assert_eq!(session.state(), GameState::Ready);
    }

    #[test]
    fn correct_answer_scores_and_predraws_next() {
        let mut session = Session::new(EngineConfig::default()).unwrap();
        let items = vec![
            Item::sentence_article(ItemId::new(1), "La chambre est belle.", "chambre", Gender::Feminine)
                .unwrap(),
            word(2, "livre", Gender::Masculine),
        ];
        session.attach_pool(Pool::new(items)).unwrap();
        let round_id = session.start(fixed_now()).unwrap().id();

        let feedback = session.submit(Answer::new(round_id, Choice::Left)).unwrap();
        assert!(feedback.is_correct);
        assert_eq!(feedback.correct_answer, "la");
        let next = feedback.next_round.unwrap();
        assert_eq!(next.item().display_text(), "livre");
        assert_ne!(next.id(), round_id);
        assert_eq!(session.score(), 1);
        assert_eq!(session.rounds_completed(), 1);
        assert_eq!(session.state(), GameState::FeedbackShown);
    }

    #[test]
    fn wrong_answer_counts_round_but_not_score() {
        let mut session = started(5, 5);
        let feedback = answer_current(&mut session, Choice::Right);
        assert!(!feedback.is_correct);
        assert_eq!(feedback.correct_answer, "feminine");
        assert_eq!(session.score(), 0);
        assert_eq!(session.rounds_completed(), 1);
    }

    #[test]
    fn stale_answer_leaves_counters_untouched() {
        let mut session = started(5, 5);
        let current = session.current_round().unwrap().id();
        let stale = RoundId::generate();

        let err = session.submit(Answer::new(stale, Choice::Left)).unwrap_err();
        assert_eq!(
            err,
            EngineError::StaleAnswer {
                expected: Some(current),
                received: stale,
            }
        );
        assert_eq!(session.scoreboard().rounds_completed, 0);
        assert_eq!(session.state(), GameState::RoundActive);
    }

    #[test]
    fn replayed_answer_is_stale() {
        let mut session = started(5, 5);
        let round_id = session.current_round().unwrap().id();
        session.submit(Answer::new(round_id, Choice::Left)).unwrap();

        let err = session.submit(Answer::new(round_id, Choice::Left)).unwrap_err();
        assert!(matches!(err, EngineError::StaleAnswer { expected: None, .. }));
        assert_eq!(session.score(), 1);
        assert_eq!(session.rounds_completed(), 1);
        assert_eq!(session.answered_round(), Some(round_id));
    }

    #[test]
    fn game_completes_at_total_rounds() {
        let mut session = started(2, 5);
        answer_current(&mut session, Choice::Left);
        assert!(matches!(session.advance(fixed_now()).unwrap(), Advance::Next(_)));

        let feedback = answer_current(&mut session, Choice::Right);
        assert!(feedback.next_round.is_none());

        let Advance::Complete(board) = session.advance(fixed_now()).unwrap() else {
            panic!("expected completion");
        };
        assert!(board.game_complete);
        assert_eq!(board.score, 1);
        assert_eq!(board.rounds_completed, 2);
        assert_eq!(board.accuracy, 50);
        assert_eq!(session.completed_at(), Some(fixed_now()));
    }

    #[test]
    fn game_completes_when_pool_runs_out() {
        let mut session = started(10, 1);
        let feedback = answer_current(&mut session, Choice::Left);
        assert!(feedback.next_round.is_none());
        assert!(matches!(session.advance(fixed_now()).unwrap(), Advance::Complete(_)));
        assert!(session.is_complete());
    }

    #[test]
    fn continue_requires_feedback() {
        let mut session = started(3, 3);
        let err = session.advance(fixed_now()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidTransition {
                state: GameState::RoundActive,
                ..
            }
        ));
    }

    #[test]
    fn restart_resets_counters_and_drops_pool() {
        let mut session = started(1, 3);
        session.select_level(LanguageLevel::Beginner).unwrap_err();
        answer_current(&mut session, Choice::Left);
        session.advance(fixed_now()).unwrap();

        session.restart().unwrap();
        let board = session.scoreboard();
        assert_eq!(board.score, 0);
        assert_eq!(board.rounds_completed, 0);
        assert!(!board.game_complete);
        assert_eq!(session.state(), GameState::Ready);
        assert_eq!(session.start(fixed_now()).unwrap_err(), EngineError::EmptyPool);
    }

    #[test]
    fn restart_only_after_completion() {
        let mut session = started(3, 3);
        assert!(session.restart().is_err());
    }

    #[test]
    fn every_valid_answer_advances_by_exactly_one() {
        let mut session = started(6, 6);
        for step in 0..6_u32 {
            let before = session.scoreboard();
            let choice = if step % 2 == 0 { Choice::Left } else { Choice::Right };
            answer_current(&mut session, choice);
            let after = session.scoreboard();
            assert_eq!(after.rounds_completed, before.rounds_completed + 1);
            assert!(after.score - before.score <= 1);
            assert_eq!(
                after.accuracy,
                crate::score::accuracy(after.score, after.rounds_completed)
            );
            session.advance(fixed_now()).unwrap();
        }
        assert!(session.is_complete());
    }
}
