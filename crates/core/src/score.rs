use crate::model::LanguageLevel;

/// Percentage of correct answers, rounded half up. Zero before any answer.
#[must_use]
pub fn accuracy(score: u32, rounds_completed: u32) -> u32 {
    if rounds_completed == 0 {
        return 0;
    }
    let score = u64::from(score);
    let completed = u64::from(rounds_completed);
    let rounded = (score * 200 + completed) / (completed * 2);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// Read-only view over a session's counters, rebuilt on every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scoreboard {
    pub score: u32,
    pub rounds_completed: u32,
    pub total_rounds: u32,
    pub accuracy: u32,
    pub game_complete: bool,
    pub level: Option<LanguageLevel>,
}

impl Scoreboard {
    #[must_use]
    pub fn new(
        score: u32,
        rounds_completed: u32,
        total_rounds: u32,
        game_complete: bool,
        level: Option<LanguageLevel>,
    ) -> Self {
        Self {
            score,
            rounds_completed,
            total_rounds,
            accuracy: accuracy(score, rounds_completed),
            game_complete,
            level,
        }
    }

    /// Rounds left before the configured game length is reached.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.total_rounds.saturating_sub(self.rounds_completed)
    }
}
