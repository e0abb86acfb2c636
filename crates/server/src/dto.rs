//! JSON shapes of the HTTP boundary.

use serde::{Deserialize, Serialize};

use services::GameStart;
use swipe_core::Scoreboard;
use swipe_core::model::{Choice, Feedback, LanguageLevel, Round, RoundType};

// ─── REQUESTS ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SelectLevelRequest {
    #[serde(default)]
    pub player_id: Option<String>,
    pub language_level: LanguageLevel,
}

#[derive(Debug, Default, Deserialize)]
pub struct StartGameRequest {
    #[serde(default)]
    pub player_id: Option<String>,
    #[serde(default)]
    pub language_level: Option<LanguageLevel>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub player_id: String,
    pub round_id: String,
    #[serde(alias = "user_choice")]
    pub choice: Choice,
}

#[derive(Debug, Deserialize)]
pub struct PlayerRequest {
    pub player_id: String,
}

// ─── RESPONSES ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsView {
    pub left: String,
    pub right: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundView {
    pub round_id: String,
    pub round_type: RoundType,
    pub display_text: String,
    pub target_word: String,
    pub correct_answer: String,
    pub options: OptionsView,
}

impl From<&Round> for RoundView {
    fn from(round: &Round) -> Self {
        let item = round.item();
        let key = item.key();
        Self {
            round_id: round.id().to_string(),
            round_type: item.round_type(),
            display_text: item.display_text().to_string(),
            target_word: item.target_word().to_string(),
            correct_answer: key.correct().to_string(),
            options: OptionsView {
                left: key.left().to_string(),
                right: key.right().to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackView {
    pub is_correct: bool,
    pub explanation: String,
    pub correct_answer: String,
    pub next_round: Option<RoundView>,
}

impl From<Feedback> for FeedbackView {
    fn from(feedback: Feedback) -> Self {
        Self {
            is_correct: feedback.is_correct,
            explanation: feedback.explanation,
            correct_answer: feedback.correct_answer,
            next_round: feedback.next_round.as_ref().map(RoundView::from),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsView {
    pub score: u32,
    pub rounds_completed: u32,
    pub total_rounds: u32,
    pub accuracy: u32,
    pub game_complete: bool,
    pub language_level: Option<LanguageLevel>,
}

impl From<Scoreboard> for StatsView {
    fn from(board: Scoreboard) -> Self {
        Self {
            score: board.score,
            rounds_completed: board.rounds_completed,
            total_rounds: board.total_rounds,
            accuracy: board.accuracy,
            game_complete: board.game_complete,
            language_level: board.level,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelView {
    pub player_id: String,
    pub stats: StatsView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub player_id: String,
    pub round: RoundView,
    pub stats: StatsView,
}

impl From<GameStart> for GameView {
    fn from(start: GameStart) -> Self {
        Self {
            player_id: start.player_id.to_string(),
            round: RoundView::from(&start.round),
            stats: start.scoreboard.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinueView {
    pub round: Option<RoundView>,
    pub game_complete: bool,
    pub stats: StatsView,
}
