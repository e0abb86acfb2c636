use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::ids::RoundId;
use crate::model::item::Item;

/// Left/right decision made by the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Left,
    Right,
}

impl Choice {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Choice::Left => "left",
            Choice::Right => "right",
        }
    }

    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Choice::Left => Choice::Right,
            Choice::Right => Choice::Left,
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Choice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "left" => Ok(Choice::Left),
            "right" => Ok(Choice::Right),
            other => Err(format!("invalid choice: {other}")),
        }
    }
}

/// One presentation of an item, consumed by exactly one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    id: RoundId,
    item: Item,
}

impl Round {
    /// Draws a round for `item` under a freshly minted id.
    #[must_use]
    pub fn draw(item: Item) -> Self {
        Self {
            id: RoundId::generate(),
            item,
        }
    }

    #[must_use]
    pub fn id(&self) -> RoundId {
        self.id
    }

    #[must_use]
    pub fn item(&self) -> &Item {
        &self.item
    }
}

/// A learner's submission against a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answer {
    pub round_id: RoundId,
    pub choice: Choice,
}

impl Answer {
    #[must_use]
    pub fn new(round_id: RoundId, choice: Choice) -> Self {
        Self { round_id, choice }
    }
}

/// Outcome of an answer. `next_round` is `None` when the game is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub is_correct: bool,
    pub explanation: String,
    pub correct_answer: String,
    pub next_round: Option<Round>,
}
