use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::ItemId;
use crate::model::round::Choice;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ItemError {
    #[error("{field} cannot be empty")]
    EmptyText { field: &'static str },

    #[error("target word '{target}' does not occur in the sentence")]
    TargetNotInSentence { target: String },

    #[error("invalid gender literal: {0}")]
    InvalidGender(String),

    #[error("invalid language level: {0}")]
    InvalidLevel(String),

    #[error("answer key is inconsistent: correct '{correct}' must be one of two distinct options")]
    InvalidAnswerKey { correct: String },
}

//
// ─── ENUMERATED FIELDS ─────────────────────────────────────────────────────────
//

/// Grammatical gender class of a noun. Exactly two literals are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Masculine,
    Feminine,
}

impl Gender {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Masculine => "masculine",
            Gender::Feminine => "feminine",
        }
    }

    /// Definite article agreeing with this gender.
    #[must_use]
    pub fn article(self) -> Article {
        match self {
            Gender::Masculine => Article::Le,
            Gender::Feminine => Article::La,
        }
    }
}

impl FromStr for Gender {
    type Err = ItemError;

    /// Strict: only the exact lowercase literals are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "masculine" => Ok(Gender::Masculine),
            "feminine" => Ok(Gender::Feminine),
            other => Err(ItemError::InvalidGender(other.to_string())),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Definite article shown as an answer option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Article {
    Le,
    La,
}

impl Article {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Article::Le => "le",
            Article::La => "la",
        }
    }
}

/// Difficulty the learner picked before the game starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl LanguageLevel {
    pub const ALL: [LanguageLevel; 3] = [
        LanguageLevel::Beginner,
        LanguageLevel::Intermediate,
        LanguageLevel::Advanced,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LanguageLevel::Beginner => "beginner",
            LanguageLevel::Intermediate => "intermediate",
            LanguageLevel::Advanced => "advanced",
        }
    }

    /// Short description used when asking a generator for items at this level.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            LanguageLevel::Beginner => "simple words, basic articles",
            LanguageLevel::Intermediate => "common vocabulary, varied structures",
            LanguageLevel::Advanced => "complex words, nuanced grammar",
        }
    }
}

impl FromStr for LanguageLevel {
    type Err = ItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LanguageLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ItemError::InvalidLevel(s.to_string()))
    }
}

impl fmt::Display for LanguageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── ANSWER KEY ────────────────────────────────────────────────────────────────
//

/// Scoring-relevant part shared by every item shape.
///
/// Invariant: `correct` equals exactly one of `left`/`right`, and `left != right`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerKey {
    correct: String,
    left: String,
    right: String,
}

impl AnswerKey {
    /// # Errors
    ///
    /// Returns `ItemError::InvalidAnswerKey` if the options coincide or `correct`
    /// matches neither option.
    pub fn new(
        correct: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Result<Self, ItemError> {
        let correct = correct.into();
        let left = left.into();
        let right = right.into();
        if left == right || (correct != left && correct != right) {
            return Err(ItemError::InvalidAnswerKey { correct });
        }
        Ok(Self {
            correct,
            left,
            right,
        })
    }

    #[must_use]
    pub fn correct(&self) -> &str {
        &self.correct
    }

    #[must_use]
    pub fn left(&self) -> &str {
        &self.left
    }

    #[must_use]
    pub fn right(&self) -> &str {
        &self.right
    }

    /// Option label a choice maps to.
    #[must_use]
    pub fn label_for(&self, choice: Choice) -> &str {
        match choice {
            Choice::Left => &self.left,
            Choice::Right => &self.right,
        }
    }

    #[must_use]
    pub fn is_correct(&self, choice: Choice) -> bool {
        self.label_for(choice) == self.correct
    }

    #[must_use]
    pub fn correct_choice(&self) -> Choice {
        if self.left == self.correct {
            Choice::Left
        } else {
            Choice::Right
        }
    }
}

//
// ─── ITEM ──────────────────────────────────────────────────────────────────────
//

pub const WORD_LEFT: &str = "feminine";
pub const WORD_RIGHT: &str = "masculine";
pub const GRAMMAR_LEFT: &str = "incorrect";
pub const GRAMMAR_RIGHT: &str = "correct";

/// How a round is presented on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundType {
    SentenceCheck,
    WordCheck,
}

impl RoundType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RoundType::SentenceCheck => "sentence_check",
            RoundType::WordCheck => "word_check",
        }
    }
}

/// Shape-specific display payload of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    /// A bare noun; the learner picks its gender.
    Word {
        word: String,
        gender: Gender,
        translation: Option<String>,
    },
    /// A sentence containing a target noun; the learner picks the article.
    SentenceArticle {
        sentence: String,
        target_word: String,
        gender: Gender,
    },
    /// A sentence that may carry a gender agreement error; the learner judges it.
    SentenceGrammar {
        sentence: String,
        target_word: String,
        gender: Gender,
        is_correct: bool,
    },
}

/// Immutable drillable unit with exactly two candidate answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    id: ItemId,
    kind: ItemKind,
    key: AnswerKey,
}

impl Item {
    /// Builds a lexical item.
    ///
    /// # Errors
    ///
    /// Returns `ItemError::EmptyText` if `word` is blank.
    pub fn word(
        id: ItemId,
        word: impl Into<String>,
        gender: Gender,
        translation: Option<String>,
    ) -> Result<Self, ItemError> {
        let word = non_empty(word.into(), "word")?;
        let translation = translation
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let key = AnswerKey::new(gender.as_str(), WORD_LEFT, WORD_RIGHT)?;
        Ok(Self {
            id,
            kind: ItemKind::Word {
                word,
                gender,
                translation,
            },
            key,
        })
    }

    /// Builds a contextual item asking for the target's article.
    ///
    /// # Errors
    ///
    /// Returns `ItemError` if text is blank or the target is not in the sentence.
    pub fn sentence_article(
        id: ItemId,
        sentence: impl Into<String>,
        target_word: impl Into<String>,
        gender: Gender,
    ) -> Result<Self, ItemError> {
        let (sentence, target_word) = sentence_and_target(sentence.into(), target_word.into())?;
        let key = AnswerKey::new(
            gender.article().as_str(),
            Article::La.as_str(),
            Article::Le.as_str(),
        )?;
        Ok(Self {
            id,
            kind: ItemKind::SentenceArticle {
                sentence,
                target_word,
                gender,
            },
            key,
        })
    }

    /// Builds a contextual item asking whether the sentence is grammatical.
    ///
    /// # Errors
    ///
    /// Returns `ItemError` if text is blank or the target is not in the sentence.
    pub fn sentence_grammar(
        id: ItemId,
        sentence: impl Into<String>,
        target_word: impl Into<String>,
        gender: Gender,
        is_correct: bool,
    ) -> Result<Self, ItemError> {
        let (sentence, target_word) = sentence_and_target(sentence.into(), target_word.into())?;
        let correct = if is_correct { GRAMMAR_RIGHT } else { GRAMMAR_LEFT };
        let key = AnswerKey::new(correct, GRAMMAR_LEFT, GRAMMAR_RIGHT)?;
        Ok(Self {
            id,
            kind: ItemKind::SentenceGrammar {
                sentence,
                target_word,
                gender,
                is_correct,
            },
            key,
        })
    }

    /// Same item under a different id; pools renumber items in draw order.
    #[must_use]
    pub fn with_id(mut self, id: ItemId) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    #[must_use]
    pub fn key(&self) -> &AnswerKey {
        &self.key
    }

    #[must_use]
    pub fn round_type(&self) -> RoundType {
        match self.kind {
            ItemKind::Word { .. } => RoundType::WordCheck,
            ItemKind::SentenceArticle { .. } | ItemKind::SentenceGrammar { .. } => {
                RoundType::SentenceCheck
            }
        }
    }

    #[must_use]
    pub fn display_text(&self) -> &str {
        match &self.kind {
            ItemKind::Word { word, .. } => word,
            ItemKind::SentenceArticle { sentence, .. }
            | ItemKind::SentenceGrammar { sentence, .. } => sentence,
        }
    }

    #[must_use]
    pub fn target_word(&self) -> &str {
        match &self.kind {
            ItemKind::Word { word, .. } => word,
            ItemKind::SentenceArticle { target_word, .. }
            | ItemKind::SentenceGrammar { target_word, .. } => target_word,
        }
    }

    #[must_use]
    pub fn gender(&self) -> Gender {
        match &self.kind {
            ItemKind::Word { gender, .. }
            | ItemKind::SentenceArticle { gender, .. }
            | ItemKind::SentenceGrammar { gender, .. } => *gender,
        }
    }

    /// Case-insensitive identity used to drop repeated entries from a pool.
    #[must_use]
    pub fn dedupe_key(&self) -> String {
        self.display_text().trim().to_lowercase()
    }

    /// Deterministic explanation shown when no richer one is available.
    #[must_use]
    pub fn explanation(&self, is_correct: bool) -> String {
        let verdict = if is_correct { "Correct!" } else { "Not quite." };
        let gender = self.gender();
        let article = gender.article().as_str();
        let body = match &self.kind {
            ItemKind::Word {
                word, translation, ..
            } => {
                let mut text = format!("'{word}' is {gender}: {article} {word}.");
                if let Some(translation) = translation {
                    text.push_str(&format!(" It means '{translation}'."));
                }
                text
            }
            ItemKind::SentenceArticle { target_word, .. } => {
                format!("'{target_word}' is {gender}, so the article is '{article}'.")
            }
            ItemKind::SentenceGrammar {
                target_word,
                is_correct: true,
                ..
            } => format!("The sentence is grammatical: '{target_word}' is {gender}."),
            ItemKind::SentenceGrammar { target_word, .. } => format!(
                "The sentence has a gender agreement error: '{target_word}' is {gender} and takes '{article}'."
            ),
        };
        format!("{verdict} {body}")
    }
}

fn non_empty(value: String, field: &'static str) -> Result<String, ItemError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ItemError::EmptyText { field });
    }
    Ok(trimmed.to_string())
}

fn sentence_and_target(sentence: String, target: String) -> Result<(String, String), ItemError> {
    let sentence = non_empty(sentence, "sentence")?;
    let target = non_empty(target, "target word")?;
    if !sentence.to_lowercase().contains(&target.to_lowercase()) {
        return Err(ItemError::TargetNotInSentence { target });
    }
    Ok((sentence, target))
}

//
// ─── SENTENCE CORRUPTION ───────────────────────────────────────────────────────
//

/// Swaps the articles agreeing with `gender` for those of the opposite gender.
///
/// Only whole space-separated tokens are replaced. Returns `None` when the
/// sentence contains no article to swap.
#[must_use]
pub fn corrupt_sentence(sentence: &str, gender: Gender) -> Option<String> {
    let swaps: [(&str, &str); 4] = match gender {
        Gender::Masculine => [("le", "la"), ("Le", "La"), ("un", "une"), ("Un", "Une")],
        Gender::Feminine => [("la", "le"), ("La", "Le"), ("une", "un"), ("Une", "Un")],
    };

    let mut changed = false;
    let corrupted = sentence
        .split(' ')
        .map(|token| {
            match swaps.iter().find(|(from, _)| *from == token) {
                Some((_, to)) => {
                    changed = true;
                    *to
                }
                None => token,
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    changed.then_some(corrupted)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
