use async_trait::async_trait;

use swipe_core::model::{Gender, Item, ItemId, corrupt_sentence};

use crate::repository::{CorpusRepository, StorageError};

/// Hand-checked headline with the noun the learner is asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FallbackSentence {
    sentence: &'static str,
    target_word: &'static str,
    gender: Gender,
    is_correct: bool,
}

const FALLBACK_SENTENCES: &[FallbackSentence] = &[
    FallbackSentence {
        sentence: "Le président français a donné une conférence de presse.",
        target_word: "président",
        gender: Gender::Masculine,
        is_correct: true,
    },
    FallbackSentence {
        sentence: "La ministre de l'éducation a annoncé de nouvelles réformes.",
        target_word: "ministre",
        gender: Gender::Feminine,
        is_correct: true,
    },
    FallbackSentence {
        sentence: "Le voiture rouge est garée devant la maison.",
        target_word: "voiture",
        gender: Gender::Feminine,
        is_correct: false,
    },
    FallbackSentence {
        sentence: "La mairie ouvre une nouvelle bibliothèque en centre-ville.",
        target_word: "bibliothèque",
        gender: Gender::Feminine,
        is_correct: true,
    },
    FallbackSentence {
        sentence: "Le gouvernement présente un budget pour la santé.",
        target_word: "budget",
        gender: Gender::Masculine,
        is_correct: true,
    },
    FallbackSentence {
        sentence: "Un orage violent a frappé la région ce week-end.",
        target_word: "orage",
        gender: Gender::Masculine,
        is_correct: true,
    },
    FallbackSentence {
        sentence: "La grève des transports continue à Paris.",
        target_word: "grève",
        gender: Gender::Feminine,
        is_correct: true,
    },
    FallbackSentence {
        sentence: "Le festival de musique attire une foule immense.",
        target_word: "festival",
        gender: Gender::Masculine,
        is_correct: true,
    },
    FallbackSentence {
        sentence: "Une étude révèle le rôle des abeilles dans la ville.",
        target_word: "étude",
        gender: Gender::Feminine,
        is_correct: true,
    },
    FallbackSentence {
        sentence: "La musée du Louvre accueille une exposition inédite.",
        target_word: "musée",
        gender: Gender::Masculine,
        is_correct: false,
    },
];

/// Grammar-check corpus built from the fallback headlines.
///
/// Every correct headline appears once as written and once corrupted, so the
/// corpus mixes grammatical and ungrammatical sentences.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSentenceCorpus;

impl BuiltinSentenceCorpus {
    /// # Errors
    ///
    /// Returns `StorageError::InvalidRecord` if a built-in sentence fails validation.
    pub fn items() -> Result<Vec<Item>, StorageError> {
        let mut items = Vec::new();
        for (index, entry) in FALLBACK_SENTENCES.iter().enumerate() {
            let mut push = |sentence: &str, is_correct: bool| {
                let id = ItemId::new(u64::try_from(items.len()).unwrap_or(u64::MAX) + 1);
                Item::sentence_grammar(id, sentence, entry.target_word, entry.gender, is_correct)
                    .map(|item| items.push(item))
                    .map_err(|e| StorageError::InvalidRecord {
                        index,
                        source: e.into(),
                    })
            };
            push(entry.sentence, entry.is_correct)?;
            if entry.is_correct {
                if let Some(corrupted) = corrupt_sentence(entry.sentence, entry.gender) {
                    push(&corrupted, false)?;
                }
            }
        }
        Ok(items)
    }
}

#[async_trait]
impl CorpusRepository for BuiltinSentenceCorpus {
    async fn load_items(&self) -> Result<Vec<Item>, StorageError> {
        Self::items()
    }
}
