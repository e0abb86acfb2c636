use serde::{Deserialize, Serialize};
use thiserror::Error;

use swipe_core::model::{Gender, Item, ItemError, ItemId};

/// Reasons a structurally valid record cannot become an item.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RecordError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` has unsupported value '{value}'")]
    InvalidLiteral { field: &'static str, value: String },

    #[error(transparent)]
    Item(#[from] ItemError),
}

/// Serialized shape of one item, shared by corpus files and generated lines.
///
/// A record with a `sentence` becomes an article question about `target_word`;
/// otherwise it is a bare word. Fields are optional here so that validation,
/// not deserialization, decides what is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence: Option<String>,
    #[serde(default, alias = "target", skip_serializing_if = "Option::is_none")]
    pub target_word: Option<String>,
}

impl ItemRecord {
    #[must_use]
    pub fn word(word: impl Into<String>, gender: Gender) -> Self {
        Self {
            word: Some(word.into()),
            gender: Some(gender.as_str().to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn sentence(sentence: impl Into<String>, target_word: impl Into<String>, gender: Gender) -> Self {
        Self {
            sentence: Some(sentence.into()),
            target_word: Some(target_word.into()),
            gender: Some(gender.as_str().to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_sentence(&self) -> bool {
        self.sentence.is_some()
    }

    /// Validate the record and turn it into a domain `Item`.
    ///
    /// # Errors
    ///
    /// Returns `RecordError` when a required field is absent, the gender is not
    /// one of its two literals, or the item invariants fail.
    pub fn into_item(self, id: ItemId) -> Result<Item, RecordError> {
        let gender = self.gender.ok_or(RecordError::MissingField("gender"))?;
        let gender = gender
            .parse::<Gender>()
            .map_err(|_| RecordError::InvalidLiteral {
                field: "gender",
                value: gender,
            })?;

        match self.sentence {
            Some(sentence) => {
                let target = self
                    .target_word
                    .ok_or(RecordError::MissingField("target_word"))?;
                Ok(Item::sentence_article(id, sentence, target, gender)?)
            }
            None => {
                let word = self.word.ok_or(RecordError::MissingField("word"))?;
                Ok(Item::word(id, word, gender, self.translation)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swipe_core::model::{ItemKind, RoundType};

    #[test]
    fn word_record_becomes_word_item() {
        let item = ItemRecord::word("chambre", Gender::Feminine)
            .into_item(ItemId::new(1))
            .unwrap();
        assert_eq!(item.round_type(), RoundType::WordCheck);
        assert_eq!(item.key().correct(), "feminine");
    }

    #[test]
    fn sentence_record_accepts_target_alias() {
        let record: ItemRecord = serde_json::from_str(
            r#"{"sentence": "La fenêtre est ouverte.", "target": "fenêtre", "gender": "feminine"}"#,
        )
        .unwrap();
        let item = record.into_item(ItemId::new(3)).unwrap();
        assert!(matches!(item.kind(), ItemKind::SentenceArticle { .. }));
        assert_eq!(item.key().correct(), "la");
    }

    #[test]
    fn missing_gender_is_reported() {
        let record: ItemRecord = serde_json::from_str(r#"{"word": "livre"}"#).unwrap();
        assert_eq!(
            record.into_item(ItemId::new(1)).unwrap_err(),
            RecordError::MissingField("gender")
        );
    }

    #[test]
    fn out_of_set_gender_is_rejected() {
        let record: ItemRecord =
            serde_json::from_str(r#"{"word": "livre", "gender": "Masculine"}"#).unwrap();
        assert!(matches!(
            record.into_item(ItemId::new(1)).unwrap_err(),
            RecordError::InvalidLiteral { field: "gender", .. }
        ));
    }

    #[test]
    fn sentence_without_target_is_rejected() {
        let record: ItemRecord =
            serde_json::from_str(r#"{"sentence": "Le chat dort.", "gender": "masculine"}"#)
                .unwrap();
        assert_eq!(
            record.into_item(ItemId::new(1)).unwrap_err(),
            RecordError::MissingField("target_word")
        );
    }

    #[test]
    fn record_serializes_without_empty_fields() {
        let json = serde_json::to_string(&ItemRecord::word("livre", Gender::Masculine)).unwrap();
        assert_eq!(json, r#"{"word":"livre","gender":"masculine"}"#);
    }
}
