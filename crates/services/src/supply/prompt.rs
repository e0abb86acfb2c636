use std::fmt::Write as _;

use swipe_core::model::{Item, ItemKind, LanguageLevel};

use super::pipeline::SupplyKind;

/// How many items to ask for so that `minimum` survive validation.
#[must_use]
pub fn request_count(minimum: usize, oversample_percent: u32) -> usize {
    let extra = minimum.saturating_mul(oversample_percent as usize) / 100;
    minimum.saturating_add(extra)
}

/// Instruction asking for `count` items, one JSON object per line.
#[must_use]
pub fn item_instruction(kind: SupplyKind, count: usize, level: LanguageLevel) -> String {
    let mut prompt = String::new();
    match kind {
        SupplyKind::Words => {
            let _ = writeln!(
                prompt,
                "Generate exactly {count} common French nouns with their grammatical gender \
                 for a {level} learner ({}).",
                level.description()
            );
            prompt.push_str("Write each noun as a JSON object on its own line, like this:\n");
            prompt.push_str(r#"{"word": "chambre", "gender": "feminine"}"#);
            prompt.push('\n');
            prompt.push_str(r#"{"word": "livre", "gender": "masculine"}"#);
            prompt.push_str("\n\nRules:\n");
            prompt.push_str("- Everyday nouns only, no proper nouns, slang or rare terms\n");
            prompt.push_str("- Mix topics: home, work, school, food, transport, health, street\n");
            prompt.push_str("- Never repeat a noun\n");
        }
        SupplyKind::Sentences => {
            let _ = writeln!(
                prompt,
                "Write exactly {count} short French news-style sentences for a {level} \
                 learner ({}). Each sentence must use one noun with its article le or la.",
                level.description()
            );
            prompt.push_str("Write each sentence as a JSON object on its own line, like this:\n");
            prompt.push_str(
                r#"{"sentence": "La mairie ouvre une bibliothèque.", "target_word": "mairie", "gender": "feminine"}"#,
            );
            prompt.push_str("\n\nRules:\n");
            prompt.push_str("- target_word must appear in the sentence exactly as written\n");
            prompt.push_str("- Never repeat a sentence\n");
        }
    }
    prompt.push_str("- gender must be exactly \"masculine\" or \"feminine\"\n");
    prompt.push_str("- One JSON object per line, no numbering, no commentary, no code fences\n");
    prompt
}

/// Short English explanation request for an answered item.
#[must_use]
pub fn explanation_prompt(item: &Item) -> String {
    match item.kind() {
        ItemKind::Word { word, gender, .. } => format!(
            "Explain in 1-2 sentences why the French word \"{word}\" is {gender}. \
             Mention any grammar rule or ending pattern that helps. Answer in English."
        ),
        ItemKind::SentenceArticle {
            sentence,
            target_word,
            gender,
        } => format!(
            "In the French sentence \"{sentence}\", the noun \"{target_word}\" is {gender} and takes \
             \"{}\". Explain why in 1-2 sentences. Answer in English.",
            gender.article().as_str()
        ),
        ItemKind::SentenceGrammar {
            sentence,
            target_word,
            gender,
            is_correct: false,
        } => format!(
            "This French sentence has a gender agreement error: \"{sentence}\". \
             The word \"{target_word}\" should be {gender}. Explain the error in 1-2 sentences. \
             Answer in English."
        ),
        ItemKind::SentenceGrammar {
            sentence,
            target_word,
            gender,
            ..
        } => format!(
            "This French sentence is grammatically correct: \"{sentence}\". \
             Explain in 1-2 sentences how the {gender} noun \"{target_word}\" agrees with its article. \
             Answer in English."
        ),
    }
}
