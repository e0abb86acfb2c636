mod ids;
mod item;
mod pool;
mod round;

pub use ids::{ItemId, ParseIdError, PlayerId, RoundId};
pub use item::{
    AnswerKey, Article, Gender, GRAMMAR_LEFT, GRAMMAR_RIGHT, Item, ItemError, ItemKind,
    LanguageLevel, RoundType, WORD_LEFT, WORD_RIGHT, corrupt_sentence,
};
pub use pool::Pool;
pub use round::{Answer, Choice, Feedback, Round};
