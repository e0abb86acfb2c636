#![forbid(unsafe_code)]

pub mod error;
pub mod explain;
pub mod game_service;
pub mod supply;

pub use swipe_core::Clock;

pub use error::{GameError, SupplyError};
pub use explain::{Explainer, GeneratedExplainer};
pub use game_service::{GameService, GameStart};
pub use supply::{
    ChatCompletionsSource, GenerationSource, GeneratorConfig, ParseReport, SupplyConfig,
    SupplyKind, SupplyPipeline,
};
