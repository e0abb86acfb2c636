use std::sync::Arc;

use services::{
    ChatCompletionsSource, Explainer, GameService, GenerationSource, GeneratedExplainer,
    SupplyError, SupplyPipeline,
};
use storage::{BuiltinSentenceCorpus, JsonFileCorpus};

use crate::config::{ServerConfig, SupplyMode};

/// Shared state behind every handler.
pub struct AppState {
    pub games: GameService,
}

impl AppState {
    #[must_use]
    pub fn new(games: GameService) -> Self {
        Self { games }
    }

    /// Wires the supply mode chosen in `config`. Live mode also enables
    /// generated explanations from the same source.
    ///
    /// # Errors
    ///
    /// Returns `SupplyError` if the HTTP client cannot be built.
    pub fn from_config(config: &ServerConfig) -> Result<Self, SupplyError> {
        let games = match config.supply {
            SupplyMode::Live => {
                let source: Arc<dyn GenerationSource> =
                    Arc::new(ChatCompletionsSource::new(config.generator.clone())?);
                let explainer: Arc<dyn Explainer> =
                    Arc::new(GeneratedExplainer::new(Arc::clone(&source)));
                GameService::new(
                    config.engine,
                    SupplyPipeline::live(source, config.supply_config),
                )
                .with_explainer(explainer)
            }
            SupplyMode::Corpus => GameService::new(
                config.engine,
                SupplyPipeline::corpus(Arc::new(JsonFileCorpus::new(&config.corpus_path))),
            ),
            SupplyMode::Builtin => GameService::new(
                config.engine,
                SupplyPipeline::corpus(Arc::new(BuiltinSentenceCorpus)),
            ),
        };
        Ok(Self::new(games))
    }
}
