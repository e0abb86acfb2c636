//! Shared error types for the services crate.

use thiserror::Error;

use storage::StorageError;
use swipe_core::EngineError;
use swipe_core::model::PlayerId;

/// Errors emitted while assembling an item pool.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SupplyError {
    #[error("generation source is not configured")]
    Disabled,
    #[error("generation source timed out")]
    Timeout,
    #[error("generation source unreachable: {0}")]
    Unreachable(String),
    #[error("generation request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("generation source returned an empty response")]
    EmptyResponse,
    #[error("only {produced} valid items, {required} required")]
    Exhausted { produced: usize, required: usize },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SupplyError {
    /// True when the failure came from reaching the generation source rather
    /// than from what it, or the corpus, produced.
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            SupplyError::Disabled
                | SupplyError::Timeout
                | SupplyError::Unreachable(_)
                | SupplyError::HttpStatus(_)
        )
    }
}

impl From<reqwest::Error> for SupplyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SupplyError::Timeout
        } else {
            SupplyError::Unreachable(err.to_string())
        }
    }
}

/// Errors emitted by `GameService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GameError {
    #[error("no game for player {0}")]
    UnknownPlayer(PlayerId),
    #[error("a language level must be selected first")]
    LevelRequired,
    #[error("a newer start-game request replaced this one")]
    Superseded,
    #[error("a game is still being prepared for this player")]
    StartPending,
    #[error("game state unavailable: {0}")]
    StatePoisoned(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Supply(#[from] SupplyError),
}

impl GameError {
    #[must_use]
    pub fn is_stale_answer(&self) -> bool {
        matches!(self, GameError::Engine(EngineError::StaleAnswer { .. }))
    }
}
