use std::sync::Arc;

use async_trait::async_trait;

use swipe_core::model::Item;

use crate::error::SupplyError;
use crate::supply::{GenerationSource, explanation_prompt};

/// Produces a richer explanation for an answered item.
#[async_trait]
pub trait Explainer: Send + Sync {
    /// # Errors
    ///
    /// Returns `SupplyError` when no explanation could be produced; callers
    /// keep the item's own explanation in that case.
    async fn explain(&self, item: &Item, is_correct: bool) -> Result<String, SupplyError>;
}

/// Asks a generation source to explain the item, prefixed with the verdict.
#[derive(Clone)]
pub struct GeneratedExplainer {
    source: Arc<dyn GenerationSource>,
}

impl GeneratedExplainer {
    #[must_use]
    pub fn new(source: Arc<dyn GenerationSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Explainer for GeneratedExplainer {
    async fn explain(&self, item: &Item, is_correct: bool) -> Result<String, SupplyError> {
        let text = self.source.generate(&explanation_prompt(item)).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(SupplyError::EmptyResponse);
        }
        let verdict = if is_correct { "Correct!" } else { "Not quite." };
        Ok(format!("{verdict} {text}"))
    }
}
