use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use swipe_core::model::{Item, ItemId};

use crate::records::RecordError;

/// Errors surfaced by corpus adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("corpus not found: {0}")]
    NotFound(String),

    #[error("corpus unavailable: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("record {index} is invalid: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: RecordError,
    },
}

/// Read-only source of pre-validated items.
#[async_trait]
pub trait CorpusRepository: Send + Sync {
    /// Load the whole corpus in its stored order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the corpus cannot be read or holds an invalid record.
    async fn load_items(&self) -> Result<Vec<Item>, StorageError>;
}

/// Simple in-memory corpus for tests and small fixed word lists.
#[derive(Clone, Default)]
pub struct InMemoryCorpus {
    items: Arc<Mutex<Vec<Item>>>,
}

impl InMemoryCorpus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Corpus holding `items`, renumbered from 1 in the given order.
    #[must_use]
    pub fn with_items(items: impl IntoIterator<Item = Item>) -> Self {
        let items = items
            .into_iter()
            .zip(1_u64..)
            .map(|(item, id)| item.with_id(ItemId::new(id)))
            .collect();
        Self {
            items: Arc::new(Mutex::new(items)),
        }
    }

    /// Append an item, assigning it the next id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if the lock is poisoned.
    pub fn push(&self, item: Item) -> Result<ItemId, StorageError> {
        let mut guard = self
            .items
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        let id = ItemId::new(u64::try_from(guard.len()).unwrap_or(u64::MAX).saturating_add(1));
        guard.push(item.with_id(id));
        Ok(id)
    }
}

#[async_trait]
impl CorpusRepository for InMemoryCorpus {
    async fn load_items(&self) -> Result<Vec<Item>, StorageError> {
        let guard = self
            .items
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(guard.clone())
    }
}
