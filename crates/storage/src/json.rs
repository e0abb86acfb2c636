use async_trait::async_trait;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use swipe_core::model::{Item, ItemId};

use crate::records::ItemRecord;
use crate::repository::{CorpusRepository, StorageError};

/// Accepted file layouts: a bare array, or `{"words": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CorpusFile {
    List(Vec<ItemRecord>),
    Wrapped { words: Vec<ItemRecord> },
}

/// Corpus stored as a JSON list of item records on disk.
#[derive(Debug, Clone)]
pub struct JsonFileCorpus {
    path: PathBuf,
}

impl JsonFileCorpus {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CorpusRepository for JsonFileCorpus {
    async fn load_items(&self) -> Result<Vec<Item>, StorageError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => StorageError::NotFound(self.path.display().to_string()),
                _ => StorageError::Unavailable(format!("{}: {e}", self.path.display())),
            })?;
        let items = parse_corpus(&text)?;
        debug!(path = %self.path.display(), items = items.len(), "loaded corpus");
        Ok(items)
    }
}

/// Parse a corpus document. Every record must be valid; ids follow file order from 1.
///
/// # Errors
///
/// Returns `StorageError::Serialization` for malformed JSON and
/// `StorageError::InvalidRecord` for the first record failing validation.
pub fn parse_corpus(text: &str) -> Result<Vec<Item>, StorageError> {
    let records = match serde_json::from_str::<CorpusFile>(text)
        .map_err(|e| StorageError::Serialization(e.to_string()))?
    {
        CorpusFile::List(records) | CorpusFile::Wrapped { words: records } => records,
    };

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let id = ItemId::new(u64::try_from(index).unwrap_or(u64::MAX).saturating_add(1));
            record
                .into_item(id)
                .map_err(|source| StorageError::InvalidRecord { index, source })
        })
        .collect()
}
