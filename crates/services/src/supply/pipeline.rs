use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::info;

use storage::CorpusRepository;
use swipe_core::model::{Item, LanguageLevel, Pool};

use crate::error::SupplyError;

use super::parse::parse_lines;
use super::prompt::{item_instruction, request_count};
use super::source::GenerationSource;

/// Which item shape a generation source is asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SupplyKind {
    #[default]
    Words,
    Sentences,
}

impl SupplyKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SupplyKind::Words => "words",
            SupplyKind::Sentences => "sentences",
        }
    }
}

impl fmt::Display for SupplyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SupplyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "words" | "word" => Ok(SupplyKind::Words),
            "sentences" | "sentence" => Ok(SupplyKind::Sentences),
            other => Err(format!("unknown item kind '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupplyConfig {
    pub item_kind: SupplyKind,
    /// Extra items requested on top of the minimum, in percent.
    pub oversample_percent: u32,
}

impl Default for SupplyConfig {
    fn default() -> Self {
        Self {
            item_kind: SupplyKind::Words,
            oversample_percent: 50,
        }
    }
}

#[derive(Clone)]
enum Mode {
    Live(Arc<dyn GenerationSource>),
    Corpus(Arc<dyn CorpusRepository>),
}

/// Produces validated pools from a generation source or a static corpus.
#[derive(Clone)]
pub struct SupplyPipeline {
    mode: Mode,
    config: SupplyConfig,
}

impl SupplyPipeline {
    #[must_use]
    pub fn live(source: Arc<dyn GenerationSource>, config: SupplyConfig) -> Self {
        Self {
            mode: Mode::Live(source),
            config,
        }
    }

    #[must_use]
    pub fn corpus(repository: Arc<dyn CorpusRepository>) -> Self {
        Self {
            mode: Mode::Corpus(repository),
            config: SupplyConfig::default(),
        }
    }

    /// Returns a pool of exactly `minimum` valid, distinct items.
    ///
    /// # Errors
    ///
    /// Returns `SupplyError::Exhausted` when fewer than `minimum` items survive,
    /// or the source/corpus error when nothing could be fetched.
    pub async fn request_pool(
        &self,
        minimum: usize,
        level: LanguageLevel,
    ) -> Result<Pool, SupplyError> {
        let items = match &self.mode {
            Mode::Live(source) => self.generate(source.as_ref(), minimum, level).await?,
            Mode::Corpus(repository) => {
                let items = repository.load_items().await?;
                shuffle_corpus(items, minimum)?
            }
        };
        Ok(Pool::new(items))
    }

    async fn generate(
        &self,
        source: &dyn GenerationSource,
        minimum: usize,
        level: LanguageLevel,
    ) -> Result<Vec<Item>, SupplyError> {
        let requested = request_count(minimum, self.config.oversample_percent);
        let prompt = item_instruction(self.config.item_kind, requested, level);
        let text = source.generate(&prompt).await?;

        let report = parse_lines(&text, self.config.item_kind);
        info!(
            requested,
            produced = report.items.len(),
            malformed = report.malformed,
            rejected = report.rejected,
            duplicates = report.duplicates,
            "generated pool"
        );

        let mut items = report.items;
        if items.len() < minimum {
            return Err(SupplyError::Exhausted {
                produced: items.len(),
                required: minimum,
            });
        }
        items.truncate(minimum);
        Ok(items)
    }
}

fn shuffle_corpus(items: Vec<Item>, minimum: usize) -> Result<Vec<Item>, SupplyError> {
    select_from_corpus(items, minimum, &mut rand::rng())
}

/// Drops repeated entries, then uniformly shuffles the corpus and keeps its
/// first `minimum` items.
///
/// Repeats are matched on [`Item::dedupe_key`]; the first occurrence wins.
///
/// # Errors
///
/// Returns `SupplyError::Exhausted` when fewer than `minimum` distinct items
/// remain.
pub fn select_from_corpus<R: Rng + ?Sized>(
    mut items: Vec<Item>,
    minimum: usize,
    rng: &mut R,
) -> Result<Vec<Item>, SupplyError> {
    let corpus = items.len();
    let mut seen = HashSet::with_capacity(corpus);
    items.retain(|item| seen.insert(item.dedupe_key()));
    let duplicates = corpus - items.len();
    if items.len() < minimum {
        return Err(SupplyError::Exhausted {
            produced: items.len(),
            required: minimum,
        });
    }
    items.shuffle(rng);
    items.truncate(minimum);
    info!(corpus, duplicates, selected = items.len(), "selected corpus pool");
    Ok(items)
}
