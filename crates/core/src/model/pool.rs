use std::sync::Arc;

use crate::model::item::Item;

/// Validated, ordered collection of items backing one game.
///
/// Immutable once built; clones share the same storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    items: Arc<[Item]>,
}

impl Pool {
    #[must_use]
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items: items.into(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }
}
