use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::store::id::IdGenerator;

/// Default maximum number of items kept per collection.
pub const DEFAULT_LIMIT: usize = 50;

/// A stored description: something with an id, a text and a creation time.
pub trait CollectionItem: Clone + Serialize + DeserializeOwned {
    fn create(id: String, text: String, at_millis: i64) -> Self;
    fn id(&self) -> &str;
    fn text(&self) -> &str;
}

/// A previously generated or submitted description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub text: String,
    pub timestamp: i64,
}

impl CollectionItem for HistoryItem {
    fn create(id: String, text: String, at_millis: i64) -> Self {
        Self {
            id,
            text,
            timestamp: at_millis,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn text(&self) -> &str {
        &self.text
    }
}

/// A description the user chose to keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedItem {
    pub id: String,
    pub text: String,
    #[serde(rename = "savedAt")]
    pub saved_at: i64,
}

impl CollectionItem for SavedItem {
    fn create(id: String, text: String, at_millis: i64) -> Self {
        Self {
            id,
            text,
            saved_at: at_millis,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn text(&self) -> &str {
        &self.text
    }
}

/// Newest-first list with unique texts and a size bound.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    items: Vec<T>,
    limit: usize,
}

impl<T: CollectionItem> Collection<T> {
    pub fn new(limit: usize) -> Self {
        Self {
            items: Vec::new(),
            limit,
        }
    }

    /// Wrap previously stored items, enforcing the bound.
    pub fn from_items(mut items: Vec<T>, limit: usize) -> Self {
        items.truncate(limit);
        Self { items, limit }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn contains_text(&self, text: &str) -> bool {
        self.items.iter().any(|item| item.text() == text)
    }

    pub fn find(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Prepend `text` as a new item unless an item with the same text exists.
    ///
    /// Returns the new item, or `None` for a duplicate. The oldest items are
    /// dropped once the collection exceeds its limit.
    pub fn add(&mut self, text: &str, ids: &mut IdGenerator) -> Option<&T> {
        if self.contains_text(text) {
            tracing::debug!(text, "duplicate text ignored");
            return None;
        }
        let item = T::create(
            ids.generate(),
            text.to_owned(),
            chrono::Utc::now().timestamp_millis(),
        );
        self.items.insert(0, item);
        if self.items.len() > self.limit {
            let evicted = self.items.len() - self.limit;
            self.items.truncate(self.limit);
            tracing::debug!(evicted, "evicted oldest items");
        }
        self.items.first()
    }

    /// Remove the item with `id`.
    pub fn remove(&mut self, id: &str) -> Option<T> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }
}
