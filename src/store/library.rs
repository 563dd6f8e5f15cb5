use crate::error::{DescError, Result};
use crate::store::collection::{Collection, CollectionItem, DEFAULT_LIMIT, HistoryItem, SavedItem};
use crate::store::id::IdGenerator;
use crate::store::kv::{KeyValueStore, load_or, save};

pub const HISTORY_KEY: &str = "recentHistory";
pub const SAVED_KEY: &str = "savedDescriptions";
pub const CURRENT_KEY: &str = "currentDescription";

/// Size bounds for the two collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub history: usize,
    pub saved: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            history: DEFAULT_LIMIT,
            saved: DEFAULT_LIMIT,
        }
    }
}

/// Recent history and saved descriptions, persisted in a [`KeyValueStore`].
///
/// Every mutation writes the affected slot back immediately.
pub struct Library<S> {
    store: S,
    history: Collection<HistoryItem>,
    saved: Collection<SavedItem>,
    ids: IdGenerator,
}

impl<S: KeyValueStore> Library<S> {
    /// Load both collections from `store`. Absent or unparsable slots start empty.
    pub fn open(store: S, limits: Limits) -> Self {
        let history: Collection<HistoryItem> =
            Collection::from_items(load_or(&store, HISTORY_KEY, Vec::new()), limits.history);
        let saved: Collection<SavedItem> =
            Collection::from_items(load_or(&store, SAVED_KEY, Vec::new()), limits.saved);

        let mut ids = IdGenerator::new();
        ids.exclude(history.items().iter().map(|i| i.id.clone()));
        ids.exclude(saved.items().iter().map(|i| i.id.clone()));

        tracing::debug!(
            history = history.len(),
            saved = saved.len(),
            "library opened"
        );

        Self {
            store,
            history,
            saved,
            ids,
        }
    }

    pub fn history(&self) -> &[HistoryItem] {
        self.history.items()
    }

    pub fn saved(&self) -> &[SavedItem] {
        self.saved.items()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Record `text` in history. Returns `false` if it was already there.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub fn add_to_history(&mut self, text: &str) -> Result<bool> {
        add_and_persist(&mut self.store, HISTORY_KEY, &mut self.history, &mut self.ids, text)
    }

    /// Keep `text` in the saved list. Returns `false` if it was already there.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub fn add_to_saved(&mut self, text: &str) -> Result<bool> {
        add_and_persist(&mut self.store, SAVED_KEY, &mut self.saved, &mut self.ids, text)
    }

    /// Returns `false` if no history item has `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub fn remove_from_history(&mut self, id: &str) -> Result<bool> {
        remove_and_persist(&mut self.store, HISTORY_KEY, &mut self.history, id)
    }

    /// Returns `false` if no saved item has `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub fn remove_from_saved(&mut self, id: &str) -> Result<bool> {
        remove_and_persist(&mut self.store, SAVED_KEY, &mut self.saved, id)
    }

    /// Copy a history item's text into the saved list.
    ///
    /// # Errors
    ///
    /// Returns [`DescError::UnknownItem`] if no history item has `id`.
    pub fn save_from_history(&mut self, id: &str) -> Result<bool> {
        let text = self
            .history
            .find(id)
            .map(|item| item.text.clone())
            .ok_or_else(|| DescError::unknown_item(id))?;
        self.add_to_saved(&text)
    }

    /// Publish `text` as the current description for other consumers.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub fn reuse(&mut self, text: &str) -> Result<()> {
        save(&mut self.store, CURRENT_KEY, &Some(text))?;
        tracing::debug!(text, "current description set");
        Ok(())
    }

    /// Publish a history item's text as the current description.
    ///
    /// # Errors
    ///
    /// Returns [`DescError::UnknownItem`] if no history item has `id`, or an
    /// error if the store write fails.
    pub fn reuse_from_history(&mut self, id: &str) -> Result<String> {
        let text = self
            .history
            .find(id)
            .map(|item| item.text.clone())
            .ok_or_else(|| DescError::unknown_item(id))?;
        self.reuse(&text)?;
        Ok(text)
    }

    /// Publish a saved item's text as the current description.
    ///
    /// # Errors
    ///
    /// Returns [`DescError::UnknownItem`] if no saved item has `id`, or an
    /// error if the store write fails.
    pub fn reuse_from_saved(&mut self, id: &str) -> Result<String> {
        let text = self
            .saved
            .find(id)
            .map(|item| item.text.clone())
            .ok_or_else(|| DescError::unknown_item(id))?;
        self.reuse(&text)?;
        Ok(text)
    }

    pub fn current_description(&self) -> Option<String> {
        load_or(&self.store, CURRENT_KEY, None)
    }
}

fn add_and_persist<S, T>(
    store: &mut S,
    key: &str,
    collection: &mut Collection<T>,
    ids: &mut IdGenerator,
    text: &str,
) -> Result<bool>
where
    S: KeyValueStore,
    T: CollectionItem,
{
    if collection.add(text, ids).is_none() {
        return Ok(false);
    }
    save(store, key, collection.items())?;
    tracing::debug!(key, size = collection.len(), "item added");
    Ok(true)
}

fn remove_and_persist<S, T>(
    store: &mut S,
    key: &str,
    collection: &mut Collection<T>,
    id: &str,
) -> Result<bool>
where
    S: KeyValueStore,
    T: CollectionItem,
{
    if collection.remove(id).is_none() {
        return Ok(false);
    }
    save(store, key, collection.items())?;
    tracing::debug!(key, id, "item removed");
    Ok(true)
}
