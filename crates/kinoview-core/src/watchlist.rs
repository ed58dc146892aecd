//! Watchlist store.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use anyhow::Result;
use kinoview_api::tmdb::{MediaId, MediaItem};

/// Storage backend for the watchlist.
///
/// The store calls it after every in-memory mutation. Failures are logged
/// and never roll back the in-memory state.
pub trait WatchlistPersistence {
    /// Loads saved items in display order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn load(&self) -> Result<Vec<MediaItem>>;

    /// Inserts or replaces an item.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn store(&self, item: &MediaItem) -> Result<()>;

    /// Removes an item. Removing a missing id is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, id: MediaId) -> Result<()>;
}

/// Saved media items, unique by id, in insertion order.
#[derive(Default)]
pub struct WatchlistStore {
    /// Items keyed by insertion sequence.
    entries: BTreeMap<u64, MediaItem>,
    /// Media id to insertion sequence.
    positions: HashMap<MediaId, u64>,
    next_seq: u64,
    persistence: Option<Box<dyn WatchlistPersistence>>,
}

impl WatchlistStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store backed by `persistence`, seeded with its saved items.
    ///
    /// A failing load is logged and the store starts empty.
    #[must_use]
    pub fn with_persistence(persistence: Box<dyn WatchlistPersistence>) -> Self {
        let mut store = Self::new();
        match persistence.load() {
            Ok(items) => {
                for item in items {
                    store.insert(item);
                }
            }
            Err(err) => tracing::warn!("failed to load watchlist: {err:#}"),
        }
        store.persistence = Some(persistence);
        store
    }

    /// Returns `true` if `id` is saved.
    #[must_use]
    pub fn is_in_watchlist(&self, id: MediaId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Saves `item`. Re-adding an existing id replaces its attributes and
    /// keeps its position.
    pub fn add_to_watchlist(&mut self, item: MediaItem) {
        if let Some(persistence) = &self.persistence
            && let Err(err) = persistence.store(&item)
        {
            tracing::warn!(id = item.id, "failed to persist watchlist item: {err:#}");
        }
        self.insert(item);
    }

    /// Removes `id` if present.
    pub fn remove_from_watchlist(&mut self, id: MediaId) {
        let Some(seq) = self.positions.remove(&id) else {
            return;
        };
        self.entries.remove(&seq);

        if let Some(persistence) = &self.persistence
            && let Err(err) = persistence.remove(id)
        {
            tracing::warn!(id, "failed to remove persisted watchlist item: {err:#}");
        }
    }

    /// Adds `item` if absent, removes it otherwise. Returns the new
    /// membership.
    pub fn toggle(&mut self, item: &MediaItem) -> bool {
        if self.is_in_watchlist(item.id) {
            self.remove_from_watchlist(item.id);
            false
        } else {
            self.add_to_watchlist(item.clone());
            true
        }
    }

    /// Returns the saved item for `id`.
    #[must_use]
    pub fn get(&self, id: MediaId) -> Option<&MediaItem> {
        self.positions
            .get(&id)
            .and_then(|seq| self.entries.get(seq))
    }

    /// Iterates saved items in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &MediaItem> {
        self.entries.values()
    }

    /// Returns the number of saved items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, item: MediaItem) {
        if let Some(seq) = self.positions.get(&item.id) {
            self.entries.insert(*seq, item);
            return;
        }
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.positions.insert(item.id, seq);
        self.entries.insert(seq, item);
    }
}

impl fmt::Debug for WatchlistStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchlistStore")
            .field("len", &self.entries.len())
            .field("persistent", &self.persistence.is_some())
            .finish_non_exhaustive()
    }
}
