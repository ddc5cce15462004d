use std::rc::Rc;

use anyhow::Context;
use marquee_api::tmdb::{Movie, MovieId};
use thiserror::Error;

use super::observer::{Observers, SubscriptionId, WatchlistObserver};
use super::storage::{KeyValueStorage, StorageError};

/// Storage slot holding the watchlist JSON array.
pub const WATCHLIST_KEY: &str = "movie_watchlist";

/// Errors surfaced by [`WatchlistStore`].
///
/// An unavailable storage is not an error here: reads return empty and
/// writes are skipped with a warning.
#[derive(Debug, Error)]
pub enum WatchlistError {
    /// The persisted blob exists but cannot be parsed.
    #[error("persisted watchlist is malformed: {0:#}")]
    MalformedPersistedData(anyhow::Error),
}

/// The user's ordered, duplicate-free list of movies.
///
/// Every call re-reads the persisted blob, so two stores over the same
/// storage see each other's writes.
#[derive(Debug)]
pub struct WatchlistStore<S> {
    storage: S,
    observers: Observers,
}

impl<S: KeyValueStorage> WatchlistStore<S> {
    /// Creates a store over `storage`.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            observers: Observers::default(),
        }
    }

    /// Returns the underlying storage.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns every persisted movie in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`WatchlistError::MalformedPersistedData`] if the blob cannot be parsed.
    pub fn all(&self) -> Result<Vec<Movie>, WatchlistError> {
        Ok(self.read("all")?.unwrap_or_default())
    }

    /// Returns `true` if a movie with `id` is persisted.
    ///
    /// # Errors
    ///
    /// Returns [`WatchlistError::MalformedPersistedData`] if the blob cannot be parsed.
    pub fn contains(&self, id: MovieId) -> Result<bool, WatchlistError> {
        Ok(self
            .read("contains")?
            .is_some_and(|list| list.iter().any(|m| m.id == id)))
    }

    /// Number of persisted movies.
    ///
    /// # Errors
    ///
    /// Returns [`WatchlistError::MalformedPersistedData`] if the blob cannot be parsed.
    pub fn len(&self) -> Result<usize, WatchlistError> {
        Ok(self.read("len")?.as_ref().map_or(0, Vec::len))
    }

    /// Returns `true` if nothing is persisted.
    ///
    /// # Errors
    ///
    /// Returns [`WatchlistError::MalformedPersistedData`] if the blob cannot be parsed.
    pub fn is_empty(&self) -> Result<bool, WatchlistError> {
        Ok(self.len()? == 0)
    }

    /// Appends `movie` unless an entry with the same id exists.
    ///
    /// # Errors
    ///
    /// Returns [`WatchlistError::MalformedPersistedData`] if the blob cannot be parsed.
    pub fn add(&self, movie: Movie) -> Result<(), WatchlistError> {
        if let Some(mut list) = self.read("add")? {
            if list.iter().any(|m| m.id == movie.id) {
                tracing::debug!(movie_id = movie.id, "Already in watchlist");
            } else {
                tracing::debug!(movie_id = movie.id, title = %movie.title, "Adding to watchlist");
                list.push(movie);
                self.write(&list, "add");
            }
        }
        self.observers.notify();
        Ok(())
    }

    /// Removes every entry with `id`. Nothing is written if none matches.
    ///
    /// # Errors
    ///
    /// Returns [`WatchlistError::MalformedPersistedData`] if the blob cannot be parsed.
    pub fn remove(&self, id: MovieId) -> Result<(), WatchlistError> {
        if let Some(list) = self.read("remove")? {
            let before = list.len();
            let kept: Vec<Movie> = list.into_iter().filter(|m| m.id != id).collect();
            if kept.len() == before {
                tracing::debug!(movie_id = id, "Not in watchlist");
            } else {
                self.write(&kept, "remove");
            }
        }
        self.observers.notify();
        Ok(())
    }

    /// Deletes the persisted blob. Never reads, so it also recovers a
    /// malformed store.
    pub fn clear(&self) {
        self.delete("clear");
        self.observers.notify();
    }

    /// Registers an observer called after every completed mutation.
    pub fn subscribe(&self, observer: impl WatchlistObserver + 'static) -> SubscriptionId {
        self.observers.subscribe(Rc::new(observer))
    }

    /// Removes an observer. Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Reads the list. `Ok(None)` means the storage is unavailable.
    fn read(&self, operation: &str) -> Result<Option<Vec<Movie>>, WatchlistError> {
        let blob = match self.storage.get(WATCHLIST_KEY) {
            Ok(blob) => blob,
            Err(err) => {
                log_unavailable(&err, operation);
                return Ok(None);
            }
        };
        let Some(blob) = blob else {
            return Ok(Some(Vec::new()));
        };
        serde_json::from_str(&blob)
            .with_context(|| format!("failed to parse slot {WATCHLIST_KEY}"))
            .map(Some)
            .map_err(WatchlistError::MalformedPersistedData)
    }

    fn write(&self, list: &[Movie], operation: &str) {
        let blob = match serde_json::to_string(list) {
            Ok(blob) => blob,
            Err(err) => {
                tracing::warn!(operation, error = %err, "Failed to encode watchlist, skipping write");
                return;
            }
        };
        if let Err(err) = self.storage.set(WATCHLIST_KEY, &blob) {
            log_unavailable(&err, operation);
        }
    }

    fn delete(&self, operation: &str) {
        if let Err(err) = self.storage.remove(WATCHLIST_KEY) {
            log_unavailable(&err, operation);
        }
    }
}

fn log_unavailable(err: &StorageError, operation: &str) {
    tracing::warn!(operation, error = %err, "Watchlist storage unavailable");
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::cell::Cell;

    use tracing::subscriber::with_default;
    use tracing_mock::{expect, subscriber};

    use super::*;
    use crate::sqlite::SqliteStorage;
    use crate::storage::{DetachedStorage, MemoryStorage};

    fn ids(movies: &[Movie]) -> Vec<MovieId> {
        movies.iter().map(|m| m.id).collect()
    }

    fn memory_store() -> WatchlistStore<MemoryStorage> {
        WatchlistStore::new(MemoryStorage::new())
    }

    /// Reads succeed, writes fail.
    #[derive(Debug, Default)]
    struct ReadOnlyStorage {
        inner: MemoryStorage,
    }

    impl KeyValueStorage for ReadOnlyStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable(anyhow::anyhow!("read-only storage")))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable(anyhow::anyhow!("read-only storage")))
        }
    }

    const SEEDED_BLOB: &str = r#"[{"id":1,"title":"One"}]"#;

    fn read_only_store() -> WatchlistStore<ReadOnlyStorage> {
        let storage = ReadOnlyStorage::default();
        storage.inner.set(WATCHLIST_KEY, SEEDED_BLOB).unwrap();
        WatchlistStore::new(storage)
    }

    #[test]
    fn test_never_written_store_reads_empty() {
        // Arrange
        let store = memory_store();

        // Act & Assert
        assert!(store.all().unwrap().is_empty());
        assert!(!store.contains(27_205).unwrap());
        assert_eq!(store.len().unwrap(), 0);
        assert!(store.is_empty().unwrap());
        assert!(!store.storage().has_slot(WATCHLIST_KEY));
    }

    #[test]
    fn test_add_is_idempotent() {
        // Arrange
        let store = memory_store();
        let movie = Movie::new(27_205, "Inception");

        // Act
        store.add(movie.clone()).unwrap();
        let once = store.all().unwrap();
        store.add(movie).unwrap();
        let twice = store.all().unwrap();

        // Assert
        assert_eq!(once, twice);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_duplicate_id_keeps_first_record() {
        // Arrange
        let store = memory_store();
        store.add(Movie::new(1, "Original title")).unwrap();

        // Act
        store.add(Movie::new(1, "Different title")).unwrap();

        // Assert
        let all = store.all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "Original title");
    }

    #[test]
    fn test_add_then_remove_restores_previous_contents() {
        // Arrange
        let store = memory_store();
        store.add(Movie::new(1, "One")).unwrap();
        store.add(Movie::new(2, "Two")).unwrap();
        let before = store.all().unwrap();

        // Act
        store.add(Movie::new(3, "Three")).unwrap();
        store.remove(3).unwrap();

        // Assert
        assert_eq!(store.all().unwrap(), before);
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        // Arrange
        let store = memory_store();

        // Act
        for (id, title) in [(30, "C"), (10, "A"), (20, "B")] {
            store.add(Movie::new(id, title)).unwrap();
        }
        store.remove(10).unwrap();
        store.add(Movie::new(40, "D")).unwrap();

        // Assert
        assert_eq!(ids(&store.all().unwrap()), vec![30, 20, 40]);
    }

    #[test]
    fn test_contains_matches_all() {
        // Arrange
        let store = memory_store();
        store.add(Movie::new(1, "One")).unwrap();
        store.add(Movie::new(2, "Two")).unwrap();
        store.remove(1).unwrap();

        // Act
        let all = ids(&store.all().unwrap());

        // Assert
        for id in [1, 2, 3] {
            assert_eq!(store.contains(id).unwrap(), all.contains(&id));
        }
    }

    #[test]
    fn test_remove_absent_writes_nothing() {
        // Arrange
        let store = memory_store();

        // Act
        store.remove(99).unwrap();

        // Assert
        assert!(!store.storage().has_slot(WATCHLIST_KEY));
    }

    #[test]
    fn test_removing_last_entry_writes_empty_array() {
        // Arrange
        let store = memory_store();
        store.add(Movie::new(1, "One")).unwrap();

        // Act
        store.remove(1).unwrap();

        // Assert
        assert_eq!(
            store.storage().get(WATCHLIST_KEY).unwrap().as_deref(),
            Some("[]")
        );
        assert!(store.all().unwrap().is_empty());
    }

    #[test]
    fn test_clear_is_total() {
        // Arrange
        let store = memory_store();
        store.add(Movie::new(1, "One")).unwrap();
        store.add(Movie::new(2, "Two")).unwrap();

        // Act
        store.clear();

        // Assert
        assert!(store.all().unwrap().is_empty());
        assert!(!store.contains(1).unwrap());
        assert!(!store.contains(2).unwrap());
        assert!(!store.storage().has_slot(WATCHLIST_KEY));
    }

    #[test]
    fn test_inception_scenario() {
        // Arrange
        let store = memory_store();
        let inception = Movie::new(27_205, "Inception");

        // Act & Assert
        assert!(store.all().unwrap().is_empty());

        store.add(inception.clone()).unwrap();
        assert!(store.contains(27_205).unwrap());
        assert_eq!(store.all().unwrap(), vec![inception.clone()]);

        store.add(inception.clone()).unwrap();
        assert_eq!(store.all().unwrap(), vec![inception]);

        store.remove(27_205).unwrap();
        assert!(store.all().unwrap().is_empty());
        assert!(!store.contains(27_205).unwrap());
    }

    #[test]
    fn test_persisted_blob_is_json_array() {
        // Arrange
        let store = memory_store();

        // Act
        store.add(Movie::new(27_205, "Inception")).unwrap();

        // Assert
        let blob = store.storage().get(WATCHLIST_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&blob).unwrap();
        assert_eq!(value[0]["id"], 27_205);
        assert_eq!(value[0]["title"], "Inception");
    }

    #[test]
    fn test_partial_records_deserialize() {
        // Arrange
        let storage = MemoryStorage::new();
        storage
            .set(WATCHLIST_KEY, r#"[{"id": 603, "title": "The Matrix"}, {"id": 604}]"#)
            .unwrap();
        let store = WatchlistStore::new(storage);

        // Act
        let all = store.all().unwrap();

        // Assert
        assert_eq!(ids(&all), vec![603, 604]);
        assert_eq!(all[0].title, "The Matrix");
        assert!(all[1].title.is_empty());
    }

    #[test]
    fn test_malformed_blob_propagates() {
        // Arrange
        let storage = MemoryStorage::new();
        storage.set(WATCHLIST_KEY, "{not json").unwrap();
        let store = WatchlistStore::new(storage);

        // Act & Assert
        assert!(matches!(
            store.all(),
            Err(WatchlistError::MalformedPersistedData(_))
        ));
        assert!(store.contains(1).is_err());
        assert!(store.len().is_err());
        assert!(store.add(Movie::new(1, "One")).is_err());
        assert!(store.remove(1).is_err());
        assert_eq!(
            store.storage().get(WATCHLIST_KEY).unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[test]
    fn test_clear_recovers_malformed_blob() {
        // Arrange
        let storage = MemoryStorage::new();
        storage.set(WATCHLIST_KEY, "[1, 2, 3]").unwrap();
        let store = WatchlistStore::new(storage);

        // Act
        store.clear();

        // Assert
        assert!(store.all().unwrap().is_empty());
    }

    #[test]
    fn test_detached_storage_degrades() {
        // Arrange
        let store = WatchlistStore::new(DetachedStorage);

        // Act
        store.add(Movie::new(1, "One")).unwrap();
        store.remove(1).unwrap();
        store.clear();

        // Assert
        assert!(store.all().unwrap().is_empty());
        assert!(!store.contains(1).unwrap());
        assert_eq!(store.len().unwrap(), 0);
    }

    #[test]
    fn test_detached_read_warns() {
        // Arrange
        let (subscriber, handle) = subscriber::mock()
            .event(expect::event().at_level(tracing::Level::WARN))
            .only()
            .run_with_handle();
        let store = WatchlistStore::new(DetachedStorage);

        // Act
        let all = with_default(subscriber, || store.all().unwrap());

        // Assert
        assert!(all.is_empty());
        handle.assert_finished();
    }

    #[test]
    fn test_failed_writes_keep_blob_and_notify() {
        // Arrange
        let store = read_only_store();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        store.subscribe(move || counter.set(counter.get() + 1));

        // Act
        let added = store.add(Movie::new(2, "Two"));
        let removed = store.remove(1);
        store.clear();

        // Assert
        assert!(added.is_ok());
        assert!(removed.is_ok());
        assert_eq!(calls.get(), 3);
        assert_eq!(
            store.storage().get(WATCHLIST_KEY).unwrap().as_deref(),
            Some(SEEDED_BLOB)
        );
        assert_eq!(ids(&store.all().unwrap()), vec![1]);
    }

    #[test]
    fn test_failed_add_write_warns() {
        // Arrange
        let (subscriber, handle) = subscriber::mock()
            .event(expect::event().at_level(tracing::Level::DEBUG))
            .event(expect::event().at_level(tracing::Level::WARN))
            .only()
            .run_with_handle();
        let store = read_only_store();

        // Act
        let result = with_default(subscriber, || store.add(Movie::new(2, "Two")));

        // Assert
        assert!(result.is_ok());
        handle.assert_finished();
    }

    #[test]
    fn test_failed_remove_write_warns() {
        // Arrange
        let (subscriber, handle) = subscriber::mock()
            .event(expect::event().at_level(tracing::Level::WARN))
            .only()
            .run_with_handle();
        let store = read_only_store();

        // Act
        let result = with_default(subscriber, || store.remove(1));

        // Assert
        assert!(result.is_ok());
        handle.assert_finished();
    }

    #[test]
    fn test_failed_clear_warns() {
        // Arrange
        let (subscriber, handle) = subscriber::mock()
            .event(expect::event().at_level(tracing::Level::WARN))
            .only()
            .run_with_handle();
        let store = read_only_store();

        // Act
        with_default(subscriber, || store.clear());

        // Assert
        handle.assert_finished();
        assert!(store.contains(1).unwrap());
    }

    #[test]
    fn test_observers_notified_per_mutation() {
        // Arrange
        let store = memory_store();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        store.subscribe(move || counter.set(counter.get() + 1));

        // Act
        store.add(Movie::new(1, "One")).unwrap();
        store.add(Movie::new(1, "One")).unwrap();
        store.remove(2).unwrap();
        store.clear();

        // Assert
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn test_no_notification_after_unsubscribe() {
        // Arrange
        let store = memory_store();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let id = store.subscribe(move || counter.set(counter.get() + 1));
        store.add(Movie::new(1, "One")).unwrap();

        // Act
        assert!(store.unsubscribe(id));
        store.add(Movie::new(2, "Two")).unwrap();

        // Assert
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_no_notification_on_malformed_blob() {
        // Arrange
        let storage = MemoryStorage::new();
        storage.set(WATCHLIST_KEY, "garbage").unwrap();
        let store = WatchlistStore::new(storage);
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        store.subscribe(move || counter.set(counter.get() + 1));

        // Act
        let result = store.add(Movie::new(1, "One"));

        // Assert
        assert!(result.is_err());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_observer_can_requery_store() {
        // Arrange
        let store = Rc::new(memory_store());
        let seen = Rc::new(Cell::new(usize::MAX));
        let weak = Rc::downgrade(&store);
        let sink = Rc::clone(&seen);
        store.subscribe(move || {
            if let Some(store) = weak.upgrade() {
                sink.set(store.len().unwrap());
            }
        });

        // Act
        store.add(Movie::new(1, "One")).unwrap();
        store.add(Movie::new(2, "Two")).unwrap();

        // Assert
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn test_sqlite_watchlist_survives_reopen() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marquee.db");
        {
            let store = WatchlistStore::new(SqliteStorage::new(&path));
            store.add(Movie::new(27_205, "Inception")).unwrap();
            store.add(Movie::new(603, "The Matrix")).unwrap();
        }

        // Act
        let reopened = WatchlistStore::new(SqliteStorage::new(&path));

        // Assert
        assert_eq!(ids(&reopened.all().unwrap()), vec![27_205, 603]);
    }

    #[test]
    fn test_two_stores_share_storage() {
        // Arrange
        let storage = MemoryStorage::new();
        let writer = WatchlistStore::new(&storage);
        let reader = WatchlistStore::new(&storage);

        // Act
        writer.add(Movie::new(1, "One")).unwrap();

        // Assert
        assert!(reader.contains(1).unwrap());
    }
}
