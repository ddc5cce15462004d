//! Watchlist persistence for marquee.
//!
//! The watchlist is one JSON array of movie records kept in a single slot
//! of a key-value storage. `SQLite` (bundled via `rusqlite`) backs the
//! durable slot; in-memory and detached backends cover tests and contexts
//! without persistent storage.

mod migrations;
/// Change notification for watchlist subscribers.
pub mod observer;
/// `SQLite`-backed key-value storage.
pub mod sqlite;
/// Key-value storage boundary and simple backends.
pub mod storage;
/// The watchlist store itself.
pub mod watchlist;

pub use observer::{SubscriptionId, WatchlistObserver};
pub use sqlite::{SqliteStorage, resolve_db_path};
pub use storage::{DetachedStorage, KeyValueStorage, MemoryStorage, StorageError};
#[allow(clippy::module_name_repetitions)]
pub use watchlist::{WATCHLIST_KEY, WatchlistError, WatchlistStore};
