//! `SQLite`-backed key-value storage.

use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};

use super::migrations::run_migrations;
use super::storage::{KeyValueStorage, StorageError};

/// Durable storage in a `SQLite` database file.
///
/// The database is opened on first access, not at construction. If opening
/// fails the call reports [`StorageError::Unavailable`] and the next call
/// tries again.
#[derive(Debug)]
pub struct SqliteStorage {
    /// Database file path.
    path: PathBuf,
    /// Connection, set once the first open succeeds.
    conn: OnceCell<Connection>,
}

impl SqliteStorage {
    /// Creates a storage for the database at `path` without opening it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            conn: OnceCell::new(),
        }
    }

    /// Creates a storage in `{dir}/marquee.db`, or the default data
    /// directory when `dir` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined (when `dir` is `None`).
    pub fn in_dir(dir: Option<&PathBuf>) -> Result<Self> {
        Ok(Self::new(resolve_db_path(dir)?))
    }

    /// Database file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the open connection, opening it on first use.
    fn connection(&self) -> Result<&Connection, StorageError> {
        if let Some(conn) = self.conn.get() {
            return Ok(conn);
        }
        let conn = open_connection(&self.path).map_err(StorageError::Unavailable)?;
        tracing::debug!(path = %self.path.display(), "Opened watchlist database");
        Ok(self.conn.get_or_init(|| conn))
    }
}

impl KeyValueStorage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.connection()?;
        conn.query_row("SELECT value FROM slots WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()
        .with_context(|| format!("failed to read slot {key}"))
        .map_err(StorageError::Unavailable)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO slots (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = datetime('now')",
            rusqlite::params![key, value],
        )
        .with_context(|| format!("failed to write slot {key}"))
        .map_err(StorageError::Unavailable)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let conn = self.connection()?;
        conn.execute("DELETE FROM slots WHERE key = ?1", [key])
            .with_context(|| format!("failed to delete slot {key}"))
            .map_err(StorageError::Unavailable)?;
        Ok(())
    }
}

/// Opens (or creates) the database and runs migrations.
fn open_connection(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database {}", path.display()))?;

    run_migrations(&conn).context("database migration failed")?;

    Ok(conn)
}

/// Resolves the database file path.
///
/// - If `dir` is `Some`, returns `{dir}/marquee.db`.
/// - Otherwise returns `~/.local/share/marquee/marquee.db`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined (when `dir` is `None`).
pub fn resolve_db_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join("marquee.db"));
    }

    let home = std::env::var("HOME").context("HOME environment variable is not set")?;
    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("marquee")
        .join("marquee.db"))
}
