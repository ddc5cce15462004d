//! Key-value storage boundary.

use std::cell::RefCell;
use std::collections::HashMap;

use thiserror::Error;

/// Failure of the storage layer itself.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage cannot be reached in the current context.
    #[error("storage is unavailable: {0:#}")]
    Unavailable(anyhow::Error),
}

/// A client-local key-value storage holding string values in named slots.
pub trait KeyValueStorage {
    /// Reads the value stored under `key`, or `None` if the slot is empty.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if the storage cannot be accessed.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if the storage cannot be accessed.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Deletes the slot `key`. Deleting an empty slot succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if the storage cannot be accessed.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// In-process storage. Contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a value is stored under `key`.
    #[must_use]
    pub fn has_slot(&self, key: &str) -> bool {
        self.slots.borrow().contains_key(key)
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots
            .borrow_mut()
            .insert(String::from(key), String::from(value));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.slots.borrow_mut().remove(key);
        Ok(())
    }
}

/// Storage for contexts with no persistent storage at all.
///
/// Every operation fails with [`StorageError::Unavailable`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedStorage;

impl DetachedStorage {
    fn unavailable() -> StorageError {
        StorageError::Unavailable(anyhow::anyhow!("no persistent storage in this context"))
    }
}

impl KeyValueStorage for DetachedStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(Self::unavailable())
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(Self::unavailable())
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(Self::unavailable())
    }
}
