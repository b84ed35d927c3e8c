//! Durable key-value slots
//!
//! The store persists its whole aggregate as one text value under a fixed
//! key. `SlotStore` abstracts where that value lives.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::error::BudgetError;

use super::file_io::{read_text, write_text_atomic};

/// A synchronous key-value store holding serialized documents
pub trait SlotStore {
    /// Read the value under `key`, or `None` if nothing was ever written
    fn read(&self, key: &str) -> Result<Option<String>, BudgetError>;

    /// Overwrite the value under `key`
    fn write(&self, key: &str, value: &str) -> Result<(), BudgetError>;

    /// Check whether a value exists under `key`
    fn exists(&self, key: &str) -> Result<bool, BudgetError> {
        Ok(self.read(key)?.is_some())
    }
}

impl<T: SlotStore + ?Sized> SlotStore for Arc<T> {
    fn read(&self, key: &str) -> Result<Option<String>, BudgetError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), BudgetError> {
        (**self).write(key, value)
    }
}

/// Slots stored as `<dir>/<key>.json` files
#[derive(Debug, Clone)]
pub struct FileSlotStore {
    dir: PathBuf,
}

impl FileSlotStore {
    /// Create a slot store rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the slot files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`
    pub fn slot_path(&self, key: &str) -> Result<PathBuf, BudgetError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl SlotStore for FileSlotStore {
    fn read(&self, key: &str) -> Result<Option<String>, BudgetError> {
        read_text(self.slot_path(key)?)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), BudgetError> {
        write_text_atomic(self.slot_path(key)?, value)
    }
}

/// In-process slots
///
/// Clones share the same underlying map, so a test can keep a handle after
/// the store that used it has been dropped.
#[derive(Debug, Clone, Default)]
pub struct MemorySlotStore {
    slots: Arc<RwLock<HashMap<String, String>>>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemorySlotStore {
    fn read(&self, key: &str) -> Result<Option<String>, BudgetError> {
        let slots = self
            .slots
            .read()
            .map_err(|e| BudgetError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(slots.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), BudgetError> {
        validate_key(key)?;
        let mut slots = self
            .slots
            .write()
            .map_err(|e| BudgetError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<(), BudgetError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(BudgetError::Storage(format!("Invalid slot key: {:?}", key)))
    }
}
