//! Thread-safe handle to a store
//!
//! Wraps a [`BudgetStore`] so several owners can hold it. Mutations are
//! serialized by the write lock and the slot write finishes before the lock
//! is released, so a reader never sees a state that is not yet durable.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{BudgetError, BudgetResult};
use crate::models::{
    AppData, Category, CategoryId, Entry, EntryId, General, GeneralPatch, Money, NewEntry,
};
use crate::storage::SlotStore;

use super::BudgetStore;

/// Cloneable handle sharing one store
#[derive(Debug)]
pub struct SharedStore<S: SlotStore> {
    inner: Arc<RwLock<BudgetStore<S>>>,
}

impl<S: SlotStore> Clone for SharedStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: SlotStore> SharedStore<S> {
    pub fn new(store: BudgetStore<S>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    fn read_guard(&self) -> BudgetResult<RwLockReadGuard<'_, BudgetStore<S>>> {
        self.inner
            .read()
            .map_err(|e| BudgetError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write_guard(&self) -> BudgetResult<RwLockWriteGuard<'_, BudgetStore<S>>> {
        self.inner
            .write()
            .map_err(|e| BudgetError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Run `f` against the current aggregate
    pub fn read<R>(&self, f: impl FnOnce(&AppData) -> R) -> BudgetResult<R> {
        let store = self.read_guard()?;
        Ok(f(store.data()))
    }

    /// Run `f` with exclusive access to the store
    pub fn with_store<R>(
        &self,
        f: impl FnOnce(&mut BudgetStore<S>) -> BudgetResult<R>,
    ) -> BudgetResult<R> {
        let mut store = self.write_guard()?;
        f(&mut *store)
    }

    pub fn snapshot(&self) -> BudgetResult<AppData> {
        self.read(AppData::clone)
    }

    pub fn update_general(&self, patch: GeneralPatch) -> BudgetResult<General> {
        self.with_store(|s| s.update_general(patch))
    }

    pub fn add_category(&self, title: &str, amount: Option<Money>) -> BudgetResult<Category> {
        self.with_store(|s| s.add_category(title, amount))
    }

    pub fn update_category(
        &self,
        id: CategoryId,
        title: &str,
        amount: Option<Money>,
    ) -> BudgetResult<Category> {
        self.with_store(|s| s.update_category(id, title, amount))
    }

    pub fn delete_category(&self, id: CategoryId) -> BudgetResult<Category> {
        self.with_store(|s| s.delete_category(id))
    }

    pub fn add_entry(&self, new: NewEntry) -> BudgetResult<Entry> {
        self.with_store(|s| s.add_entry(new))
    }

    pub fn update_entry(&self, id: EntryId, new: NewEntry) -> BudgetResult<Entry> {
        self.with_store(|s| s.update_entry(id, new))
    }

    pub fn delete_entry(&self, id: EntryId) -> BudgetResult<Entry> {
        self.with_store(|s| s.delete_entry(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryDate;
    use crate::storage::{MemorySlotStore, DATA_KEY};
    use std::thread;

    #[test]
    fn test_concurrent_adds_are_serialized() {
        let slots = MemorySlotStore::new();
        let shared = SharedStore::new(BudgetStore::open(slots.clone()).unwrap());
        let category_id = shared.add_category("Groceries", None).unwrap().id;

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for j in 0..25 {
                        shared
                            .add_entry(NewEntry::new(
                                format!("item {}-{}", i, j),
                                category_id,
                                EntryDate::from_ymd(2024, 1, 1).unwrap(),
                                Money::from_i64(1),
                            ))
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let data = shared.snapshot().unwrap();
        assert_eq!(data.entries.len(), 200);
        assert!(data.validate().is_ok());

        let persisted = AppData::from_json(&slots.read(DATA_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(persisted, data);
    }

    #[test]
    fn test_read_sees_committed_state() {
        let shared = SharedStore::new(BudgetStore::open(MemorySlotStore::new()).unwrap());
        let category = shared.add_category("Rent", None).unwrap();

        let title = shared
            .read(|data| data.category(category.id).map(|c| c.title.clone()))
            .unwrap();
        assert_eq!(title.as_deref(), Some("Rent"));

        shared.delete_category(category.id).unwrap();
        assert!(shared.read(|data| data.categories.is_empty()).unwrap());
    }
}
