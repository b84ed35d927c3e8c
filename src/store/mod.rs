//! The budget store
//!
//! `BudgetStore` is the sole owner and mutator of [`AppData`]. Every mutation
//! is applied to a copy of the aggregate, the copy is written to the slot in
//! full, and only then does it replace the in-memory state. A failed
//! validation or a failed write therefore leaves the store exactly as it was.
//!
//! # Example
//!
//! ```rust,ignore
//! use budget_store::models::{EntryDate, Money, NewEntry};
//! use budget_store::storage::MemorySlotStore;
//! use budget_store::store::BudgetStore;
//!
//! let mut store = BudgetStore::open(MemorySlotStore::new())?;
//! let groceries = store.add_category("Groceries", None)?;
//! store.add_entry(NewEntry::new(
//!     "Milk",
//!     groceries.id,
//!     EntryDate::from_ymd(2024, 1, 1).unwrap(),
//!     Money::from_i64(5),
//! ))?;
//! ```

mod shared;

pub use shared::SharedStore;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::{BudgetPaths, Settings};
use crate::error::{BudgetError, BudgetResult};
use crate::models::{
    AppData, Category, CategoryId, Entry, EntryId, General, GeneralPatch, Money, NewEntry,
};
use crate::storage::{FileSlotStore, SlotStore, DATA_KEY};

/// Options applied when opening a store
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// Indent the stored document
    pub pretty_json: bool,
    /// Where to record committed mutations, if anywhere
    pub audit: Option<AuditLogger>,
}

impl StoreOptions {
    /// Options derived from the user's settings
    pub fn from_settings(paths: &BudgetPaths, settings: &Settings) -> Self {
        Self {
            pretty_json: settings.pretty_json,
            audit: settings
                .audit_enabled
                .then(|| AuditLogger::new(paths.audit_log())),
        }
    }
}

/// Owner of the budget aggregate and its durable slot
#[derive(Debug)]
pub struct BudgetStore<S: SlotStore> {
    slot: S,
    data: AppData,
    pretty_json: bool,
    audit: Option<AuditLogger>,
    audit_error: Option<BudgetError>,
}

impl BudgetStore<FileSlotStore> {
    /// Open the store in the configured data directory
    pub fn open_default(paths: &BudgetPaths, settings: &Settings) -> BudgetResult<Self> {
        paths.ensure_directories()?;
        Self::open_with(paths.slot_store(), StoreOptions::from_settings(paths, settings))
    }
}

impl<S: SlotStore> BudgetStore<S> {
    /// Open a store over `slot` with default options
    pub fn open(slot: S) -> BudgetResult<Self> {
        Self::open_with(slot, StoreOptions::default())
    }

    /// Load the aggregate from `slot`, or create and persist an empty one
    ///
    /// # Errors
    ///
    /// Returns [`BudgetError::CorruptState`] if the slot holds a document that
    /// does not parse or that violates id uniqueness or category references.
    /// The stored document is left untouched in that case.
    pub fn open_with(slot: S, options: StoreOptions) -> BudgetResult<Self> {
        let stored = slot.read(DATA_KEY)?;

        let mut store = Self {
            slot,
            data: AppData::default(),
            pretty_json: options.pretty_json,
            audit: options.audit,
            audit_error: None,
        };

        match stored {
            Some(json) => {
                store.data = AppData::from_json(&json)
                    .map_err(|e| BudgetError::CorruptState(e.to_string()))?;
            }
            None => {
                store.persist(&store.data)?;
            }
        }

        Ok(store)
    }

    // === Reads ===

    /// The current aggregate
    pub fn data(&self) -> &AppData {
        &self.data
    }

    /// An owned copy of the current aggregate
    pub fn snapshot(&self) -> AppData {
        self.data.clone()
    }

    pub fn general(&self) -> &General {
        &self.data.general
    }

    pub fn categories(&self) -> &[Category] {
        &self.data.categories
    }

    pub fn entries(&self) -> &[Entry] {
        &self.data.entries
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.data.category(id)
    }

    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.data.entry(id)
    }

    /// Title of the category an entry is booked against
    pub fn category_title(&self, id: CategoryId) -> Option<&str> {
        self.data.category(id).map(|c| c.title.as_str())
    }

    pub fn entries_for_category(&self, id: CategoryId) -> Vec<&Entry> {
        self.data.entries_for_category(id).collect()
    }

    // === General ===

    /// Shallow-merge `patch` into the settings record
    pub fn update_general(&mut self, patch: GeneralPatch) -> BudgetResult<General> {
        let before = self.data.general.clone();

        let mut next = self.data.clone();
        next.general.merge(patch);
        self.commit(next)?;

        let after = self.data.general.clone();
        if before != after {
            self.record(AuditEntry::update(
                EntityType::General,
                "general",
                Some(after.account.clone()),
                &before,
                &after,
            ));
        }

        Ok(after)
    }

    // === Categories ===

    /// Append a new category with a freshly generated id
    pub fn add_category(
        &mut self,
        title: impl Into<String>,
        amount: Option<Money>,
    ) -> BudgetResult<Category> {
        let title: String = title.into();
        let category = Category::with_amount(title.trim(), amount);
        category
            .validate()
            .map_err(|e| BudgetError::Validation(e.to_string()))?;

        let mut next = self.data.clone();
        next.categories.push(category.clone());
        self.commit(next)?;

        self.record(AuditEntry::create(
            EntityType::Category,
            category.id.to_string(),
            Some(category.title.clone()),
            &category,
        ));

        Ok(category)
    }

    /// Replace a category's title and budgeted amount
    ///
    /// Passing `None` for `amount` clears a previously set amount.
    pub fn update_category(
        &mut self,
        id: CategoryId,
        title: impl Into<String>,
        amount: Option<Money>,
    ) -> BudgetResult<Category> {
        let index = self.category_index(id)?;
        let before = self.data.categories[index].clone();

        let title: String = title.into();
        let mut updated = before.clone();
        updated.title = title.trim().to_string();
        updated.amount = amount;
        updated
            .validate()
            .map_err(|e| BudgetError::Validation(e.to_string()))?;

        let mut next = self.data.clone();
        next.categories[index] = updated.clone();
        self.commit(next)?;

        self.record(AuditEntry::update(
            EntityType::Category,
            id.to_string(),
            Some(updated.title.clone()),
            &before,
            &updated,
        ));

        Ok(updated)
    }

    /// Remove a category that no entry references
    ///
    /// # Errors
    ///
    /// [`BudgetError::CategoryInUse`] if any entry still points at it.
    pub fn delete_category(&mut self, id: CategoryId) -> BudgetResult<Category> {
        let index = self.category_index(id)?;

        let in_use = self.data.entries_for_category(id).count();
        if in_use > 0 {
            return Err(BudgetError::CategoryInUse {
                category: self.data.categories[index].title.clone(),
                entries: in_use,
            });
        }

        let mut next = self.data.clone();
        let removed = next.categories.remove(index);
        self.commit(next)?;

        self.record(AuditEntry::delete(
            EntityType::Category,
            id.to_string(),
            Some(removed.title.clone()),
            &removed,
        ));

        Ok(removed)
    }

    // === Entries ===

    /// Append a new entry with a freshly generated id
    ///
    /// # Errors
    ///
    /// [`BudgetError::InvalidReference`] if `new.category` is unknown.
    pub fn add_entry(&mut self, new: NewEntry) -> BudgetResult<Entry> {
        self.check_reference(new.category)?;

        let mut entry = Entry::new(new);
        entry.title = entry.title.trim().to_string();
        entry
            .validate()
            .map_err(|e| BudgetError::Validation(e.to_string()))?;

        let mut next = self.data.clone();
        next.entries.push(entry.clone());
        self.commit(next)?;

        self.record(AuditEntry::create(
            EntityType::Entry,
            entry.id.to_string(),
            Some(entry.title.clone()),
            &entry,
        ));

        Ok(entry)
    }

    /// Replace every field of an existing entry except its id
    pub fn update_entry(&mut self, id: EntryId, new: NewEntry) -> BudgetResult<Entry> {
        let index = self.entry_index(id)?;
        self.check_reference(new.category)?;

        let before = self.data.entries[index].clone();
        let mut updated = before.clone();
        updated.apply(new);
        updated.title = updated.title.trim().to_string();
        updated
            .validate()
            .map_err(|e| BudgetError::Validation(e.to_string()))?;

        let mut next = self.data.clone();
        next.entries[index] = updated.clone();
        self.commit(next)?;

        self.record(AuditEntry::update(
            EntityType::Entry,
            id.to_string(),
            Some(updated.title.clone()),
            &before,
            &updated,
        ));

        Ok(updated)
    }

    /// Remove an entry
    pub fn delete_entry(&mut self, id: EntryId) -> BudgetResult<Entry> {
        let index = self.entry_index(id)?;

        let mut next = self.data.clone();
        let removed = next.entries.remove(index);
        self.commit(next)?;

        self.record(AuditEntry::delete(
            EntityType::Entry,
            id.to_string(),
            Some(removed.title.clone()),
            &removed,
        ));

        Ok(removed)
    }

    // === Whole aggregate ===

    /// Replace the whole aggregate, e.g. with a restored backup
    pub fn replace_data(&mut self, data: AppData) -> BudgetResult<()> {
        data.validate()
            .map_err(|e| BudgetError::Validation(e.to_string()))?;

        let summary = format!(
            "{} categories, {} entries",
            data.categories.len(),
            data.entries.len()
        );
        self.commit(data)?;
        self.record(AuditEntry::restore(summary));

        Ok(())
    }

    // === Audit ===

    /// Take the most recent audit write failure, if any
    ///
    /// Audit failures never undo a committed mutation; they are kept here
    /// for the caller to surface.
    pub fn take_audit_error(&mut self) -> Option<BudgetError> {
        self.audit_error.take()
    }

    pub fn audit_logger(&self) -> Option<&AuditLogger> {
        self.audit.as_ref()
    }

    // === Internals ===

    fn category_index(&self, id: CategoryId) -> BudgetResult<usize> {
        self.data
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| BudgetError::category_not_found(id.to_string()))
    }

    fn entry_index(&self, id: EntryId) -> BudgetResult<usize> {
        self.data
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| BudgetError::entry_not_found(id.to_string()))
    }

    fn check_reference(&self, category: CategoryId) -> BudgetResult<()> {
        if self.data.has_category(category) {
            Ok(())
        } else {
            Err(BudgetError::InvalidReference {
                category: category.to_string(),
            })
        }
    }

    fn persist(&self, data: &AppData) -> BudgetResult<()> {
        let json = if self.pretty_json {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        self.slot.write(DATA_KEY, &json)
    }

    /// Write `next` to the slot, then adopt it as the current state
    fn commit(&mut self, next: AppData) -> BudgetResult<()> {
        self.persist(&next)?;
        self.data = next;
        Ok(())
    }

    fn record(&mut self, entry: AuditEntry) {
        if let Some(logger) = &self.audit {
            if let Err(e) = logger.log(&entry) {
                self.audit_error = Some(e);
            }
        }
    }
}
