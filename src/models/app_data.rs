//! The aggregate root persisted as one document
//!
//! `AppData` is always written and read as a whole. `validate` checks the
//! invariants that serde cannot express: unique ids and entries that point at
//! existing categories.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::category::Category;
use super::entry::Entry;
use super::general::General;
use super::ids::{CategoryId, EntryId};

/// All categories, entries and the settings record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppData {
    pub categories: Vec<Category>,
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub general: General,
}

impl AppData {
    /// Parse and validate a stored document
    pub fn from_json(json: &str) -> Result<Self, AppDataError> {
        let data: AppData =
            serde_json::from_str(json).map_err(|e| AppDataError::Malformed(e.to_string()))?;
        data.validate()?;
        Ok(data)
    }

    /// Check id uniqueness and category references
    pub fn validate(&self) -> Result<(), AppDataError> {
        let mut category_ids = HashSet::with_capacity(self.categories.len());
        for category in &self.categories {
            if !category_ids.insert(category.id) {
                return Err(AppDataError::DuplicateCategory(category.id));
            }
        }

        let mut entry_ids = HashSet::with_capacity(self.entries.len());
        for entry in &self.entries {
            if !entry_ids.insert(entry.id) {
                return Err(AppDataError::DuplicateEntry(entry.id));
            }
            if !category_ids.contains(&entry.category) {
                return Err(AppDataError::DanglingReference {
                    entry: entry.id,
                    category: entry.category,
                });
            }
        }

        Ok(())
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn has_category(&self, id: CategoryId) -> bool {
        self.category(id).is_some()
    }

    /// Entries booked against a category, in stored order
    pub fn entries_for_category(&self, id: CategoryId) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(move |e| e.category == id)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.entries.is_empty()
    }
}

/// Reasons a stored document is rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppDataError {
    Malformed(String),
    DuplicateCategory(CategoryId),
    DuplicateEntry(EntryId),
    DanglingReference { entry: EntryId, category: CategoryId },
}

impl std::fmt::Display for AppDataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(msg) => write!(f, "malformed document: {}", msg),
            Self::DuplicateCategory(id) => write!(f, "duplicate category id {}", id),
            Self::DuplicateEntry(id) => write!(f, "duplicate entry id {}", id),
            Self::DanglingReference { entry, category } => write!(
                f,
                "entry {} references missing category {}",
                entry, category
            ),
        }
    }
}

impl std::error::Error for AppDataError {}
