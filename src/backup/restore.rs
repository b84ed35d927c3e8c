//! Backup restoration
//!
//! Reads a backup archive (or a bare exported document), validates it the
//! same way the store validates its slot, and hands it to the store.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{BudgetError, BudgetResult};
use crate::models::AppData;
use crate::storage::SlotStore;
use crate::store::BudgetStore;

use super::manager::BackupArchive;

/// Either of the two file formats a restore accepts
#[derive(Deserialize)]
#[serde(untagged)]
enum BackupFile {
    Archive(BackupArchive),
    Document(AppData),
}

/// Handles restoring from backups
#[derive(Debug, Default)]
pub struct RestoreManager;

impl RestoreManager {
    pub fn new() -> Self {
        Self
    }

    /// Read and validate a backup file without touching the store
    ///
    /// # Errors
    ///
    /// [`BudgetError::CorruptState`] if the file is neither a valid archive
    /// nor a valid document.
    pub fn read_backup(
        &self,
        backup_path: &Path,
    ) -> BudgetResult<(AppData, Option<DateTime<Utc>>)> {
        let contents = fs::read_to_string(backup_path)
            .map_err(|e| BudgetError::Io(format!("Failed to read backup file: {}", e)))?;

        let file: BackupFile = serde_json::from_str(&contents).map_err(|e| {
            BudgetError::CorruptState(format!(
                "{} is not a backup: {}",
                backup_path.display(),
                e
            ))
        })?;

        let (data, created_at) = match file {
            BackupFile::Archive(archive) => (archive.data, Some(archive.created_at)),
            BackupFile::Document(data) => (data, None),
        };

        data.validate()
            .map_err(|e| BudgetError::CorruptState(e.to_string()))?;

        Ok((data, created_at))
    }

    /// Validate a backup file and report what it contains
    pub fn validate_backup(&self, backup_path: &Path) -> BudgetResult<ValidationResult> {
        let (data, backup_date) = self.read_backup(backup_path)?;
        Ok(ValidationResult {
            backup_date,
            category_count: data.categories.len(),
            entry_count: data.entries.len(),
        })
    }

    /// Replace the store's aggregate with the backup's contents
    pub fn restore_from_file<S: SlotStore>(
        &self,
        store: &mut BudgetStore<S>,
        backup_path: &Path,
    ) -> BudgetResult<RestoreResult> {
        let (data, backup_date) = self.read_backup(backup_path)?;

        let result = RestoreResult {
            backup_date,
            categories_restored: data.categories.len(),
            entries_restored: data.entries.len(),
        };
        store.replace_data(data)?;

        Ok(result)
    }
}

/// Contents of a backup that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// `None` for bare exported documents
    pub backup_date: Option<DateTime<Utc>>,
    pub category_count: usize,
    pub entry_count: usize,
}

/// Result of a restore operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreResult {
    pub backup_date: Option<DateTime<Utc>>,
    pub categories_restored: usize,
    pub entries_restored: usize,
}

impl RestoreResult {
    pub fn summary(&self) -> String {
        format!(
            "Restored {} categories and {} entries",
            self.categories_restored, self.entries_restored
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::BackupManager;
    use crate::config::BackupRetention;
    use crate::models::{EntryDate, Money, NewEntry};
    use crate::storage::MemorySlotStore;
    use tempfile::TempDir;

    fn populated_store() -> BudgetStore<MemorySlotStore> {
        let mut store = BudgetStore::open(MemorySlotStore::new()).unwrap();
        let category = store.add_category("Groceries", None).unwrap();
        store
            .add_entry(NewEntry::new(
                "Milk",
                category.id,
                EntryDate::from_ymd(2024, 1, 1).unwrap(),
                Money::from_i64(5),
            ))
            .unwrap();
        store
    }

    #[test]
    fn test_backup_then_restore() {
        let temp_dir = TempDir::new().unwrap();
        let manager = BackupManager::new(temp_dir.path().to_path_buf(), BackupRetention::default());

        let source = populated_store();
        let path = manager.create_backup(source.data()).unwrap();

        let mut target = BudgetStore::open(MemorySlotStore::new()).unwrap();
        let result = RestoreManager::new()
            .restore_from_file(&mut target, &path)
            .unwrap();

        assert_eq!(result.categories_restored, 1);
        assert_eq!(result.entries_restored, 1);
        assert!(result.backup_date.is_some());
        assert_eq!(target.data(), source.data());
    }

    #[test]
    fn test_restore_bare_document() {
        let temp_dir = TempDir::new().unwrap();
        let manager = BackupManager::new(temp_dir.path().to_path_buf(), BackupRetention::default());
        let source = populated_store();
        let path = temp_dir.path().join("export.json");
        manager.export_document(source.data(), &path).unwrap();

        let validation = RestoreManager::new().validate_backup(&path).unwrap();
        assert_eq!(validation.backup_date, None);
        assert_eq!(validation.entry_count, 1);
    }

    #[test]
    fn test_invalid_backup_leaves_store_alone() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("backup-20240101-000000.json");
        fs::write(&path, r#"{"categories": "nope"}"#).unwrap();

        let mut store = populated_store();
        let before = store.snapshot();

        let err = RestoreManager::new()
            .restore_from_file(&mut store, &path)
            .unwrap_err();
        assert!(err.is_corrupt_state());
        assert_eq!(*store.data(), before);
    }

    #[test]
    fn test_dangling_reference_in_backup_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut data = populated_store().snapshot();
        data.categories.clear();
        let path = temp_dir.path().join("export.json");
        fs::write(&path, serde_json::to_string(&data).unwrap()).unwrap();

        let err = RestoreManager::new().read_backup(&path).unwrap_err();
        assert!(err.is_corrupt_state());
    }
}
