//! Path management for budget-store
//!
//! ## Path Resolution Order
//!
//! 1. `BUDGET_STORE_DATA_DIR` environment variable (if set)
//! 2. The platform config directory (`$XDG_CONFIG_HOME` or `~/.config` on
//!    Unix, `%APPDATA%` on Windows) joined with `budget-store`

use std::path::PathBuf;

use directories::BaseDirs;

use crate::error::BudgetError;
use crate::storage::FileSlotStore;

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "BUDGET_STORE_DATA_DIR";

/// Manages all paths used by budget-store
#[derive(Debug, Clone)]
pub struct BudgetPaths {
    base_dir: PathBuf,
}

impl BudgetPaths {
    /// Resolve the base directory from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, BudgetError> {
        let base_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create BudgetPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Directory holding the slot files (`<base>/data/`)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Directory holding backups (`<base>/backups/`)
    pub fn backup_dir(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    /// Path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Path to the audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// A slot store over the data directory
    pub fn slot_store(&self) -> FileSlotStore {
        FileSlotStore::new(self.data_dir())
    }

    /// Ensure the base, data and backup directories exist
    pub fn ensure_directories(&self) -> Result<(), BudgetError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| BudgetError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| BudgetError::Io(format!("Failed to create data directory: {}", e)))?;

        std::fs::create_dir_all(self.backup_dir())
            .map_err(|e| BudgetError::Io(format!("Failed to create backup directory: {}", e)))?;

        Ok(())
    }
}

fn resolve_default_path() -> Result<PathBuf, BudgetError> {
    let dirs = BaseDirs::new()
        .ok_or_else(|| BudgetError::Config("Could not determine home directory".into()))?;
    Ok(dirs.config_dir().join("budget-store"))
}
