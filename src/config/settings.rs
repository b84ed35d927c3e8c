//! Store settings
//!
//! Controls how the document is written, whether mutations are audited and
//! how many backups are retained.

use serde::{Deserialize, Serialize};

use super::paths::BudgetPaths;
use crate::error::BudgetError;
use crate::storage::{read_json, write_json_atomic};

/// Newest settings layout this build understands
pub const SETTINGS_SCHEMA_VERSION: u32 = 1;

/// Backup retention settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRetention {
    /// Number of daily backups to keep
    pub daily_count: u32,
    /// Number of monthly backups to keep
    pub monthly_count: u32,
}

impl Default for BackupRetention {
    fn default() -> Self {
        Self {
            daily_count: 30,
            monthly_count: 12,
        }
    }
}

/// Settings for budget-store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Layout version of the settings file
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Record every mutation in the audit log
    #[serde(default = "default_true")]
    pub audit_enabled: bool,

    /// Indent the stored document
    #[serde(default = "default_true")]
    pub pretty_json: bool,

    /// Backup retention policy
    #[serde(default)]
    pub backup_retention: BackupRetention,
}

fn default_schema_version() -> u32 {
    SETTINGS_SCHEMA_VERSION
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            audit_enabled: true,
            pretty_json: true,
            backup_retention: BackupRetention::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or defaults if the file doesn't exist
    ///
    /// Defaults are not written; call [`Settings::save`] to persist them.
    /// A file written by a newer layout is rejected rather than half-read.
    pub fn load_or_create(paths: &BudgetPaths) -> Result<Self, BudgetError> {
        let settings: Self = read_json(paths.settings_file())
            .map_err(|e| BudgetError::Config(format!("Failed to load settings: {}", e)))?;

        if settings.schema_version > SETTINGS_SCHEMA_VERSION {
            return Err(BudgetError::Config(format!(
                "Settings schema version {} is newer than supported version {}",
                settings.schema_version, SETTINGS_SCHEMA_VERSION
            )));
        }

        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &BudgetPaths) -> Result<(), BudgetError> {
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }
}
