//! Configuration module for budget-store
//!
//! - Platform-aware path resolution
//! - Store settings persistence

pub mod paths;
pub mod settings;

pub use paths::BudgetPaths;
pub use settings::{BackupRetention, Settings, SETTINGS_SCHEMA_VERSION};
