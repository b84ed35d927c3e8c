//! Backup system for budget-store
//!
//! - `BackupManager`: writes dated snapshots of the aggregate and applies the
//!   retention policy.
//! - `RestoreManager`: validates a snapshot and replaces the store's
//!   aggregate with it.
//!
//! # Backup Format
//!
//! `backup-YYYYMMDD-HHMMSS-mmm.json` holding `schema_version`, `created_at`
//! and `data`, where `data` has exactly the stored document shape. Restores
//! also accept a bare document written by `export_document`.
//!
//! # Retention Policy
//!
//! By default 30 daily backups and 12 monthly backups (taken on the first
//! day of a month) are kept.

mod manager;
mod restore;

pub use manager::{BackupArchive, BackupInfo, BackupManager, BACKUP_SCHEMA_VERSION};
pub use restore::{RestoreManager, RestoreResult, ValidationResult};
