//! Backup manager
//!
//! Writes dated snapshots of the aggregate and prunes old ones according to
//! the retention policy.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::settings::BackupRetention;
use crate::error::{BudgetError, BudgetResult};
use crate::models::AppData;
use crate::storage::write_json_atomic;

/// Current backup archive schema
pub const BACKUP_SCHEMA_VERSION: u32 = 1;

/// Metadata about a backup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupInfo {
    pub filename: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub size_bytes: u64,
    /// Taken on the first day of a month; kept under the monthly count
    pub is_monthly: bool,
}

/// Backup archive format
///
/// `data` is the stored document, unchanged in shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupArchive {
    pub schema_version: u32,
    pub created_at: DateTime<Utc>,
    pub data: AppData,
}

/// Manages backup creation and retention
pub struct BackupManager {
    backup_dir: PathBuf,
    retention: BackupRetention,
}

impl BackupManager {
    pub fn new(backup_dir: PathBuf, retention: BackupRetention) -> Self {
        Self {
            backup_dir,
            retention,
        }
    }

    /// Write a backup of `data` and return its path
    pub fn create_backup(&self, data: &AppData) -> BudgetResult<PathBuf> {
        fs::create_dir_all(&self.backup_dir)
            .map_err(|e| BudgetError::Io(format!("Failed to create backup directory: {}", e)))?;

        let now = Utc::now();
        let filename = format!(
            "backup-{}-{:03}.json",
            now.format("%Y%m%d-%H%M%S"),
            now.timestamp_subsec_millis()
        );
        let backup_path = self.backup_dir.join(&filename);

        let archive = BackupArchive {
            schema_version: BACKUP_SCHEMA_VERSION,
            created_at: now,
            data: data.clone(),
        };
        write_json_atomic(&backup_path, &archive)?;

        Ok(backup_path)
    }

    /// Write `data` as a bare document, readable by anything that reads the slot
    pub fn export_document(&self, data: &AppData, path: &Path) -> BudgetResult<()> {
        write_json_atomic(path, data)
    }

    /// List all backups, newest first
    pub fn list_backups(&self) -> BudgetResult<Vec<BackupInfo>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();

        for entry in fs::read_dir(&self.backup_dir)
            .map_err(|e| BudgetError::Io(format!("Failed to read backup directory: {}", e)))?
        {
            let entry = entry
                .map_err(|e| BudgetError::Io(format!("Failed to read directory entry: {}", e)))?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(info) = parse_backup_info(&path) {
                    backups.push(info);
                }
            }
        }

        backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(backups)
    }

    /// Delete backups beyond the retention counts; returns deleted paths
    pub fn enforce_retention(&self) -> BudgetResult<Vec<PathBuf>> {
        let backups = self.list_backups()?;
        let mut deleted = Vec::new();

        let (monthly, daily): (Vec<_>, Vec<_>) = backups.into_iter().partition(|b| b.is_monthly);

        let expired = daily
            .into_iter()
            .skip(self.retention.daily_count as usize)
            .chain(monthly.into_iter().skip(self.retention.monthly_count as usize));

        for backup in expired {
            fs::remove_file(&backup.path)
                .map_err(|e| BudgetError::Io(format!("Failed to delete old backup: {}", e)))?;
            deleted.push(backup.path);
        }

        Ok(deleted)
    }

    /// Create a backup and then enforce retention policy
    pub fn create_backup_with_retention(
        &self,
        data: &AppData,
    ) -> BudgetResult<(PathBuf, Vec<PathBuf>)> {
        let backup_path = self.create_backup(data)?;
        let deleted = self.enforce_retention()?;
        Ok((backup_path, deleted))
    }

    pub fn backup_dir(&self) -> &PathBuf {
        &self.backup_dir
    }

    pub fn get_latest_backup(&self) -> BudgetResult<Option<BackupInfo>> {
        Ok(self.list_backups()?.into_iter().next())
    }
}

fn parse_backup_info(path: &Path) -> Option<BackupInfo> {
    let filename = path.file_name()?.to_string_lossy().to_string();
    let date_part = filename.strip_prefix("backup-")?.strip_suffix(".json")?;
    let created_at = parse_backup_timestamp(date_part)?;
    let size_bytes = fs::metadata(path).ok()?.len();

    Some(BackupInfo {
        filename,
        path: path.to_path_buf(),
        created_at,
        size_bytes,
        is_monthly: created_at.day() == 1,
    })
}

/// Parse `YYYYMMDD-HHMMSS` or `YYYYMMDD-HHMMSS-mmm`
fn parse_backup_timestamp(date_str: &str) -> Option<DateTime<Utc>> {
    let parts: Vec<&str> = date_str.split('-').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return None;
    }

    let (date_part, time_part) = (parts[0], parts[1]);
    if date_part.len() != 8 || time_part.len() != 6 {
        return None;
    }
    let millis: u32 = match parts.get(2) {
        Some(m) => m.parse().ok()?,
        None => 0,
    };

    let year: i32 = date_part[0..4].parse().ok()?;
    let month: u32 = date_part[4..6].parse().ok()?;
    let day: u32 = date_part[6..8].parse().ok()?;
    let hour: u32 = time_part[0..2].parse().ok()?;
    let minute: u32 = time_part[2..4].parse().ok()?;
    let second: u32 = time_part[4..6].parse().ok()?;

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_milli_opt(hour, minute, second, millis)?;

    Some(DateTime::from_naive_utc_and_offset(date.and_time(time), Utc))
}
