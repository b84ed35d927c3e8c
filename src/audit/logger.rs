//! Append-only audit log
//!
//! One JSON object per line. Lines are appended with a single write so a
//! crash can lose at most the entry being written.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{BudgetError, BudgetResult};
use crate::storage::read_text;

use super::entry::AuditEntry;

/// JSONL sink for the store's committed mutations
#[derive(Debug, Clone)]
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Append `entry` as one line
    pub fn log(&self, entry: &AuditEntry) -> BudgetResult<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');
        append(&self.log_path, line.as_bytes())
    }

    /// Every recorded entry, oldest first
    pub fn read_all(&self) -> BudgetResult<Vec<AuditEntry>> {
        let Some(text) = read_text(&self.log_path)? else {
            return Ok(Vec::new());
        };

        records(&text)
            .map(|(line_no, line)| {
                serde_json::from_str(line).map_err(|e| {
                    BudgetError::Json(format!("Bad audit record on line {}: {}", line_no, e))
                })
            })
            .collect()
    }

    /// The last `count` entries, oldest first
    pub fn read_recent(&self, count: usize) -> BudgetResult<Vec<AuditEntry>> {
        let mut entries = self.read_all()?;
        let start = entries.len().saturating_sub(count);
        Ok(entries.split_off(start))
    }

    /// Number of records without parsing them
    pub fn entry_count(&self) -> BudgetResult<usize> {
        Ok(read_text(&self.log_path)?
            .map(|text| records(&text).count())
            .unwrap_or(0))
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }
}

/// Non-blank lines with their 1-based line numbers
fn records(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| (i + 1, line))
}

fn append(path: &Path, bytes: &[u8]) -> BudgetResult<()> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| file.write_all(bytes))
        .map_err(|e| BudgetError::Io(format!("Failed to append to {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::{EntityType, Operation};
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_logger() -> (AuditLogger, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let logger = AuditLogger::new(temp_dir.path().join("audit.log"));
        (logger, temp_dir)
    }

    fn category_created(i: usize) -> AuditEntry {
        AuditEntry::create(
            EntityType::Category,
            format!("cat-{}", i),
            Some(format!("Category {}", i)),
            &json!({"title": format!("Category {}", i)}),
        )
    }

    #[test]
    fn test_log_and_read() {
        let (logger, _temp) = create_test_logger();
        logger.log(&category_created(0)).unwrap();

        let entries = logger.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].operation, Operation::Create);
        assert_eq!(entries[0].entity_type, EntityType::Category);
    }

    #[test]
    fn test_read_recent() {
        let (logger, _temp) = create_test_logger();
        for i in 0..10 {
            logger.log(&category_created(i)).unwrap();
        }

        assert_eq!(logger.entry_count().unwrap(), 10);

        let recent = logger.read_recent(3).unwrap();
        let ids: Vec<_> = recent.iter().map(|e| e.entity_id.as_str()).collect();
        assert_eq!(ids, ["cat-7", "cat-8", "cat-9"]);
    }

    #[test]
    fn test_empty_log() {
        let (logger, _temp) = create_test_logger();

        assert!(!logger.path().exists());
        assert_eq!(logger.entry_count().unwrap(), 0);
        assert!(logger.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_reopen_reads_previous_entries() {
        let (logger, temp) = create_test_logger();
        logger.log(&category_created(1)).unwrap();

        let reopened = AuditLogger::new(temp.path().join("audit.log"));
        assert_eq!(reopened.read_all().unwrap().len(), 1);
    }

    #[test]
    fn test_garbage_line_is_reported() {
        let (logger, _temp) = create_test_logger();
        std::fs::write(logger.path(), "{not json}\n").unwrap();

        let err = logger.read_all().unwrap_err();
        assert!(matches!(err, BudgetError::Json(_)));
    }
}
