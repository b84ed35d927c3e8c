//! Audit logging for budget-store
//!
//! Every committed mutation of the store is recorded with before/after
//! snapshots in an append-only, line-delimited JSON log.
//!
//! - `AuditEntry`: one record (timestamp, operation, entity, snapshots).
//! - `AuditLogger`: appends records to the log file and reads them back.
//! - `generate_diff`: short description of changed fields for updates.

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
