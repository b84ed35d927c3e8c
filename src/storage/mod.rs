//! Storage layer for budget-store
//!
//! Provides the key-value slot abstraction the store persists into, plus
//! JSON file helpers with atomic writes and automatic directory creation.

pub mod file_io;
pub mod slot;

pub use file_io::{read_json, read_text, write_json_atomic, write_text_atomic};
pub use slot::{FileSlotStore, MemorySlotStore, SlotStore};

/// Fixed key the aggregate is stored under
pub const DATA_KEY: &str = "data";
