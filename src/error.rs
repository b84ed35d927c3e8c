//! Custom error types for budget-store
//!
//! This module defines the error hierarchy for the store using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for budget-store operations
#[derive(Error, Debug)]
pub enum BudgetError {
    /// Stored document exists but is unparsable or violates invariants
    #[error("Corrupt state: {0}")]
    CorruptState(String),

    /// Category still referenced by entries
    #[error("Category is in use: {category} is referenced by {entries} entries")]
    CategoryInUse { category: String, entries: usize },

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Entry points at a category that does not exist
    #[error("Invalid reference: category {category} does not exist")]
    InvalidReference { category: String },

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl BudgetError {
    /// Create a "not found" error for categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for entries
    pub fn entry_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Entry",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error came from loading a damaged document
    pub fn is_corrupt_state(&self) -> bool {
        matches!(self, Self::CorruptState(_))
    }
}

impl From<std::io::Error> for BudgetError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BudgetError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for budget-store operations
pub type BudgetResult<T> = Result<T, BudgetError>;
