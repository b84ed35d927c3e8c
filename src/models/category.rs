//! Category model
//!
//! A category is a named spending bucket that entries reference by id.
//! It may carry a budgeted amount.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CategoryId;
use super::money::Money;

/// A spending category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique, stable identifier
    pub id: CategoryId,

    /// Display title
    pub title: String,

    /// Budgeted amount for the category, if one was set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
}

impl Category {
    /// Create a new category with a fresh id
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: CategoryId::new(),
            title: title.into(),
            amount: None,
        }
    }

    /// Create a new category with a budgeted amount
    pub fn with_amount(title: impl Into<String>, amount: Option<Money>) -> Self {
        let mut category = Self::new(title);
        category.amount = amount;
        category
    }

    /// Validate the category
    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        if self.title.trim().is_empty() {
            return Err(CategoryValidationError::EmptyTitle);
        }

        Ok(())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyTitle,
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Category title cannot be empty"),
        }
    }
}

impl std::error::Error for CategoryValidationError {}
