//! Core data models for budget-store
//!
//! This module contains the data structures persisted by the store:
//! categories, entries, the general settings record and the aggregate that
//! holds them.

pub mod app_data;
pub mod category;
pub mod entry;
pub mod general;
pub mod ids;
pub mod money;

pub use app_data::{AppData, AppDataError};
pub use category::{Category, CategoryValidationError};
pub use entry::{Entry, EntryDate, EntryValidationError, NewEntry};
pub use general::{General, GeneralPatch};
pub use ids::{CategoryId, EntryId};
pub use money::Money;
