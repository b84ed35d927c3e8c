//! budget-store - offline personal budgeting data store
//!
//! This library owns the budget dataset (spending categories, dated entries
//! and a small settings record), keeps it internally consistent, and writes
//! the whole aggregate to a local key-value slot after every change so the
//! application works without a network.
//!
//! # Architecture
//!
//! - `models`: the persisted data types and the `AppData` aggregate
//! - `store`: `BudgetStore`, the only component that mutates the aggregate
//! - `storage`: key-value slots (file-backed or in memory) and atomic writes
//! - `config`: path resolution and store settings
//! - `audit`: append-only log of committed mutations
//! - `backup`: dated snapshots and validated restore
//! - `reports`: monthly views over the aggregate
//! - `error`: custom error types
//!
//! # Example
//!
//! ```rust,ignore
//! use budget_store::config::{BudgetPaths, Settings};
//! use budget_store::store::BudgetStore;
//!
//! let paths = BudgetPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let mut store = BudgetStore::open_default(&paths, &settings)?;
//! let groceries = store.add_category("Groceries", None)?;
//! ```

pub mod audit;
pub mod backup;
pub mod config;
pub mod error;
pub mod models;
pub mod reports;
pub mod storage;
pub mod store;

pub use error::{BudgetError, BudgetResult};
pub use store::{BudgetStore, SharedStore, StoreOptions};
