//! Reports over the stored aggregate

pub mod monthly;

pub use monthly::{entries_in_month, CategoryMonthRow, MonthlySummary};
