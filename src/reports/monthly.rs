//! Monthly report
//!
//! Entries for one calendar month, with per-category totals compared against
//! each category's budgeted amount.

use chrono::Datelike;

use crate::error::{BudgetError, BudgetResult};
use crate::models::{AppData, CategoryId, Entry, Money};

/// Entries dated within `year`-`month`, oldest first
///
/// Entries sharing a date keep their stored order.
pub fn entries_in_month(data: &AppData, year: i32, month: u32) -> Vec<&Entry> {
    let mut entries: Vec<&Entry> = data
        .entries
        .iter()
        .filter(|e| {
            let date = e.date.date();
            date.year() == year && date.month() == month
        })
        .collect();
    entries.sort_by_key(|e| e.date.date());
    entries
}

/// One category's line in the monthly report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMonthRow {
    pub category_id: CategoryId,
    pub title: String,
    /// Budgeted amount, if the category has one
    pub budgeted: Option<Money>,
    /// Sum of the month's entry amounts
    pub total: Money,
    /// Budgeted minus total; `None` for categories without a budget
    pub remaining: Option<Money>,
    pub entry_count: usize,
}

impl CategoryMonthRow {
    pub fn is_over_budget(&self) -> bool {
        self.remaining.is_some_and(|r| r.is_negative())
    }
}

/// Per-category totals for one month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    /// One row per category, in stored category order
    pub rows: Vec<CategoryMonthRow>,
    pub total: Money,
    pub entry_count: usize,
}

impl MonthlySummary {
    /// Build the summary for `year`-`month`
    ///
    /// # Errors
    ///
    /// [`BudgetError::Validation`] if `month` is not in 1..=12, or if a total
    /// does not fit in the amount range.
    pub fn generate(data: &AppData, year: i32, month: u32) -> BudgetResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(BudgetError::Validation(format!(
                "Month must be between 1 and 12, got {}",
                month
            )));
        }

        let entries = entries_in_month(data, year, month);

        let rows = data
            .categories
            .iter()
            .map(|category| -> BudgetResult<CategoryMonthRow> {
                let booked: Vec<&&Entry> = entries
                    .iter()
                    .filter(|e| e.category == category.id)
                    .collect();
                let total = sum_amounts(booked.iter().map(|e| e.amount), &category.title)?;
                let remaining = category
                    .amount
                    .map(|budgeted| {
                        budgeted
                            .checked_sub(total)
                            .ok_or_else(|| overflow(&category.title))
                    })
                    .transpose()?;
                Ok(CategoryMonthRow {
                    category_id: category.id,
                    title: category.title.clone(),
                    budgeted: category.amount,
                    total,
                    remaining,
                    entry_count: booked.len(),
                })
            })
            .collect::<BudgetResult<Vec<_>>>()?;

        Ok(Self {
            year,
            month,
            total: sum_amounts(entries.iter().map(|e| e.amount), "the month")?,
            entry_count: entries.len(),
            rows,
        })
    }

    /// Row for a single category
    pub fn row(&self, id: CategoryId) -> Option<&CategoryMonthRow> {
        self.rows.iter().find(|r| r.category_id == id)
    }

    /// Categories whose total exceeds their budgeted amount
    pub fn over_budget(&self) -> impl Iterator<Item = &CategoryMonthRow> {
        self.rows.iter().filter(|r| r.is_over_budget())
    }
}

fn sum_amounts(amounts: impl Iterator<Item = Money>, what: &str) -> BudgetResult<Money> {
    Money::checked_sum(amounts).ok_or_else(|| overflow(what))
}

fn overflow(what: &str) -> BudgetError {
    BudgetError::Validation(format!("Total for {} is out of range", what))
}
