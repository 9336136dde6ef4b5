//! Narrowing a transaction snapshot by month, category and free text.
//!
//! All functions borrow from the snapshot and keep its relative order.
use crate::error::ValidationError;
use crate::models::period::Period;
use crate::models::transaction::Transaction;
use std::collections::BTreeSet;

/// Active filters. An absent or empty criterion lets everything through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub month: Option<Period>,
    pub category: Option<String>,
    pub search_text: Option<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_month(mut self, month: Period) -> Self {
        self.month = Some(month);
        self
    }

    /// Parses `YYYY-MM`; an empty input or `all` clears the month filter.
    pub fn with_month_str(mut self, month: &str) -> Result<Self, ValidationError> {
        let month = month.trim();
        self.month = if month.is_empty() || month.eq_ignore_ascii_case("all") {
            None
        } else {
            Some(month.parse()?)
        };
        Ok(self)
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = non_empty(category.into());
        self
    }

    pub fn with_search_text(mut self, text: impl Into<String>) -> Self {
        self.search_text = non_empty(text.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.month.is_none() && self.category().is_none() && self.search_text().is_none()
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }

    fn search_text(&self) -> Option<&str> {
        self.search_text.as_deref().filter(|s| !s.is_empty())
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        if let Some(month) = self.month {
            if !month.contains(tx.date) {
                return false;
            }
        }

        if let Some(category) = self.category() {
            if tx.category != category {
                return false;
            }
        }

        if let Some(text) = self.search_text() {
            if !matches_text(tx, &text.to_lowercase()) {
                return false;
            }
        }

        true
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

// `needle` must already be lowercase.
fn matches_text(tx: &Transaction, needle: &str) -> bool {
    tx.description_or_empty().to_lowercase().contains(needle)
        || tx.category.to_lowercase().contains(needle)
}

pub fn filter<'a>(transactions: &'a [Transaction], criteria: &FilterCriteria) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|tx| criteria.matches(tx))
        .collect()
}

/// Quick search over description and category.
///
/// Unlike [`filter`], a blank term yields nothing rather than everything.
pub fn search<'a>(transactions: &'a [Transaction], term: &str) -> Vec<&'a Transaction> {
    let term = term.trim();
    if term.is_empty() {
        return Vec::new();
    }
    let needle = term.to_lowercase();
    transactions
        .iter()
        .filter(|tx| matches_text(tx, &needle))
        .collect()
}

/// Distinct months present in the snapshot, newest first.
pub fn available_months(transactions: &[Transaction]) -> Vec<Period> {
    let months: BTreeSet<Period> = transactions.iter().map(|tx| Period::of(tx.date)).collect();
    months.into_iter().rev().collect()
}

/// Distinct expense categories, sorted.
pub fn expense_categories(transactions: &[Transaction]) -> Vec<String> {
    let categories: BTreeSet<&str> = transactions
        .iter()
        .filter(|tx| tx.is_expense())
        .map(|tx| tx.category.as_str())
        .collect();
    categories.into_iter().map(str::to_string).collect()
}
