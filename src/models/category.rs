//! Suggested category labels per transaction type.
//!
//! Categories stay free-form; these lists only drive prompts and hints.
use crate::models::transaction::TransactionType;

pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Food",
    "Transport",
    "Health",
    "Education",
    "Leisure",
    "Bills",
    "Other",
];

pub const INCOME_CATEGORIES: &[&str] = &["Salary", "Freelance", "Investments", "Other"];

pub fn suggestions(transaction_type: TransactionType) -> &'static [&'static str] {
    match transaction_type {
        TransactionType::Expense => EXPENSE_CATEGORIES,
        TransactionType::Income => INCOME_CATEGORIES,
    }
}

pub fn is_suggested(transaction_type: TransactionType, category: &str) -> bool {
    suggestions(transaction_type)
        .iter()
        .any(|c| c.eq_ignore_ascii_case(category.trim()))
}
