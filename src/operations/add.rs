use crate::db::store::Store;
use crate::error::{Result, ValidationError};
use crate::models::category;
use crate::models::transaction::{NewTransaction, Transaction, TransactionType};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

pub const INPUT_FORMAT: &str = "date(YYYY-MM-DD), description, amount, type(income/expense), category";

/// Parses `date, description, amount, type, category` into a validated
/// transaction. The description may be left empty.
pub fn parse_transaction(input: &str) -> std::result::Result<NewTransaction, ValidationError> {
    let detail_parts: Vec<&str> = input.trim().split(',').map(|s| s.trim()).collect();
    if detail_parts.len() != 5 {
        return Err(ValidationError::InvalidInput(format!(
            "Invalid number of details provided. Expected 5 details separated by commas but got {}",
            detail_parts.len()
        )));
    }

    let date = NaiveDate::parse_from_str(detail_parts[0], "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(detail_parts[0].to_string()))?;

    let amount = detail_parts[2]
        .parse::<Decimal>()
        .map_err(|_| ValidationError::InvalidAmount(detail_parts[2].to_string()))?;

    let transaction_type: TransactionType = detail_parts[3].parse()?;

    let category = detail_parts[4];
    if !category.is_empty() && !category::is_suggested(transaction_type, category) {
        debug!(category, kind = %transaction_type, "category outside the suggested set");
    }

    NewTransaction::new(
        transaction_type,
        category,
        amount,
        Some(detail_parts[1]),
        date,
    )
}

pub fn add_transaction_to_store<S: Store>(store: &mut S, owner_id: &str, input: &str) -> Result<Transaction> {
    let new_transaction = parse_transaction(input)?;
    store.create_transaction(owner_id, new_transaction)
}
