use crate::error::{AppError, Result};
use crate::models::transaction::{Transaction, TransactionType};
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use std::str::FromStr;

pub fn add_transaction(conn: &Connection, transaction: &Transaction) -> Result<()> {
    conn.execute(
        "INSERT INTO transactions (id, owner_id, date, description, amount, transaction_type, category)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            &transaction.id,
            &transaction.owner_id,
            transaction.date.to_string(),
            &transaction.description,
            transaction.amount.to_string(),
            transaction.transaction_type.as_str(),
            &transaction.category,
        ],
    )?;
    Ok(())
}

/// All transactions of one owner, newest date first.
pub fn get_transactions_for_owner(conn: &Connection, owner_id: &str) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, date, description, amount, transaction_type, category
         FROM transactions
         WHERE owner_id = ?1
         ORDER BY date DESC, rowid ASC",
    )?;

    let transactions = stmt
        .query_map([owner_id], row_to_transaction)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(transactions)
}

pub fn remove_transaction(conn: &Connection, owner_id: &str, id: &str) -> Result<()> {
    let rows_affected = conn.execute(
        "DELETE FROM transactions WHERE id = ?1 AND owner_id = ?2",
        [id, owner_id],
    )?;

    if rows_affected == 0 {
        return Err(AppError::NotFound(format!("Transaction with ID {}", id)));
    }
    Ok(())
}

fn row_to_transaction(row: &Row) -> rusqlite::Result<Transaction> {
    let date_str: String = row.get(2)?;
    let amount_str: String = row.get(4)?;
    let transaction_type_str: String = row.get(5)?;

    Ok(Transaction {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
            .map_err(|e| conversion_error(2, e))?,
        description: row.get(3)?,
        amount: Decimal::from_str(&amount_str).map_err(|e| conversion_error(4, e))?,
        transaction_type: TransactionType::from_str(&transaction_type_str)
            .map_err(|e| conversion_error(5, e))?,
        category: row.get(6)?,
    })
}

pub(crate) fn conversion_error<E>(column: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(err))
}
