//! CSV export of a transaction list.
use crate::config::{AppConfig, Language};
use crate::error::{AppError, Result};
use crate::models::period::Period;
use crate::models::transaction::{Transaction, TransactionType};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub language: Language,
    pub currency_symbol: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            language: Language::En,
            currency_symbol: "Kz".to_string(),
        }
    }
}

impl From<&AppConfig> for ExportOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            language: config.language,
            currency_symbol: config.currency_symbol.clone(),
        }
    }
}

pub fn header(language: Language) -> [&'static str; 5] {
    match language {
        Language::En => ["Date", "Type", "Category", "Description", "Amount"],
        Language::Pt => ["Data", "Tipo", "Categoria", "Descrição", "Valor"],
    }
}

pub fn type_label(language: Language, transaction_type: TransactionType) -> &'static str {
    match (language, transaction_type) {
        (Language::En, TransactionType::Income) => "Income",
        (Language::En, TransactionType::Expense) => "Expense",
        (Language::Pt, TransactionType::Income) => "Receita",
        (Language::Pt, TransactionType::Expense) => "Despesa",
    }
}

/// Rounds half away from zero to two places and always prints both digits.
pub fn format_amount(currency_symbol: &str, amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{} {:.2}", currency_symbol, rounded)
}

pub fn to_csv<'a, I>(transactions: I, options: &ExportOptions) -> Result<String>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(header(options.language))?;
    for tx in transactions {
        writer.write_record([
            tx.date.format("%Y-%m-%d").to_string(),
            type_label(options.language, tx.transaction_type).to_string(),
            tx.category.clone(),
            tx.description_or_empty().to_string(),
            format_amount(&options.currency_symbol, tx.amount),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| AppError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// `expenses-YYYY-MM.csv`, or `expenses-all.csv` without a period.
pub fn export_file_name(period: Option<Period>) -> String {
    match period {
        Some(period) => format!("expenses-{}.csv", period),
        None => "expenses-all.csv".to_string(),
    }
}

/// Writes the CSV to `path` and returns the number of data rows.
pub fn write_csv<'a, I>(path: &Path, transactions: I, options: &ExportOptions) -> Result<usize>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let transactions: Vec<&Transaction> = transactions.into_iter().collect();
    let contents = to_csv(transactions.iter().copied(), options)?;
    fs::write(path, contents)?;
    Ok(transactions.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn create_test_transaction(
        kind: TransactionType,
        category: &str,
        amount: &str,
        description: Option<&str>,
        date: &str,
    ) -> Transaction {
        Transaction {
            id: format!("{}-{}", category, date),
            owner_id: "owner".to_string(),
            transaction_type: kind,
            category: category.to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            description: description.map(str::to_string),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        }
    }

    fn scenario() -> Vec<Transaction> {
        vec![
            create_test_transaction(TransactionType::Expense, "Food", "30", None, "2024-01-05"),
            create_test_transaction(TransactionType::Income, "Salary", "1000", Some("January"), "2024-01-01"),
            create_test_transaction(TransactionType::Expense, "Food", "20", None, "2024-01-06"),
        ]
    }

    #[test]
    fn test_scenario_export() {
        let csv = to_csv(&scenario(), &ExportOptions::default()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Date,Type,Category,Description,Amount",
                "2024-01-05,Expense,Food,,Kz 30.00",
                "2024-01-01,Income,Salary,January,Kz 1000.00",
                "2024-01-06,Expense,Food,,Kz 20.00",
            ]
        );
    }

    #[test]
    fn test_empty_export_has_header_only() {
        let csv = to_csv(&[], &ExportOptions::default()).unwrap();
        assert_eq!(csv, "Date,Type,Category,Description,Amount\n");
    }

    #[test]
    fn test_portuguese_labels() {
        let options = ExportOptions {
            language: Language::Pt,
            currency_symbol: "Kz".to_string(),
        };
        let csv = to_csv(&scenario(), &options).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Data,Tipo,Categoria,Descrição,Valor"));
        assert_eq!(lines.next(), Some("2024-01-05,Despesa,Food,,Kz 30.00"));
        assert_eq!(lines.next(), Some("2024-01-01,Receita,Salary,January,Kz 1000.00"));
    }

    #[test]
    fn test_commas_and_quotes_are_escaped() {
        let transactions = vec![create_test_transaction(
            TransactionType::Expense,
            "Food",
            "12.5",
            Some("Pizza, \"large\""),
            "2024-01-05",
        )];
        let csv = to_csv(&transactions, &ExportOptions::default()).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, "2024-01-05,Expense,Food,\"Pizza, \"\"large\"\"\",Kz 12.50");

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(record.len(), 5);
        assert_eq!(&record[3], "Pizza, \"large\"");
    }

    #[test]
    fn test_format_amount_rounds_to_two_places() {
        assert_eq!(format_amount("Kz", Decimal::from_str("0.005").unwrap()), "Kz 0.01");
        assert_eq!(format_amount("Kz", Decimal::from_str("26.125").unwrap()), "Kz 26.13");
        assert_eq!(format_amount("$", Decimal::from(7)), "$ 7.00");
        assert_eq!(format_amount("Kz", Decimal::from_str("-3.1").unwrap()), "Kz -3.10");
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name(Some("2024-01".parse().unwrap())), "expenses-2024-01.csv");
        assert_eq!(export_file_name(None), "expenses-all.csv");
    }

    #[test]
    fn test_write_csv_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(export_file_name(None));
        let transactions = scenario();

        let rows = write_csv(&path, &transactions, &ExportOptions::default()).unwrap();
        assert_eq!(rows, 3);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 4);
    }

    #[test]
    fn test_write_csv_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let result = write_csv(&path, &scenario(), &ExportOptions::default());
        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
