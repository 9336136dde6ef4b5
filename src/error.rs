//! Error types shared by the library and the `expman` binary.
//!
//! [`ValidationError`] is raised at the boundary, before a record is built.
//! The aggregation, filter and budget functions never return it.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid date '{0}'. Please use YYYY-MM-DD.")]
    InvalidDate(String),
    #[error("Invalid amount '{0}'. Please provide a valid decimal number.")]
    InvalidAmount(String),
    #[error("Amount cannot be negative: {0}")]
    NegativeAmount(String),
    #[error("Amount {amount} exceeds the maximum of {max}")]
    AmountTooLarge { amount: String, max: i64 },
    #[error("Invalid transaction type '{0}'. Use 'income' or 'expense'.")]
    InvalidKind(String),
    #[error("Category cannot be empty")]
    EmptyCategory,
    #[error("Category too long (max {max} characters)")]
    CategoryTooLong { max: usize },
    #[error("Description too long (max {max} characters)")]
    DescriptionTooLong { max: usize },
    #[error("Invalid period '{0}'. Please use YYYY-MM.")]
    InvalidPeriod(String),
    #[error("Budget limit must be greater than zero, got {0}")]
    NonPositiveLimit(String),
    #[error("Owner id cannot be empty")]
    MissingOwner,
    #[error("{0}")]
    InvalidInput(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0} not found")]
    NotFound(String),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("terminal error: {0}")]
    Terminal(String),
}
