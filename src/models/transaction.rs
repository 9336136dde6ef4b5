use crate::error::ValidationError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

pub const MAX_DESCRIPTION_LEN: usize = 255;
pub const MAX_CATEGORY_LEN: usize = 50;
/// Largest amount or budget limit accepted, in whole currency units.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(ValidationError::InvalidKind(s.trim().to_string())),
        }
    }
}

/// A transaction that passed validation but has not been stored yet.
///
/// The persistence layer turns it into a [`Transaction`] by assigning an id
/// and the owning user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub transaction_type: TransactionType,
    pub category: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: NaiveDate,
}

impl NewTransaction {
    pub fn new(
        transaction_type: TransactionType,
        category: &str,
        amount: Decimal,
        description: Option<&str>,
        date: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let category = validate_category(category)?;

        if amount < Decimal::ZERO {
            return Err(ValidationError::NegativeAmount(amount.to_string()));
        }
        check_amount_cap(amount)?;

        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        if let Some(ref d) = description {
            if d.chars().count() > MAX_DESCRIPTION_LEN {
                return Err(ValidationError::DescriptionTooLong {
                    max: MAX_DESCRIPTION_LEN,
                });
            }
        }

        Ok(Self {
            transaction_type,
            category,
            amount,
            description,
            date,
        })
    }

    pub fn into_transaction(self, id: String, owner_id: String) -> Transaction {
        Transaction {
            id,
            owner_id,
            transaction_type: self.transaction_type,
            category: self.category,
            amount: self.amount,
            description: self.description,
            date: self.date,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub owner_id: String,
    pub transaction_type: TransactionType,
    pub category: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: NaiveDate,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }

    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }

    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

pub(crate) fn check_amount_cap(amount: Decimal) -> Result<(), ValidationError> {
    if amount > Decimal::from(MAX_AMOUNT) {
        return Err(ValidationError::AmountTooLarge {
            amount: amount.to_string(),
            max: MAX_AMOUNT,
        });
    }
    Ok(())
}

pub(crate) fn validate_category(category: &str) -> Result<String, ValidationError> {
    let category = category.trim();
    if category.is_empty() {
        return Err(ValidationError::EmptyCategory);
    }
    if category.chars().count() > MAX_CATEGORY_LEN {
        return Err(ValidationError::CategoryTooLong {
            max: MAX_CATEGORY_LEN,
        });
    }
    Ok(category.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    }

    #[test]
    fn test_new_transaction_trims_fields() {
        let tx = NewTransaction::new(
            TransactionType::Expense,
            "  Food ",
            Decimal::new(3000, 2),
            Some("  lunch  "),
            date(),
        )
        .unwrap();

        assert_eq!(tx.category, "Food");
        assert_eq!(tx.description.as_deref(), Some("lunch"));
    }

    #[test]
    fn test_blank_description_becomes_none() {
        let tx = NewTransaction::new(
            TransactionType::Income,
            "Salary",
            Decimal::new(1000, 0),
            Some("   "),
            date(),
        )
        .unwrap();
        assert_eq!(tx.description, None);
    }

    #[test]
    fn test_zero_amount_is_allowed() {
        let result = NewTransaction::new(TransactionType::Expense, "Food", Decimal::ZERO, None, date());
        assert!(result.is_ok());
    }

    #[test]
    fn test_negative_amount_rejected() {
        let result = NewTransaction::new(
            TransactionType::Expense,
            "Food",
            Decimal::new(-1, 0),
            None,
            date(),
        );
        assert_eq!(
            result.unwrap_err(),
            ValidationError::NegativeAmount("-1".to_string())
        );
    }

    #[test]
    fn test_amount_above_cap_rejected() {
        let at_cap = Decimal::from(MAX_AMOUNT);
        assert!(NewTransaction::new(TransactionType::Expense, "Food", at_cap, None, date()).is_ok());

        let huge = Decimal::from_str("50000000000000000000000000000").unwrap();
        let result = NewTransaction::new(TransactionType::Expense, "Food", huge, None, date());
        assert!(matches!(result, Err(ValidationError::AmountTooLarge { .. })));

        let result = NewTransaction::new(
            TransactionType::Income,
            "Salary",
            at_cap + Decimal::new(1, 2),
            None,
            date(),
        );
        assert!(matches!(result, Err(ValidationError::AmountTooLarge { .. })));
    }

    #[test]
    fn test_empty_category_rejected() {
        let result = NewTransaction::new(TransactionType::Expense, " ", Decimal::ONE, None, date());
        assert_eq!(result.unwrap_err(), ValidationError::EmptyCategory);
    }

    #[test]
    fn test_long_fields_rejected() {
        let long_category = "x".repeat(MAX_CATEGORY_LEN + 1);
        let result =
            NewTransaction::new(TransactionType::Expense, &long_category, Decimal::ONE, None, date());
        assert!(matches!(result, Err(ValidationError::CategoryTooLong { .. })));

        let long_description = "y".repeat(MAX_DESCRIPTION_LEN + 1);
        let result = NewTransaction::new(
            TransactionType::Expense,
            "Food",
            Decimal::ONE,
            Some(&long_description),
            date(),
        );
        assert!(matches!(result, Err(ValidationError::DescriptionTooLong { .. })));
    }

    #[test]
    fn test_transaction_type_parsing() {
        assert_eq!("Income".parse::<TransactionType>().unwrap(), TransactionType::Income);
        assert_eq!(" EXPENSE ".parse::<TransactionType>().unwrap(), TransactionType::Expense);
        assert!("transfer".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_into_transaction_assigns_id_and_owner() {
        let tx = NewTransaction::new(TransactionType::Expense, "Food", Decimal::ONE, None, date())
            .unwrap()
            .into_transaction("abc".to_string(), "user-1".to_string());

        assert_eq!(tx.id, "abc");
        assert_eq!(tx.owner_id, "user-1");
        assert!(tx.is_expense());
        assert_eq!(tx.description_or_empty(), "");
    }
}
