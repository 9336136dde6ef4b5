use crate::error::ValidationError;
use crate::models::transaction::{check_amount_cap, validate_category};
use rust_decimal::Decimal;

/// A spending limit for one expense category.
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub id: String,
    pub owner_id: String,
    pub category: String,
    pub limit: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    pub category: String,
    pub limit: Decimal,
}

impl NewBudget {
    pub fn new(category: &str, limit: Decimal) -> Result<Self, ValidationError> {
        let category = validate_category(category)?;
        if limit <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveLimit(limit.to_string()));
        }
        check_amount_cap(limit)?;
        Ok(Self { category, limit })
    }

    pub fn into_budget(self, id: String, owner_id: String) -> Budget {
        Budget {
            id,
            owner_id,
            category: self.category,
            limit: self.limit,
        }
    }
}
