use crate::db::store::Store;
use crate::error::{Result, ValidationError};
use crate::models::budget::{Budget, NewBudget};
use crate::models::transaction::{Transaction, TransactionType};
use crate::operations::aggregate::{self, CategoryOrder, CategoryTotal};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::info;

pub const DEFAULT_WARNING_PERCENT: u32 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetLevel {
    OnTrack,
    Warning,
    OverBudget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetStatus {
    pub budget_id: String,
    pub category: String,
    pub spent: Decimal,
    pub limit: Decimal,
    /// Share of the limit already spent, capped at 100.
    pub percentage: Decimal,
    pub over_budget: bool,
    /// `limit - spent`; negative once the limit is exceeded.
    pub remaining: Decimal,
    /// Amount spent beyond the limit, zero otherwise.
    pub overage: Decimal,
    pub level: BudgetLevel,
}

/// Evaluates one budget against every expense in `transactions`.
///
/// No date filtering happens here: pass a month-filtered view to evaluate a
/// single period.
pub fn evaluate<'a, I>(budget: &Budget, transactions: I) -> BudgetStatus
where
    I: IntoIterator<Item = &'a Transaction>,
{
    evaluate_with_threshold(budget, transactions, DEFAULT_WARNING_PERCENT)
}

pub fn evaluate_with_threshold<'a, I>(budget: &Budget, transactions: I, warning_percent: u32) -> BudgetStatus
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let spending = aggregate::by_category(transactions, TransactionType::Expense, CategoryOrder::FirstSeen);
    status_for(budget, &spending, warning_percent)
}

/// Evaluates several budgets over the same snapshot, in budget order.
pub fn evaluate_all<'a, I>(budgets: &[Budget], transactions: I, warning_percent: u32) -> Vec<BudgetStatus>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let spending = aggregate::by_category(transactions, TransactionType::Expense, CategoryOrder::FirstSeen);
    budgets
        .iter()
        .map(|budget| status_for(budget, &spending, warning_percent))
        .collect()
}

fn status_for(budget: &Budget, spending: &[CategoryTotal], warning_percent: u32) -> BudgetStatus {
    let spent = spending
        .iter()
        .find(|c| c.category == budget.category)
        .map(|c| c.total)
        .unwrap_or(Decimal::ZERO);
    let limit = budget.limit;
    let hundred = Decimal::ONE_HUNDRED;

    // A zero limit only exists on rows written before limits were validated.
    let percentage = if limit <= Decimal::ZERO {
        if spent > Decimal::ZERO { hundred } else { Decimal::ZERO }
    } else if spent >= limit {
        hundred
    } else {
        spent
            .checked_div(limit)
            .and_then(|ratio| ratio.checked_mul(hundred))
            .map_or(hundred, |pct| pct.min(hundred))
    };

    let over_budget = spent > limit;
    let level = if over_budget {
        BudgetLevel::OverBudget
    } else if percentage > Decimal::from(warning_percent) {
        BudgetLevel::Warning
    } else {
        BudgetLevel::OnTrack
    };

    BudgetStatus {
        budget_id: budget.id.clone(),
        category: budget.category.clone(),
        spent,
        limit,
        percentage,
        over_budget,
        remaining: limit.saturating_sub(spent),
        overage: if over_budget { spent.saturating_sub(limit) } else { Decimal::ZERO },
        level,
    }
}

/// Parses `category, limit` into a validated budget.
pub fn parse_budget(input: &str) -> std::result::Result<NewBudget, ValidationError> {
    let parts: Vec<&str> = input.split(',').map(|s| s.trim()).collect();
    if parts.len() != 2 {
        return Err(ValidationError::InvalidInput(format!(
            "Invalid number of details provided. Expected 2 details separated by commas but got {}",
            parts.len()
        )));
    }
    let limit = Decimal::from_str(parts[1])
        .map_err(|_| ValidationError::InvalidAmount(parts[1].to_string()))?;
    NewBudget::new(parts[0], limit)
}

pub fn add_budget_to_store<S: Store>(store: &mut S, owner_id: &str, input: &str) -> Result<Budget> {
    let new_budget = parse_budget(input)?;
    let budget = store.create_budget(owner_id, new_budget)?;
    info!(category = %budget.category, limit = %budget.limit, "budget added");
    Ok(budget)
}

pub fn remove_budget_from_store<S: Store>(store: &mut S, owner_id: &str, id: &str) -> Result<()> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ValidationError::InvalidInput("Budget ID cannot be empty.".to_string()).into());
    }
    store.delete_budget(owner_id, id)
}
