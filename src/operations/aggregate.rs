//! Sums and group-bys over a transaction snapshot.
//!
//! Every function accepts anything that iterates over `&Transaction`, so both
//! a full snapshot (`&[Transaction]`) and a filtered view (`Vec<&Transaction>`)
//! can be passed. Amounts stay exact `Decimal`s; rounding is left to display.
use crate::models::transaction::{Transaction, TransactionType};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryOrder {
    /// Order in which each category first appears in the input.
    #[default]
    FirstSeen,
    /// Largest total first; ties keep first-seen order.
    TotalDescending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub income: Decimal,
    pub expense: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub amount: Decimal,
}

pub fn totals<'a, I>(transactions: I) -> Totals
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut totals = Totals::default();
    for tx in transactions {
        match tx.transaction_type {
            TransactionType::Income => totals.income = totals.income.saturating_add(tx.amount),
            TransactionType::Expense => totals.expense = totals.expense.saturating_add(tx.amount),
        }
    }
    totals.balance = totals.income.saturating_sub(totals.expense);
    totals
}

pub fn by_category<'a, I>(
    transactions: I,
    transaction_type: TransactionType,
    order: CategoryOrder,
) -> Vec<CategoryTotal>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut groups: Vec<CategoryTotal> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for tx in transactions {
        if tx.transaction_type != transaction_type {
            continue;
        }
        match index.get(tx.category.as_str()) {
            Some(&idx) => groups[idx].total = groups[idx].total.saturating_add(tx.amount),
            None => {
                index.insert(tx.category.as_str(), groups.len());
                groups.push(CategoryTotal {
                    category: tx.category.clone(),
                    total: tx.amount,
                });
            }
        }
    }

    if order == CategoryOrder::TotalDescending {
        // sort_by is stable, which keeps ties in first-seen order
        groups.sort_by(|a, b| b.total.cmp(&a.total));
    }
    groups
}

/// Income and expense per calendar day, oldest first. Days without
/// transactions are not filled in.
pub fn by_day<'a, I>(transactions: I) -> Vec<DailyTotal>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut days: BTreeMap<NaiveDate, (Decimal, Decimal)> = BTreeMap::new();
    for tx in transactions {
        let entry = days.entry(tx.date).or_insert((Decimal::ZERO, Decimal::ZERO));
        match tx.transaction_type {
            TransactionType::Income => entry.0 = entry.0.saturating_add(tx.amount),
            TransactionType::Expense => entry.1 = entry.1.saturating_add(tx.amount),
        }
    }

    days.into_iter()
        .map(|(date, (income, expense))| DailyTotal {
            date,
            income,
            expense,
        })
        .collect()
}

pub fn top_category<'a, I>(transactions: I) -> Option<CategoryTotal>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    by_category(transactions, TransactionType::Expense, CategoryOrder::TotalDescending)
        .into_iter()
        .next()
}

/// Total expense divided by the number of distinct expense categories,
/// or zero when there are none.
pub fn average_per_category<'a, I>(transactions: I) -> Decimal
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let categories = by_category(transactions, TransactionType::Expense, CategoryOrder::FirstSeen);
    if categories.is_empty() {
        return Decimal::ZERO;
    }
    let total = categories
        .iter()
        .fold(Decimal::ZERO, |acc, c| acc.saturating_add(c.total));
    total / Decimal::from(categories.len())
}

pub fn expense_category_count<'a, I>(transactions: I) -> usize
where
    I: IntoIterator<Item = &'a Transaction>,
{
    by_category(transactions, TransactionType::Expense, CategoryOrder::FirstSeen).len()
}

/// Expense totals for the most recent `days` days that have expenses,
/// oldest first.
pub fn recent_expense_trend<'a, I>(transactions: I, days: usize) -> Vec<TrendPoint>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut per_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for tx in transactions.into_iter().filter(|tx| tx.is_expense()) {
        let day = per_day.entry(tx.date).or_insert(Decimal::ZERO);
        *day = day.saturating_add(tx.amount);
    }

    let skip = per_day.len().saturating_sub(days);
    per_day
        .into_iter()
        .skip(skip)
        .map(|(date, amount)| TrendPoint { date, amount })
        .collect()
}
