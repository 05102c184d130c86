//! Aggregation over expense collections
//!
//! Pure functions; none of them touch storage.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{Category, Expense, Money, Period};

/// One category's slice of a period's spending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryShare {
    pub category: Category,
    pub total: Money,
    pub count: usize,
    /// Whole-number share of the period total
    pub percentage: i64,
}

/// Spending detail for a single category, which may have no expenses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDetail {
    pub category: Category,
    pub total: Money,
    pub count: usize,
    pub percentage: i64,
}

/// Sort most recent first; records with equal dates keep their order
pub fn sort_by_date_desc(expenses: &mut [Expense]) {
    expenses.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Records whose local calendar date falls in `period`
pub fn filter_by_period(expenses: &[Expense], period: Period) -> Vec<Expense> {
    expenses
        .iter()
        .filter(|e| period.contains(&e.date))
        .cloned()
        .collect()
}

/// Sum of the amounts; an error if the total does not fit
pub fn total(expenses: &[Expense]) -> ExpenseResult<Money> {
    sum(expenses.iter().map(|e| e.amount))
}

/// Sum over the whole collection
pub fn all_time_total(expenses: &[Expense]) -> ExpenseResult<Money> {
    total(expenses)
}

pub fn monthly_total(expenses: &[Expense], period: Period) -> ExpenseResult<Money> {
    sum(expenses
        .iter()
        .filter(|e| period.contains(&e.date))
        .map(|e| e.amount))
}

/// Per-category totals in category order, skipping categories whose total
/// is zero or negative
///
/// `expenses` should already be limited to one period. Percentages are each
/// rounded on their own, so they need not add up to exactly 100.
pub fn category_breakdown(expenses: &[Expense]) -> ExpenseResult<Vec<CategoryShare>> {
    let period_total = total(expenses)?;

    let mut shares = Vec::new();
    for category in Category::ALL {
        let (cat_total, count) = category_sum(expenses, category)?;
        if !cat_total.is_positive() {
            continue;
        }
        shares.push(CategoryShare {
            category,
            total: cat_total,
            count,
            percentage: percentage_of(cat_total, period_total),
        });
    }
    Ok(shares)
}

/// Total, count and share for one category within a period's expenses
pub fn category_detail(expenses: &[Expense], category: Category) -> ExpenseResult<CategoryDetail> {
    let (cat_total, count) = category_sum(expenses, category)?;
    Ok(CategoryDetail {
        category,
        total: cat_total,
        count,
        percentage: percentage_of(cat_total, total(expenses)?),
    })
}

fn category_sum(expenses: &[Expense], category: Category) -> ExpenseResult<(Money, usize)> {
    let matching: Vec<Money> = expenses
        .iter()
        .filter(|e| e.category == category)
        .map(|e| e.amount)
        .collect();
    Ok((sum(matching.iter().copied())?, matching.len()))
}

fn sum<I: IntoIterator<Item = Money>>(amounts: I) -> ExpenseResult<Money> {
    Money::checked_sum(amounts).ok_or_else(|| {
        ExpenseError::AmountOverflow("the sum of the expenses is too large".into())
    })
}

/// `round(100 * part / whole)`, half away from zero; 0 unless `whole` is
/// positive
pub fn percentage_of(part: Money, whole: Money) -> i64 {
    if !whole.is_positive() {
        return 0;
    }
    part.as_decimal()
        .checked_div(whole.as_decimal())
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|pct| pct.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|pct| pct.to_i64())
        .unwrap_or(0)
}
