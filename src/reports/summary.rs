//! Monthly Summary
//!
//! The month view: that month's expenses newest first, the month and
//! all-time totals, and the category breakdown.

use crate::error::ExpenseResult;
use crate::models::{Expense, Money, Period};

use super::aggregate::{self, CategoryShare};

const BAR_WIDTH: usize = 30;

/// Everything shown for one selected month
#[derive(Debug, Clone)]
pub struct MonthlySummary {
    pub period: Period,
    /// The month's expenses, most recent first
    pub expenses: Vec<Expense>,
    pub monthly_total: Money,
    pub all_time_total: Money,
    pub breakdown: Vec<CategoryShare>,
}

impl MonthlySummary {
    /// Build the summary for `period` from the whole collection
    pub fn generate(all: &[Expense], period: Period) -> ExpenseResult<Self> {
        let mut expenses = aggregate::filter_by_period(all, period);
        aggregate::sort_by_date_desc(&mut expenses);

        Ok(Self {
            period,
            monthly_total: aggregate::total(&expenses)?,
            all_time_total: aggregate::all_time_total(all)?,
            breakdown: aggregate::category_breakdown(&expenses)?,
            expenses,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    /// Format the summary for terminal display
    pub fn format_terminal(&self, currency_symbol: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!("Expenses: {}\n", self.period));
        output.push_str(&"=".repeat(60));
        output.push('\n');
        output.push_str(&format!(
            "This Month: {}\n",
            self.monthly_total.format_with_symbol(currency_symbol)
        ));
        output.push_str(&format!(
            "All Time:   {}\n",
            self.all_time_total.format_with_symbol(currency_symbol)
        ));
        output.push_str(&format!("Expenses:   {}\n\n", self.expenses.len()));

        if self.expenses.is_empty() {
            output.push_str("No expenses for this month\n");
            return output;
        }
        if self.breakdown.is_empty() {
            output.push_str("No spending to break down this month\n");
            return output;
        }

        output.push_str(&format!(
            "{:<15} {:>12} {:>5}  {}\n",
            "Category", "Amount", "%", "Share"
        ));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        for share in &self.breakdown {
            output.push_str(&format!(
                "{:<15} {:>12} {:>4}%  {}\n",
                share.category.name(),
                share.total.format_with_symbol(currency_symbol),
                share.percentage,
                bar(share.percentage)
            ));
        }

        output
    }
}

fn bar(percentage: i64) -> String {
    let filled = (percentage.clamp(0, 100) as usize * BAR_WIDTH + 50) / 100;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, ExpenseId, ExpenseInput};
    use chrono::{TimeZone, Utc};

    fn expense(id: &str, units: i64, category: Category, month: u32, day: u32) -> Expense {
        let date = Utc.with_ymd_and_hms(2024, month, day, 12, 0, 0).unwrap();
        let input = ExpenseInput::new(Money::from_units(units), category).date(date);
        Expense::from_input(ExpenseId::from(id), input, Some(date))
    }

    #[test]
    fn test_generate() {
        let all = vec![
            expense("1", 50, Category::Food, 3, 10),
            expense("2", 100, Category::Transport, 3, 20),
            expense("3", 150, Category::Food, 3, 15),
            expense("4", 40, Category::Shopping, 4, 15),
        ];
        let summary = MonthlySummary::generate(&all, Period::new(2024, 3).unwrap()).unwrap();

        let ids: Vec<_> = summary.expenses.iter().map(|e| e.id.to_string()).collect();
        assert_eq!(ids, vec!["2", "3", "1"]);
        assert_eq!(summary.monthly_total, Money::from_units(300));
        assert_eq!(summary.all_time_total, Money::from_units(340));
        assert_eq!(summary.breakdown.len(), 2);
    }

    #[test]
    fn test_format_terminal() {
        let all = vec![
            expense("1", 200, Category::Food, 3, 10),
            expense("2", 100, Category::Transport, 3, 20),
        ];
        let summary = MonthlySummary::generate(&all, Period::new(2024, 3).unwrap()).unwrap();
        let text = summary.format_terminal("₹");

        assert!(text.contains("March 2024"));
        assert!(text.contains("₹300.00"));
        assert!(text.contains("67%"));
        assert!(text.contains(&format!("{}{}", "#".repeat(20), ".".repeat(10))));
    }

    #[test]
    fn test_format_empty_month() {
        let summary = MonthlySummary::generate(&[], Period::new(2024, 3).unwrap()).unwrap();
        assert!(summary.is_empty());
        assert!(summary.format_terminal("$").contains("No expenses for this month"));
    }

    #[test]
    fn test_month_of_refunds_has_no_breakdown() {
        let all = vec![expense("1", -30, Category::Shopping, 3, 10)];
        let summary = MonthlySummary::generate(&all, Period::new(2024, 3).unwrap()).unwrap();

        assert!(!summary.is_empty());
        assert!(summary.breakdown.is_empty());
        let text = summary.format_terminal("₹");
        assert!(text.contains("This Month: -₹30.00"));
        assert!(text.contains("No spending to break down this month"));
    }

    #[test]
    fn test_bar_bounds() {
        assert_eq!(bar(0), ".".repeat(BAR_WIDTH));
        assert_eq!(bar(100), "#".repeat(BAR_WIDTH));
        assert_eq!(bar(150), "#".repeat(BAR_WIDTH));
    }
}
