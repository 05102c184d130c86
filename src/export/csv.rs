//! CSV Export functionality
//!
//! Exports expense records and monthly category breakdowns to CSV.

use std::io::Write;

use crate::error::ExpenseResult;
use crate::models::Expense;
use crate::reports::MonthlySummary;

const EXPENSE_HEADER: [&str; 8] = [
    "ID",
    "Date",
    "Category",
    "Description",
    "Amount",
    "Payment Mode",
    "Recurring",
    "Created At",
];

/// Write one row per expense, in the order given
pub fn export_expenses_csv<W: Write>(expenses: &[Expense], writer: W) -> ExpenseResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(EXPENSE_HEADER)?;

    for expense in expenses {
        let date = expense.local_date().to_string();
        let amount = expense.amount.to_string();
        let created_at = expense
            .created_at
            .map(|at| at.to_rfc3339())
            .unwrap_or_default();

        wtr.write_record([
            expense.id.as_str(),
            date.as_str(),
            expense.category.name(),
            expense.description.as_str(),
            amount.as_str(),
            expense.payment_mode.as_str(),
            if expense.is_recurring { "true" } else { "false" },
            created_at.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write the category breakdown of a month, followed by a total row
pub fn export_breakdown_csv<W: Write>(summary: &MonthlySummary, writer: W) -> ExpenseResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Month", "Category", "Amount", "Count", "Percentage"])?;

    let month = format!("{}-{:02}", summary.period.year(), summary.period.month());
    for share in &summary.breakdown {
        wtr.write_record([
            month.clone(),
            share.category.name().to_string(),
            share.total.to_string(),
            share.count.to_string(),
            share.percentage.to_string(),
        ])?;
    }

    let percentage = if summary.monthly_total.is_positive() { "100" } else { "0" };
    wtr.write_record([
        month,
        "TOTAL".to_string(),
        summary.monthly_total.to_string(),
        summary.expenses.len().to_string(),
        percentage.to_string(),
    ])?;

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, ExpenseId, ExpenseInput, Money, Period};
    use chrono::{TimeZone, Utc};

    fn expense(id: &str, cents: i64, category: Category, description: &str) -> Expense {
        let date = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let input = ExpenseInput::new(Money::from_cents(cents), category)
            .description(description)
            .date(date);
        Expense::from_input(ExpenseId::from(id), input, None)
    }

    #[test]
    fn test_expenses_csv() {
        let expenses = vec![
            expense("1", 12050, Category::Food, "Lunch, with team"),
            expense("2", 3000, Category::Transport, ""),
        ];
        let mut out = Vec::new();
        export_expenses_csv(&expenses, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "ID,Date,Category,Description,Amount,Payment Mode,Recurring,Created At"
        );
        assert!(lines[1].starts_with("1,2024-03-15,Food,\"Lunch, with team\",120.50,cash,false,"));
        assert!(lines[2].contains("Transport,,30.00"));
    }

    #[test]
    fn test_breakdown_csv() {
        let expenses = vec![
            expense("1", 20000, Category::Food, ""),
            expense("2", 10000, Category::Transport, ""),
        ];
        let summary =
            MonthlySummary::generate(&expenses, Period::new(2024, 3).unwrap()).unwrap();

        let mut out = Vec::new();
        export_breakdown_csv(&summary, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("2024-03,Food,200.00,1,67"));
        assert!(text.contains("2024-03,Transport,100.00,1,33"));
        assert!(text.contains("2024-03,TOTAL,300.00,2,100"));
    }
}
