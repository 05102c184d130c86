//! Expense display formatting
//!
//! Tables and detail views for the terminal. Amounts carry the configured
//! currency symbol and dates use the configured format.

use std::fmt::Write;

use chrono::NaiveDate;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use crate::config::Settings;
use crate::models::{Expense, Money, Period};
use crate::reports::CategoryDetail;

const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

/// Format a list of expenses as a table
pub fn format_expense_table(expenses: &[Expense], settings: &Settings) -> String {
    if expenses.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let rows = expenses.iter().map(|e| ExpenseRow {
        id: e.id.to_string(),
        date: format_date(e.local_date(), &settings.date_format),
        category: e.category.to_string(),
        description: description_cell(e),
        mode: e.payment_mode.to_string(),
        amount: e.amount.format_with_symbol(&settings.currency_symbol),
    });

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .modify(Columns::last(), Alignment::right());

    format!("{}\n", table)
}

fn description_cell(expense: &Expense) -> String {
    let text = truncate(&expense.description, 30);
    if expense.is_recurring {
        format!("↻ {}", text)
    } else {
        text
    }
}

/// Format one expense for display
pub fn format_expense_details(expense: &Expense, settings: &Settings) -> String {
    let mut output = String::new();

    output.push_str(&format!("Expense:     {}\n", expense.id));
    output.push_str(&format!(
        "Date:        {}\n",
        format_date(expense.local_date(), &settings.date_format)
    ));
    output.push_str(&format!(
        "Amount:      {}\n",
        expense.amount.format_with_symbol(&settings.currency_symbol)
    ));
    output.push_str(&format!("Category:    {}\n", expense.category));

    if !expense.description.is_empty() {
        output.push_str(&format!("Description: {}\n", expense.description));
    }

    output.push_str(&format!("Paid by:     {}\n", expense.payment_mode));

    if expense.is_recurring {
        output.push_str("Recurring:   yes\n");
    }

    if let Some(created_at) = expense.created_at {
        output.push_str(&format!(
            "Created:     {}\n",
            created_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }

    output
}

/// Format a single category's share of a month
pub fn format_category_detail(detail: &CategoryDetail, period: Period, settings: &Settings) -> String {
    format!(
        "{} in {}: {} across {} expense(s), {}% of the month\n",
        detail.category,
        period,
        detail.total.format_with_symbol(&settings.currency_symbol),
        detail.count,
        detail.percentage
    )
}

/// Amount with the configured currency symbol
pub fn format_amount(amount: Money, settings: &Settings) -> String {
    amount.format_with_symbol(&settings.currency_symbol)
}

/// Format a date, falling back to ISO when the pattern is invalid
pub fn format_date(date: NaiveDate, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(pattern)).is_err() {
        return date.format(FALLBACK_DATE_FORMAT).to_string();
    }
    out
}

/// Truncate a string to a maximum number of characters
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
