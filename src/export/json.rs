//! JSON Export functionality
//!
//! Writes the collection in the same layout it is stored in, wrapped with
//! export metadata.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{Expense, Money};
use crate::reports;

pub const EXPORT_SCHEMA_VERSION: u32 = 1;

/// Export document
#[derive(Debug, Serialize, Deserialize)]
pub struct ExpenseExport {
    pub schema_version: u32,
    pub exported_at: DateTime<Utc>,
    pub total: Money,
    pub expenses: Vec<Expense>,
}

/// Write `expenses` as a pretty-printed export document
pub fn export_expenses_json<W: Write>(expenses: &[Expense], writer: W) -> ExpenseResult<()> {
    let export = ExpenseExport {
        schema_version: EXPORT_SCHEMA_VERSION,
        exported_at: Utc::now(),
        total: reports::total(expenses)?,
        expenses: expenses.to_vec(),
    };

    serde_json::to_writer_pretty(writer, &export)
        .map_err(|e| ExpenseError::Export(format!("Failed to write JSON export: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, ExpenseId, ExpenseInput};

    #[test]
    fn test_json_export_reads_back() {
        let input = ExpenseInput::new(Money::from_cents(1999), Category::Shopping);
        let expenses = vec![Expense::from_input(ExpenseId::from("7"), input, None)];

        let mut out = Vec::new();
        export_expenses_json(&expenses, &mut out).unwrap();

        let parsed: ExpenseExport = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.schema_version, EXPORT_SCHEMA_VERSION);
        assert_eq!(parsed.total, Money::from_cents(1999));
        assert_eq!(parsed.expenses, expenses);
    }
}
