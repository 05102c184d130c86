//! Export module
//!
//! - CSV: expense rows and monthly breakdowns (spreadsheet-compatible)
//! - JSON: the records in their stored layout with export metadata

pub mod csv;
pub mod json;

pub use self::csv::{export_breakdown_csv, export_expenses_csv};
pub use self::json::{export_expenses_json, ExpenseExport, EXPORT_SCHEMA_VERSION};
