//! Core data models
//!
//! The expense record itself plus the small value types it is built from,
//! the reporting period, and the add/edit form state.

pub mod category;
pub mod draft;
pub mod expense;
pub mod ids;
pub mod money;
pub mod period;

pub use category::{Category, PaymentMode};
pub use draft::{DraftEvent, ExpenseDraft};
pub use expense::{Expense, ExpenseInput};
pub use ids::ExpenseId;
pub use money::Money;
pub use period::Period;
