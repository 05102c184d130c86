//! Service layer for the expense tracker
//!
//! Business logic on top of the storage layer: the expense lifecycle and
//! the latest-wins refresh of loaded views.

pub mod expense;
pub mod refresh;

pub use expense::ExpenseService;
pub use refresh::{Generation, RefreshTracker};
