//! Expense Tracker - personal expense tracking core
//!
//! Records individual spending events, stores the whole collection as one
//! JSON document in a key-value backend, and aggregates it into monthly
//! totals and per-category breakdowns.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Expense records, money, periods and the add/edit form state
//! - `storage`: Key-value backends and the expense collection store
//! - `services`: Expense lifecycle and latest-wins refresh tracking
//! - `reports`: Totals, category breakdowns and the monthly summary
//! - `audit`: Audit logging system
//! - `backup`: Rolling backups and restore
//! - `export`: CSV and JSON export
//! - `display`, `cli`: Terminal front end
//!
//! # Example
//!
//! ```rust,ignore
//! use expense_tracker::models::{Category, ExpenseInput, Money};
//! use expense_tracker::services::ExpenseService;
//! use expense_tracker::storage::{ExpenseStore, MemoryStore};
//!
//! let store = ExpenseStore::new(MemoryStore::new());
//! let service = ExpenseService::new(&store);
//! service.create(ExpenseInput::new(Money::from_units(120), Category::Food))?;
//! ```

pub mod audit;
pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{ExpenseError, ExpenseResult};
