//! Storage layer
//!
//! A key-value backend holding the expense collection as one serialized
//! unit, with atomic file writes and automatic directory creation.

pub mod expenses;
pub mod file_io;
pub mod kv;

pub use expenses::{parse_collection, ExpenseCollection, ExpenseStore, Revision};
pub use file_io::{read_json, write_json_atomic};
pub use kv::{FileStore, KeyValueStore, MemoryStore};

use crate::config::paths::ExpensePaths;
use crate::error::ExpenseError;

/// Key under which the collection is stored
pub const EXPENSES_KEY: &str = "expenses";

/// Open the file-backed store under the configured data directory
pub fn open(paths: &ExpensePaths) -> Result<ExpenseStore<FileStore>, ExpenseError> {
    paths.ensure_directories()?;
    Ok(ExpenseStore::new(FileStore::new(paths.data_dir())))
}
