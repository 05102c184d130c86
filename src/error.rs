//! Custom error types for the expense tracker
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for expense tracker operations
#[derive(Error, Debug)]
pub enum ExpenseError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors outside the expense store (settings, audit log, backups)
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors outside the expense store
    #[error("JSON error: {0}")]
    Json(String),

    /// A required field is missing or a value could not be parsed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Reading the stored collection failed or returned malformed data
    #[error("Failed to load expenses: {0}")]
    StorageRead(String),

    /// Writing the collection back failed
    #[error("Failed to save expenses: {0}")]
    StorageWrite(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// The stored collection changed between load and save
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// A sum of amounts does not fit the amount type
    #[error("Amount out of range: {0}")]
    AmountOverflow(String),
}

impl ExpenseError {
    /// Create a "not found" error for expenses
    pub fn expense_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Expense",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for backups
    pub fn backup_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Backup",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error came from the expense store
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::StorageRead(_) | Self::StorageWrite(_))
    }

    /// Short notice suitable for showing to the user
    pub fn user_notice(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Please fill in all required fields.",
            Self::StorageRead(_) => "Failed to load expenses.",
            Self::StorageWrite(_) => "Failed to save expense. Please try again.",
            Self::NotFound {
                entity_type: "Backup",
                ..
            } => "That backup does not exist.",
            Self::NotFound { .. } => "That expense no longer exists.",
            Self::Conflict(_) => "Expenses changed in the meantime. Please try again.",
            Self::AmountOverflow(_) => "The total is too large to calculate.",
            _ => "Something went wrong.",
        }
    }
}

impl From<std::io::Error> for ExpenseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ExpenseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for ExpenseError {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}

/// Result type alias for expense tracker operations
pub type ExpenseResult<T> = Result<T, ExpenseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExpenseError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = ExpenseError::expense_not_found("1704441600000");
        assert_eq!(err.to_string(), "Expense not found: 1704441600000");
        assert!(err.is_not_found());
        assert!(!err.is_storage());
        assert_eq!(err.user_notice(), "That expense no longer exists.");
        assert_eq!(
            ExpenseError::backup_not_found("latest").user_notice(),
            "That backup does not exist."
        );
    }

    #[test]
    fn test_storage_errors() {
        let read = ExpenseError::StorageRead("expected value at line 1".into());
        let write = ExpenseError::StorageWrite("disk full".into());
        assert!(read.is_storage());
        assert!(write.is_storage());
        assert_eq!(read.user_notice(), "Failed to load expenses.");
        assert_eq!(
            write.user_notice(),
            "Failed to save expense. Please try again."
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ExpenseError = io_err.into();
        assert!(matches!(err, ExpenseError::Io(_)));
    }
}
