//! Expense identifier
//!
//! Ids are opaque strings. New ones are derived from the creation time in
//! epoch milliseconds, which is what existing collections already contain, so
//! any string read back from storage is accepted as-is.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

/// Identifier of an expense record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(String);

impl ExpenseId {
    /// Derive an id from a point in time
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self(at.timestamp_millis().to_string())
    }

    /// Derive an id from `at` that is not contained in `taken`
    ///
    /// Collisions (two records created in the same millisecond) are resolved
    /// by moving forward one millisecond at a time.
    pub fn unique_from<'a, I>(at: DateTime<Utc>, taken: I) -> Self
    where
        I: IntoIterator<Item = &'a ExpenseId>,
    {
        let taken: std::collections::HashSet<&str> =
            taken.into_iter().map(|id| id.as_str()).collect();

        let mut millis = at.timestamp_millis();
        loop {
            let candidate = millis.to_string();
            if !taken.contains(candidate.as_str()) {
                return Self(candidate);
            }
            millis += 1;
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExpenseId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ExpenseId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl FromStr for ExpenseId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdParseError);
        }
        Ok(Self(s.to_string()))
    }
}

/// Error returned when an empty id is given
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdParseError;

impl fmt::Display for IdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expense id must not be empty")
    }
}

impl std::error::Error for IdParseError {}
