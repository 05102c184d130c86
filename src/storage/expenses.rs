//! Expense collection store
//!
//! The whole collection is one JSON array under [`EXPENSES_KEY`]. It is read
//! in full and written in full; there is no partial update.
//!
//! [`ExpenseStore::load_versioned`] and [`ExpenseStore::save_if_unchanged`]
//! add a compare-and-swap on a content revision of the stored text, so two
//! read-modify-write cycles that overlap are detected instead of the second
//! silently discarding the first.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::Expense;

use super::kv::KeyValueStore;
use super::EXPENSES_KEY;

/// The full set of expense records
pub type ExpenseCollection = Vec<Expense>;

/// Content token of the stored collection at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Revision {
    /// Nothing stored under the key yet
    Absent,
    /// Hash and length of the stored text
    Content { hash: u64, len: usize },
}

impl Revision {
    fn of(raw: Option<&str>) -> Self {
        match raw {
            None => Self::Absent,
            Some(text) => {
                let mut hasher = DefaultHasher::new();
                text.hash(&mut hasher);
                Self::Content {
                    hash: hasher.finish(),
                    len: text.len(),
                }
            }
        }
    }
}

/// Reads and writes the expense collection through a key-value backend
#[derive(Debug)]
pub struct ExpenseStore<S> {
    backend: S,
}

impl<S: KeyValueStore> ExpenseStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Read the whole collection; empty if nothing has been stored yet
    pub fn load_all(&self) -> ExpenseResult<ExpenseCollection> {
        self.load_versioned().map(|(expenses, _)| expenses)
    }

    /// Read the collection together with its current revision
    pub fn load_versioned(&self) -> ExpenseResult<(ExpenseCollection, Revision)> {
        let raw = self.read_raw()?;
        let revision = Revision::of(raw.as_deref());
        let expenses = match raw {
            Some(text) => parse_collection(&text)?,
            None => Vec::new(),
        };

        log::debug!("loaded {} expense(s)", expenses.len());
        Ok((expenses, revision))
    }

    /// Serialize and write the whole collection, replacing any prior value
    pub fn save_all(&self, expenses: &[Expense]) -> ExpenseResult<()> {
        let text = serialize_collection(expenses)?;
        self.write_raw(&text)
    }

    /// Write the collection only if the stored text still matches `expected`
    ///
    /// Returns the new revision on success and [`ExpenseError::Conflict`] if
    /// someone else wrote in between.
    pub fn save_if_unchanged(
        &self,
        expenses: &[Expense],
        expected: Revision,
    ) -> ExpenseResult<Revision> {
        let current = Revision::of(self.read_raw()?.as_deref());
        if current != expected {
            log::warn!("expense collection changed since it was loaded; refusing to overwrite");
            return Err(ExpenseError::Conflict(
                "the stored expenses changed since they were loaded".into(),
            ));
        }

        let text = serialize_collection(expenses)?;
        self.write_raw(&text)?;
        Ok(Revision::of(Some(&text)))
    }

    /// The stored text as-is, used for backups
    pub fn read_raw(&self) -> ExpenseResult<Option<String>> {
        self.backend.get(EXPENSES_KEY).map_err(|e| {
            log::error!("error loading expenses: {}", e);
            e
        })
    }

    /// Replace the stored text after checking that it parses
    pub fn restore_raw(&self, text: &str) -> ExpenseResult<usize> {
        let expenses = parse_collection(text)?;
        self.save_all(&expenses)?;
        Ok(expenses.len())
    }

    fn write_raw(&self, text: &str) -> ExpenseResult<()> {
        self.backend.set(EXPENSES_KEY, text).map_err(|e| {
            log::error!("error saving expenses: {}", e);
            e
        })
    }
}

/// Parse stored text into a collection
pub fn parse_collection(text: &str) -> ExpenseResult<ExpenseCollection> {
    serde_json::from_str(text).map_err(|e| {
        log::error!("stored expenses are malformed: {}", e);
        ExpenseError::StorageRead(format!("Malformed expense data: {}", e))
    })
}

fn serialize_collection(expenses: &[Expense]) -> ExpenseResult<String> {
    let mut seen = HashSet::with_capacity(expenses.len());
    if let Some(dup) = expenses.iter().find(|e| !seen.insert(&e.id)) {
        return Err(ExpenseError::StorageWrite(format!(
            "Duplicate expense id: {}",
            dup.id
        )));
    }

    serde_json::to_string(expenses)
        .map_err(|e| ExpenseError::StorageWrite(format!("Failed to serialize expenses: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, ExpenseId, ExpenseInput, Money};
    use crate::storage::{FileStore, MemoryStore};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> ExpenseResult<Option<String>> {
            Err(ExpenseError::StorageRead("device unavailable".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> ExpenseResult<()> {
            Err(ExpenseError::StorageWrite("device unavailable".into()))
        }
    }

    fn expense(id: &str, units: i64) -> Expense {
        let date = Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap();
        let input = ExpenseInput::new(Money::from_units(units), Category::Food).date(date);
        Expense::from_input(ExpenseId::from(id), input, Some(date))
    }

    #[test]
    fn test_empty_load() {
        let store = ExpenseStore::new(MemoryStore::new());
        assert!(store.load_all().unwrap().is_empty());
        assert_eq!(store.load_versioned().unwrap().1, Revision::Absent);
    }

    #[test]
    fn test_save_and_reload_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let store = ExpenseStore::new(FileStore::new(temp_dir.path()));

        let records = vec![expense("1", 100), expense("2", 250)];
        store.save_all(&records).unwrap();

        let reopened = ExpenseStore::new(FileStore::new(temp_dir.path()));
        assert_eq!(reopened.load_all().unwrap(), records);
    }

    #[test]
    fn test_malformed_blob_is_a_read_error() {
        let store = ExpenseStore::new(MemoryStore::with_entry(EXPENSES_KEY, "{not json"));
        let err = store.load_all().unwrap_err();
        assert!(matches!(err, ExpenseError::StorageRead(_)));
    }

    #[test]
    fn test_backend_failures_map_to_storage_errors() {
        let store = ExpenseStore::new(BrokenStore);
        assert!(matches!(
            store.load_all().unwrap_err(),
            ExpenseError::StorageRead(_)
        ));
        assert!(matches!(
            store.save_all(&[]).unwrap_err(),
            ExpenseError::StorageWrite(_)
        ));
    }

    #[test]
    fn test_duplicate_ids_are_not_written() {
        let store = ExpenseStore::new(MemoryStore::new());
        let err = store
            .save_all(&[expense("1", 10), expense("1", 20)])
            .unwrap_err();
        assert!(matches!(err, ExpenseError::StorageWrite(_)));
        assert!(store.read_raw().unwrap().is_none());
    }

    #[test]
    fn test_save_if_unchanged_detects_lost_update() {
        let store = ExpenseStore::new(MemoryStore::new());
        store.save_all(&[expense("1", 100)]).unwrap();

        let (mut first, first_rev) = store.load_versioned().unwrap();
        let (mut second, second_rev) = store.load_versioned().unwrap();

        first.push(expense("2", 20));
        store.save_if_unchanged(&first, first_rev).unwrap();

        second.push(expense("3", 30));
        let err = store.save_if_unchanged(&second, second_rev).unwrap_err();
        assert!(matches!(err, ExpenseError::Conflict(_)));

        let ids: Vec<_> = store
            .load_all()
            .unwrap()
            .into_iter()
            .map(|e| e.id.to_string())
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_save_if_unchanged_returns_the_new_revision() {
        let store = ExpenseStore::new(MemoryStore::new());
        let rev = store
            .save_if_unchanged(&[expense("1", 1)], Revision::Absent)
            .unwrap();
        assert_eq!(store.load_versioned().unwrap().1, rev);
        assert!(store.save_if_unchanged(&[], rev).is_ok());
    }

    #[test]
    fn test_restore_raw_validates_before_writing() {
        let store = ExpenseStore::new(MemoryStore::new());
        store.save_all(&[expense("1", 100)]).unwrap();

        assert!(store.restore_raw("garbage").is_err());
        assert_eq!(store.load_all().unwrap().len(), 1);

        let text = serde_json::to_string(&vec![expense("8", 1), expense("9", 2)]).unwrap();
        assert_eq!(store.restore_raw(&text).unwrap(), 2);
        assert_eq!(store.load_all().unwrap().len(), 2);
    }
}
