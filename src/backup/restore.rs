//! Backup restoration
//!
//! Replaces the stored collection with the contents of an archive. The
//! archived records are parsed before anything is written, so a damaged
//! archive leaves the current data alone.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::{ExpenseError, ExpenseResult};
use crate::storage::{parse_collection, ExpenseStore, KeyValueStore};

use super::manager::{BackupArchive, ARCHIVE_SCHEMA_VERSION};

/// Result of a restore operation
#[derive(Debug)]
pub struct RestoreResult {
    pub schema_version: u32,
    pub backup_date: DateTime<Utc>,
    pub expenses_restored: usize,
}

impl RestoreResult {
    pub fn summary(&self) -> String {
        format!(
            "Restored {} expense(s) from backup taken {}",
            self.expenses_restored,
            self.backup_date.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}

/// Result of validating a backup
#[derive(Debug)]
pub struct ValidationResult {
    pub schema_version: u32,
    pub backup_date: DateTime<Utc>,
    pub expense_count: usize,
}

/// Read and check an archive without touching the store
pub fn validate_backup(backup_path: &Path) -> ExpenseResult<ValidationResult> {
    let archive = read_archive(backup_path)?;
    let expenses = parse_collection(&archived_text(&archive)?)?;

    Ok(ValidationResult {
        schema_version: archive.schema_version,
        backup_date: archive.created_at,
        expense_count: expenses.len(),
    })
}

/// Overwrite the stored collection with an archive's records
pub fn restore_from_file<S: KeyValueStore>(
    store: &ExpenseStore<S>,
    backup_path: &Path,
) -> ExpenseResult<RestoreResult> {
    let archive = read_archive(backup_path)?;
    let restored = store.restore_raw(&archived_text(&archive)?)?;

    log::info!(
        "restored {} expense(s) from {}",
        restored,
        backup_path.display()
    );

    Ok(RestoreResult {
        schema_version: archive.schema_version,
        backup_date: archive.created_at,
        expenses_restored: restored,
    })
}

fn read_archive(backup_path: &Path) -> ExpenseResult<BackupArchive> {
    let contents = fs::read_to_string(backup_path)
        .map_err(|e| ExpenseError::Io(format!("Failed to read backup file: {}", e)))?;

    let archive: BackupArchive = serde_json::from_str(&contents)
        .map_err(|e| ExpenseError::Json(format!("Failed to parse backup file: {}", e)))?;

    if archive.schema_version > ARCHIVE_SCHEMA_VERSION {
        return Err(ExpenseError::Validation(format!(
            "Backup schema version {} is newer than supported version {}",
            archive.schema_version, ARCHIVE_SCHEMA_VERSION
        )));
    }

    Ok(archive)
}

fn archived_text(archive: &BackupArchive) -> ExpenseResult<String> {
    serde_json::to_string(&archive.expenses)
        .map_err(|e| ExpenseError::Json(format!("Failed to read archived expenses: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::BackupManager;
    use crate::config::settings::BackupRetention;
    use crate::storage::{MemoryStore, EXPENSES_KEY};
    use tempfile::TempDir;

    const ONE_EXPENSE: &str = r#"[{"id":"1","amount":50,"category":"Food","description":"Lunch","date":"2024-01-05T10:00:00.000Z","paymentMode":"upi","isRecurring":false}]"#;

    #[test]
    fn test_backup_and_restore_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let manager = BackupManager::new(temp_dir.path().to_path_buf(), BackupRetention::default());
        let store = ExpenseStore::new(MemoryStore::with_entry(EXPENSES_KEY, ONE_EXPENSE));

        let original = store.load_all().unwrap();
        let path = manager.create_backup(&store).unwrap();

        store.save_all(&[]).unwrap();
        let result = restore_from_file(&store, &path).unwrap();

        assert_eq!(result.expenses_restored, 1);
        assert_eq!(store.load_all().unwrap(), original);
        assert!(result.summary().contains("1 expense(s)"));
    }

    #[test]
    fn test_damaged_archive_leaves_store_alone() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("backup-20240105-100000-000.json");
        fs::write(
            &path,
            r#"{"schema_version":1,"created_at":"2024-01-05T10:00:00Z","expenses":[{"id":"x"}]}"#,
        )
        .unwrap();

        let store = ExpenseStore::new(MemoryStore::with_entry(EXPENSES_KEY, ONE_EXPENSE));
        assert!(restore_from_file(&store, &path).is_err());
        assert_eq!(store.load_all().unwrap().len(), 1);
    }

    #[test]
    fn test_validate_backup() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("b.json");
        fs::write(
            &path,
            format!(
                r#"{{"schema_version":1,"created_at":"2024-01-05T10:00:00Z","expenses":{}}}"#,
                ONE_EXPENSE
            ),
        )
        .unwrap();

        let result = validate_backup(&path).unwrap();
        assert_eq!(result.expense_count, 1);
        assert_eq!(result.schema_version, 1);
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("b.json");
        fs::write(
            &path,
            r#"{"schema_version":99,"created_at":"2024-01-05T10:00:00Z","expenses":[]}"#,
        )
        .unwrap();

        assert!(validate_backup(&path).unwrap_err().is_validation());
    }
}
