//! Backup manager
//!
//! Writes dated JSON archives of the expense collection and prunes them
//! according to the retention policy.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::settings::BackupRetention;
use crate::error::{ExpenseError, ExpenseResult};
use crate::storage::{write_json_atomic, ExpenseStore, KeyValueStore};

/// Current archive layout
pub const ARCHIVE_SCHEMA_VERSION: u32 = 1;

/// Metadata about a backup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupInfo {
    pub filename: String,
    pub path: PathBuf,
    /// Taken from the filename
    pub created_at: DateTime<Utc>,
    pub size_bytes: u64,
    /// Taken on the first day of a month; kept under the monthly quota
    pub is_monthly: bool,
}

/// Backup archive format
#[derive(Debug, Serialize, Deserialize)]
pub struct BackupArchive {
    pub schema_version: u32,
    pub created_at: DateTime<Utc>,
    /// The stored collection, as a JSON array
    pub expenses: serde_json::Value,
}

impl BackupArchive {
    /// Number of records in the archive
    pub fn expense_count(&self) -> usize {
        self.expenses.as_array().map_or(0, |a| a.len())
    }
}

/// Manages backup creation and retention
pub struct BackupManager {
    backup_dir: PathBuf,
    retention: BackupRetention,
}

impl BackupManager {
    pub fn new(backup_dir: PathBuf, retention: BackupRetention) -> Self {
        Self {
            backup_dir,
            retention,
        }
    }

    /// Archive the current collection
    ///
    /// Returns the path to the created backup file.
    pub fn create_backup<S: KeyValueStore>(&self, store: &ExpenseStore<S>) -> ExpenseResult<PathBuf> {
        fs::create_dir_all(&self.backup_dir)
            .map_err(|e| ExpenseError::Io(format!("Failed to create backup directory: {}", e)))?;

        let now = Utc::now();
        let filename = format!(
            "backup-{}-{:03}.json",
            now.format("%Y%m%d-%H%M%S"),
            now.timestamp_subsec_millis()
        );
        let backup_path = self.backup_dir.join(&filename);

        let expenses = match store.read_raw()? {
            Some(text) => serde_json::from_str(&text).map_err(|e| {
                ExpenseError::Json(format!("Failed to parse expenses for backup: {}", e))
            })?,
            None => serde_json::Value::Array(Vec::new()),
        };

        let archive = BackupArchive {
            schema_version: ARCHIVE_SCHEMA_VERSION,
            created_at: now,
            expenses,
        };
        write_json_atomic(&backup_path, &archive)?;

        log::info!("created backup {}", filename);
        Ok(backup_path)
    }

    /// All backups, newest first
    pub fn list_backups(&self) -> ExpenseResult<Vec<BackupInfo>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();

        for entry in fs::read_dir(&self.backup_dir)
            .map_err(|e| ExpenseError::Io(format!("Failed to read backup directory: {}", e)))?
        {
            let entry = entry
                .map_err(|e| ExpenseError::Io(format!("Failed to read directory entry: {}", e)))?;

            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                if let Some(info) = parse_backup_info(&path) {
                    backups.push(info);
                }
            }
        }

        backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(backups)
    }

    /// Delete backups beyond the retention counts; returns the deleted paths
    pub fn enforce_retention(&self) -> ExpenseResult<Vec<PathBuf>> {
        let backups = self.list_backups()?;
        let mut deleted = Vec::new();

        let (monthly, daily): (Vec<_>, Vec<_>) = backups.into_iter().partition(|b| b.is_monthly);

        let excess = daily
            .into_iter()
            .skip(self.retention.daily_count as usize)
            .chain(monthly.into_iter().skip(self.retention.monthly_count as usize));

        for backup in excess {
            fs::remove_file(&backup.path)
                .map_err(|e| ExpenseError::Io(format!("Failed to delete old backup: {}", e)))?;
            log::debug!("pruned backup {}", backup.filename);
            deleted.push(backup.path);
        }

        Ok(deleted)
    }

    /// Create a backup and then enforce the retention policy
    pub fn create_backup_with_retention<S: KeyValueStore>(
        &self,
        store: &ExpenseStore<S>,
    ) -> ExpenseResult<(PathBuf, Vec<PathBuf>)> {
        let backup_path = self.create_backup(store)?;
        let deleted = self.enforce_retention()?;
        Ok((backup_path, deleted))
    }

    pub fn backup_dir(&self) -> &PathBuf {
        &self.backup_dir
    }

    /// Look up a backup by filename
    pub fn get_backup(&self, filename: &str) -> ExpenseResult<BackupInfo> {
        let path = self.backup_dir.join(filename);
        if !path.exists() {
            return Err(ExpenseError::backup_not_found(filename));
        }
        parse_backup_info(&path).ok_or_else(|| ExpenseError::backup_not_found(filename))
    }

    pub fn get_latest_backup(&self) -> ExpenseResult<Option<BackupInfo>> {
        Ok(self.list_backups()?.into_iter().next())
    }
}

fn parse_backup_info(path: &Path) -> Option<BackupInfo> {
    let filename = path.file_name()?.to_string_lossy().to_string();

    let date_part = filename.strip_prefix("backup-")?.strip_suffix(".json")?;
    let created_at = parse_backup_timestamp(date_part)?;

    let size_bytes = fs::metadata(path).ok()?.len();

    Some(BackupInfo {
        filename,
        path: path.to_path_buf(),
        created_at,
        size_bytes,
        is_monthly: created_at.day() == 1,
    })
}

/// Parse `YYYYMMDD-HHMMSS` or `YYYYMMDD-HHMMSS-mmm`
fn parse_backup_timestamp(date_str: &str) -> Option<DateTime<Utc>> {
    let parts: Vec<&str> = date_str.split('-').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return None;
    }

    let date_part = parts[0];
    let time_part = parts[1];
    let millis: u32 = match parts.get(2) {
        Some(ms) => ms.parse().ok()?,
        None => 0,
    };

    if date_part.len() != 8 || time_part.len() != 6 {
        return None;
    }

    let year: i32 = date_part.get(0..4)?.parse().ok()?;
    let month: u32 = date_part.get(4..6)?.parse().ok()?;
    let day: u32 = date_part.get(6..8)?.parse().ok()?;
    let hour: u32 = time_part.get(0..2)?.parse().ok()?;
    let minute: u32 = time_part.get(2..4)?.parse().ok()?;
    let second: u32 = time_part.get(4..6)?.parse().ok()?;

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let datetime = date.and_hms_milli_opt(hour, minute, second, millis)?;

    Some(datetime.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, EXPENSES_KEY};
    use std::thread::sleep;
    use std::time::Duration;
    use tempfile::TempDir;

    fn create_test_manager() -> (BackupManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let retention = BackupRetention {
            daily_count: 3,
            monthly_count: 2,
        };
        let manager = BackupManager::new(temp_dir.path().join("backups"), retention);
        (manager, temp_dir)
    }

    fn store() -> ExpenseStore<MemoryStore> {
        ExpenseStore::new(MemoryStore::with_entry(
            EXPENSES_KEY,
            r#"[{"id":"1","amount":50,"category":"Food","description":"","date":"2024-01-05T10:00:00.000Z"}]"#,
        ))
    }

    #[test]
    fn test_create_backup() {
        let (manager, _temp) = create_test_manager();

        let backup_path = manager.create_backup(&store()).unwrap();
        assert!(backup_path.exists());

        let contents = fs::read_to_string(&backup_path).unwrap();
        let archive: BackupArchive = serde_json::from_str(&contents).unwrap();
        assert_eq!(archive.schema_version, ARCHIVE_SCHEMA_VERSION);
        assert_eq!(archive.expense_count(), 1);
    }

    #[test]
    fn test_backup_of_empty_store() {
        let (manager, _temp) = create_test_manager();
        let empty = ExpenseStore::new(MemoryStore::new());

        let path = manager.create_backup(&empty).unwrap();
        let archive: BackupArchive =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert!(archive.expenses.is_array());
        assert_eq!(archive.expense_count(), 0);
    }

    #[test]
    fn test_list_backups_newest_first() {
        let (manager, _temp) = create_test_manager();
        let store = store();

        manager.create_backup(&store).unwrap();
        sleep(Duration::from_millis(20));
        let newest = manager.create_backup(&store).unwrap();

        let backups = manager.list_backups().unwrap();
        assert_eq!(backups.len(), 2);
        assert_eq!(backups[0].path, newest);
        assert_eq!(manager.get_latest_backup().unwrap().unwrap().path, newest);
    }

    #[test]
    fn test_retention_policy() {
        let (manager, _temp) = create_test_manager();
        let store = store();

        for _ in 0..5 {
            manager.create_backup(&store).unwrap();
            sleep(Duration::from_millis(20));
        }

        manager.enforce_retention().unwrap();

        // Monthly and daily quotas apply separately; on the 1st of a month
        // every backup counts as monthly.
        let remaining = manager.list_backups().unwrap();
        assert!(remaining.len() == 3 || remaining.len() == 2);
    }

    #[test]
    fn test_get_backup_unknown_name() {
        let (manager, _temp) = create_test_manager();
        let err = manager.get_backup("backup-20240101-000000.json").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_ignores_foreign_files() {
        let (manager, _temp) = create_test_manager();
        fs::create_dir_all(manager.backup_dir()).unwrap();
        fs::write(manager.backup_dir().join("notes.json"), "{}").unwrap();

        assert!(manager.list_backups().unwrap().is_empty());
    }

    #[test]
    fn test_parse_backup_timestamp() {
        let timestamp = parse_backup_timestamp("20251127-143022").unwrap();
        assert_eq!((timestamp.year(), timestamp.month(), timestamp.day()), (2025, 11, 27));

        let timestamp = parse_backup_timestamp("20251127-143022-456").unwrap();
        assert_eq!(timestamp.timestamp_subsec_millis(), 456);

        assert!(parse_backup_timestamp("2025-11-27").is_none());
        assert!(parse_backup_timestamp("20251327-143022").is_none());
    }
}
