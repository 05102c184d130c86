//! Backup system
//!
//! Rolling JSON archives of the expense collection with a retention policy,
//! and restore from any archive.
//!
//! # Backup Format
//!
//! - `schema_version`: archive layout version
//! - `created_at`: when the backup was taken
//! - `expenses`: the stored collection, unchanged
//!
//! # Retention Policy
//!
//! By default the system keeps 30 daily backups and 12 monthly backups
//! (those taken on the first of a month).

mod manager;
mod restore;

pub use manager::{BackupArchive, BackupInfo, BackupManager, ARCHIVE_SCHEMA_VERSION};
pub use restore::{restore_from_file, validate_backup, RestoreResult, ValidationResult};
