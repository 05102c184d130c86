//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod backup;
pub mod config;
pub mod expense;

pub use backup::{handle_backup_command, BackupCommands};
pub use config::{handle_config, ConfigArgs};
pub use expense::{
    handle_add, handle_category, handle_delete, handle_edit, handle_export, handle_history,
    handle_list, handle_show, handle_summary, AddArgs, CategoryArgs, DeleteArgs, EditArgs,
    ExportArgs, HistoryArgs, ListArgs, ShowArgs, SummaryArgs,
};

use crate::audit::AuditLogger;
use crate::config::{ExpensePaths, Settings};
use crate::error::ExpenseResult;
use crate::services::ExpenseService;
use crate::storage::{self, ExpenseStore, FileStore};

/// Everything a command needs, opened once per invocation
pub struct CliContext {
    pub paths: ExpensePaths,
    pub settings: Settings,
    pub store: ExpenseStore<FileStore>,
    pub audit: AuditLogger,
}

impl CliContext {
    pub fn open(paths: ExpensePaths) -> ExpenseResult<Self> {
        let settings = Settings::load_or_create(&paths)?;
        let store = storage::open(&paths)?;
        let audit = AuditLogger::new(paths.audit_log());

        Ok(Self {
            paths,
            settings,
            store,
            audit,
        })
    }

    /// Expense service with auditing enabled
    pub fn service(&self) -> ExpenseService<'_, FileStore> {
        ExpenseService::new(&self.store).with_audit(&self.audit)
    }
}
