//! Config CLI command

use clap::Args;

use crate::error::{ExpenseError, ExpenseResult};

use super::CliContext;

/// Arguments for `config`; with no options the current configuration is shown
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Currency symbol used when printing amounts
    #[arg(long)]
    pub currency: Option<String>,

    /// strftime-style pattern for dates, e.g. "%d/%m/%Y"
    #[arg(long)]
    pub date_format: Option<String>,

    /// Take a backup before each delete
    #[arg(long)]
    pub auto_backup: Option<bool>,
}

pub fn handle_config(ctx: &mut CliContext, args: ConfigArgs) -> ExpenseResult<()> {
    let changed = args.currency.is_some() || args.date_format.is_some() || args.auto_backup.is_some();

    if let Some(currency) = args.currency {
        ctx.settings.currency_symbol = currency;
    }
    if let Some(pattern) = args.date_format {
        if !is_valid_date_format(&pattern) {
            return Err(ExpenseError::Config(format!(
                "Invalid date format '{}'",
                pattern
            )));
        }
        ctx.settings.date_format = pattern;
    }
    if let Some(auto_backup) = args.auto_backup {
        ctx.settings.auto_backup = auto_backup;
    }

    if changed {
        ctx.settings.save(&ctx.paths)?;
        println!("Settings saved.");
        println!();
    }

    let settings = &ctx.settings;
    println!("Expense Tracker Configuration");
    println!("=============================");
    println!("Base directory:   {}", ctx.paths.base_dir().display());
    println!("Expenses file:    {}", ctx.paths.expenses_file().display());
    println!("Backup directory: {}", ctx.paths.backup_dir().display());
    println!("Audit log:        {}", ctx.paths.audit_log().display());
    println!();
    println!("Settings:");
    println!("  Currency symbol: {}", settings.currency_symbol);
    println!("  Date format:     {}", settings.date_format);
    println!("  Auto backup:     {}", settings.auto_backup);
    println!(
        "  Retention:       {} daily, {} monthly",
        settings.backup_retention.daily_count, settings.backup_retention.monthly_count
    );

    Ok(())
}

fn is_valid_date_format(pattern: &str) -> bool {
    use chrono::format::{Item, StrftimeItems};

    StrftimeItems::new(pattern).all(|item| !matches!(item, Item::Error))
}
