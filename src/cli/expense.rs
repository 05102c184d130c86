//! Expense CLI commands
//!
//! Add, edit, delete and browse expenses, plus the monthly summary,
//! per-category detail, export and change history.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDate, SubsecRound, TimeZone, Utc};
use clap::{Args, ValueEnum};

use crate::backup::BackupManager;
use crate::display;
use crate::error::{ExpenseError, ExpenseResult};
use crate::export;
use crate::models::{
    Category, DraftEvent, Expense, ExpenseDraft, ExpenseId, PaymentMode, Period,
};
use crate::reports::{self, MonthlySummary};

use super::CliContext;

/// Arguments for `add`
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Amount spent, e.g. 120 or 49.99
    pub amount: String,

    /// Category (food, transport, entertainment, shopping, other)
    pub category: String,

    #[arg(short, long)]
    pub description: Option<String>,

    /// Date spent (YYYY-MM-DD, "today" or "yesterday"); defaults to now
    #[arg(long)]
    pub date: Option<String>,

    /// Payment mode (cash, card, upi)
    #[arg(short, long)]
    pub payment_mode: Option<String>,

    /// Mark as a recurring expense
    #[arg(short, long)]
    pub recurring: bool,
}

/// Arguments for `edit`; omitted fields keep their current value
#[derive(Args, Debug)]
pub struct EditArgs {
    pub id: String,

    #[arg(short, long)]
    pub amount: Option<String>,

    #[arg(short, long)]
    pub category: Option<String>,

    #[arg(short, long)]
    pub description: Option<String>,

    #[arg(long)]
    pub date: Option<String>,

    #[arg(short, long)]
    pub payment_mode: Option<String>,

    #[arg(short, long)]
    pub recurring: Option<bool>,
}

/// Arguments for `delete`
#[derive(Args, Debug)]
pub struct DeleteArgs {
    pub id: String,

    /// Delete without asking
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for `show`
#[derive(Args, Debug)]
pub struct ShowArgs {
    pub id: String,
}

/// Arguments for `list`
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Month to list (YYYY-MM, "current" or "last"); all months if omitted
    #[arg(short, long)]
    pub month: Option<String>,

    /// Only this category
    #[arg(short, long)]
    pub category: Option<String>,

    /// Maximum number of expenses to show
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for `summary`
#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Month to summarize (YYYY-MM, "current" or "last")
    #[arg(short, long, default_value = "current")]
    pub month: String,
}

/// Arguments for `category`
#[derive(Args, Debug)]
pub struct CategoryArgs {
    pub category: String,

    #[arg(short, long, default_value = "current")]
    pub month: String,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ExportFormat {
    Csv,
    Json,
}

/// Arguments for `export`
#[derive(Args, Debug)]
pub struct ExportArgs {
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
    pub format: ExportFormat,

    /// Limit to one month; the whole collection if omitted
    #[arg(short, long)]
    pub month: Option<String>,

    /// Export the month's category breakdown instead of the records (CSV)
    #[arg(short, long, requires = "month")]
    pub breakdown: bool,

    /// Output file; standard output if omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for `history`
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Only changes to this expense
    pub id: Option<String>,

    #[arg(short, long, default_value = "20")]
    pub limit: usize,
}

pub fn handle_add(ctx: &CliContext, args: AddArgs) -> ExpenseResult<()> {
    let mut events = vec![
        DraftEvent::AmountChanged(args.amount),
        DraftEvent::CategorySelected(parse_category(&args.category)?),
    ];
    if let Some(description) = args.description {
        events.push(DraftEvent::DescriptionChanged(description));
    }
    if let Some(date) = args.date {
        events.push(DraftEvent::DateChanged(parse_date_arg(&date)?));
    }
    if let Some(mode) = args.payment_mode {
        events.push(DraftEvent::PaymentModeSelected(parse_payment_mode(&mode)?));
    }
    if args.recurring {
        events.push(DraftEvent::RecurringToggled);
    }

    let draft = ExpenseDraft::default().apply_all(events);
    let expense = ctx.service().submit(&draft)?;

    println!(
        "Added {} expense of {} ({})",
        expense.category,
        display::format_amount(expense.amount, &ctx.settings),
        expense.id
    );
    Ok(())
}

pub fn handle_edit(ctx: &CliContext, args: EditArgs) -> ExpenseResult<()> {
    let id = parse_id(&args.id)?;

    let mut events = Vec::new();
    if let Some(amount) = args.amount {
        events.push(DraftEvent::AmountChanged(amount));
    }
    if let Some(category) = args.category {
        events.push(DraftEvent::CategorySelected(parse_category(&category)?));
    }
    if let Some(description) = args.description {
        events.push(DraftEvent::DescriptionChanged(description));
    }
    if let Some(date) = args.date {
        events.push(DraftEvent::DateChanged(parse_date_arg(&date)?));
    }
    if let Some(mode) = args.payment_mode {
        events.push(DraftEvent::PaymentModeSelected(parse_payment_mode(&mode)?));
    }
    if let Some(recurring) = args.recurring {
        events.push(DraftEvent::RecurringSet(recurring));
    }

    if events.is_empty() {
        println!("Nothing to change.");
        return Ok(());
    }

    let updated = ctx.service().edit(&id, events)?;

    println!("Updated expense {}", updated.id);
    print!("{}", display::format_expense_details(&updated, &ctx.settings));
    Ok(())
}

pub fn handle_delete(ctx: &CliContext, args: DeleteArgs) -> ExpenseResult<()> {
    let service = ctx.service();
    let id = parse_id(&args.id)?;
    let expense = service.require(&id)?;

    if !args.force {
        print!("{}", display::format_expense_details(&expense, &ctx.settings));
        println!();
        println!("Are you sure you want to delete this expense?");
        println!("To proceed, run again with --force flag:");
        println!("  expenses delete {} --force", id);
        return Ok(());
    }

    if ctx.settings.auto_backup {
        let manager = BackupManager::new(
            ctx.paths.backup_dir(),
            ctx.settings.backup_retention.clone(),
        );
        manager.create_backup_with_retention(&ctx.store)?;
    }

    let removed = service.delete(&id)?;
    println!(
        "Deleted {} expense of {} ({})",
        removed.category,
        display::format_amount(removed.amount, &ctx.settings),
        removed.id
    );
    Ok(())
}

pub fn handle_show(ctx: &CliContext, args: ShowArgs) -> ExpenseResult<()> {
    let expense = ctx.service().require(&parse_id(&args.id)?)?;
    print!("{}", display::format_expense_details(&expense, &ctx.settings));
    Ok(())
}

pub fn handle_list(ctx: &CliContext, args: ListArgs) -> ExpenseResult<()> {
    let service = ctx.service();
    let mut expenses = match args.month.as_deref() {
        Some(month) => service.list_in(parse_period(month)?)?,
        None => service.list()?,
    };

    if let Some(category) = args.category {
        let category = parse_category(&category)?;
        expenses.retain(|e| e.category == category);
    }
    if let Some(limit) = args.limit {
        expenses.truncate(limit);
    }

    print!("{}", display::format_expense_table(&expenses, &ctx.settings));
    if !expenses.is_empty() {
        println!(
            "Total: {} ({} expense(s))",
            display::format_amount(reports::total(&expenses)?, &ctx.settings),
            expenses.len()
        );
    }
    Ok(())
}

pub fn handle_summary(ctx: &CliContext, args: SummaryArgs) -> ExpenseResult<()> {
    let period = parse_period(&args.month)?;
    let all = ctx.store.load_all()?;
    let summary = MonthlySummary::generate(&all, period)?;

    print!("{}", summary.format_terminal(&ctx.settings.currency_symbol));
    if !summary.is_empty() {
        println!();
        print!(
            "{}",
            display::format_expense_table(&summary.expenses, &ctx.settings)
        );
    }
    Ok(())
}

pub fn handle_category(ctx: &CliContext, args: CategoryArgs) -> ExpenseResult<()> {
    let category = parse_category(&args.category)?;
    let period = parse_period(&args.month)?;
    let in_period = ctx.service().list_in(period)?;

    let detail = reports::category_detail(&in_period, category)?;
    print!(
        "{}",
        display::format_category_detail(&detail, period, &ctx.settings)
    );

    let matching: Vec<Expense> = in_period
        .into_iter()
        .filter(|e| e.category == category)
        .collect();
    if !matching.is_empty() {
        print!("{}", display::format_expense_table(&matching, &ctx.settings));
    }
    Ok(())
}

pub fn handle_export(ctx: &CliContext, args: ExportArgs) -> ExpenseResult<()> {
    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(File::create(path).map_err(|e| {
            ExpenseError::Export(format!("Failed to create {}: {}", path.display(), e))
        })?),
        None => Box::new(io::stdout().lock()),
    };

    let service = ctx.service();
    match (args.format, args.month.as_deref()) {
        (ExportFormat::Csv, Some(month)) if args.breakdown => {
            let all = ctx.store.load_all()?;
            let summary = MonthlySummary::generate(&all, parse_period(month)?)?;
            export::export_breakdown_csv(&summary, writer)?;
        }
        (_, _) if args.breakdown => {
            return Err(ExpenseError::Validation(
                "Breakdown export is only available as CSV".into(),
            ));
        }
        (format, month) => {
            let expenses = match month {
                Some(month) => service.list_in(parse_period(month)?)?,
                None => service.list()?,
            };
            match format {
                ExportFormat::Csv => export::export_expenses_csv(&expenses, writer)?,
                ExportFormat::Json => export::export_expenses_json(&expenses, writer)?,
            }
        }
    }

    if let Some(path) = &args.output {
        eprintln!("Exported to {}", path.display());
    }
    Ok(())
}

pub fn handle_history(ctx: &CliContext, args: HistoryArgs) -> ExpenseResult<()> {
    let entries = match &args.id {
        Some(id) => ctx.audit.read_for(id)?,
        None => ctx.audit.read_recent(args.limit)?,
    };

    if entries.is_empty() {
        println!("No changes recorded.");
        return Ok(());
    }

    let start = entries.len().saturating_sub(args.limit);
    for entry in &entries[start..] {
        println!("{}", entry.format_human_readable());
    }
    Ok(())
}

fn parse_id(raw: &str) -> ExpenseResult<ExpenseId> {
    raw.parse::<ExpenseId>()
        .map_err(|e| ExpenseError::Validation(e.to_string()))
}

fn parse_category(raw: &str) -> ExpenseResult<Category> {
    raw.parse::<Category>()
        .map_err(|e| ExpenseError::Validation(e.to_string()))
}

fn parse_payment_mode(raw: &str) -> ExpenseResult<PaymentMode> {
    raw.parse::<PaymentMode>()
        .map_err(|e| ExpenseError::Validation(e.to_string()))
}

fn parse_period(raw: &str) -> ExpenseResult<Period> {
    raw.parse::<Period>()
        .map_err(|e| ExpenseError::Validation(e.to_string()))
}

/// Parse a `--date` value into a timestamp on the local calendar
///
/// Today maps to the current time; earlier days to local noon. Future days
/// are rejected.
fn parse_date_arg(raw: &str) -> ExpenseResult<DateTime<Utc>> {
    let today = Local::now().date_naive();
    let date = match raw.trim().to_lowercase().as_str() {
        "today" => today,
        "yesterday" => today.pred_opt().unwrap_or(today),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d").map_err(|_| {
            ExpenseError::Validation(format!(
                "Invalid date '{}'. Expected YYYY-MM-DD, 'today' or 'yesterday'",
                raw
            ))
        })?,
    };

    if date > today {
        return Err(ExpenseError::Validation(format!(
            "Date {} is in the future",
            date
        )));
    }
    if date == today {
        return Ok(Utc::now().trunc_subsecs(3));
    }

    let noon = date
        .and_hms_opt(12, 0, 0)
        .and_then(|dt| Local.from_local_datetime(&dt).earliest())
        .ok_or_else(|| ExpenseError::Validation(format!("Invalid local date {}", date)))?;
    Ok(noon.with_timezone(&Utc))
}
