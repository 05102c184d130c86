use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use expense_tracker::cli::{self, BackupCommands, CliContext};
use expense_tracker::config::ExpensePaths;
use expense_tracker::ExpenseError;

#[derive(Parser)]
#[command(
    name = "expenses",
    version,
    about = "Track personal expenses by category and month",
    long_about = "Record what you spend, then see monthly totals and a \
                  per-category breakdown. Data is kept in a single JSON file \
                  under the platform config directory, or under \
                  $EXPENSE_TRACKER_DATA_DIR when set."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a new expense
    Add(cli::AddArgs),

    /// Change an existing expense
    Edit(cli::EditArgs),

    /// Delete an expense
    #[command(alias = "rm")]
    Delete(cli::DeleteArgs),

    /// Show one expense
    Show(cli::ShowArgs),

    /// List expenses, newest first
    #[command(alias = "ls")]
    List(cli::ListArgs),

    /// Monthly totals and category breakdown
    Summary(cli::SummaryArgs),

    /// Spending in one category for a month
    Category(cli::CategoryArgs),

    /// Export expenses as CSV or JSON
    Export(cli::ExportArgs),

    /// Show the change history
    History(cli::HistoryArgs),

    /// Backup management commands
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Show or change configuration
    Config(cli::ConfigArgs),
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_secs()
        .format_target(false)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ExpenseError>() {
                Some(expense_err) => {
                    eprintln!("{}", expense_err.user_notice());
                    eprintln!("  {}", expense_err);
                }
                None => eprintln!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        println!("Expense Tracker - track personal expenses");
        println!();
        println!("Run 'expenses --help' for usage information.");
        return Ok(());
    };

    let paths = ExpensePaths::new()?;
    let mut ctx = CliContext::open(paths)?;

    match command {
        Commands::Add(args) => cli::handle_add(&ctx, args)?,
        Commands::Edit(args) => cli::handle_edit(&ctx, args)?,
        Commands::Delete(args) => cli::handle_delete(&ctx, args)?,
        Commands::Show(args) => cli::handle_show(&ctx, args)?,
        Commands::List(args) => cli::handle_list(&ctx, args)?,
        Commands::Summary(args) => cli::handle_summary(&ctx, args)?,
        Commands::Category(args) => cli::handle_category(&ctx, args)?,
        Commands::Export(args) => cli::handle_export(&ctx, args)?,
        Commands::History(args) => cli::handle_history(&ctx, args)?,
        Commands::Backup(cmd) => cli::handle_backup_command(&ctx, cmd)?,
        Commands::Config(args) => cli::handle_config(&mut ctx, args)?,
    }

    Ok(())
}
