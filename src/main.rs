//! expense-tui: a terminal expense logger
//!
//! Records dated expenses into a local key-value store and shows them as a
//! date-sorted ledger and as per-day totals, either in a keyboard-driven
//! terminal UI or through plain subcommands.

mod app;
mod cli;
mod commands;
mod data;
mod form;
mod notice;
mod selection;
mod ui;

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use cli::{AppConfig, Cli, Commands};
use data::{open_store, ExpenseInput, ExpenseStore, KeyValueStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Send logs to a file; the terminal belongs to the UI
fn init_logging(log_file: &Path) -> Result<()> {
    if let Some(parent) = log_file.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {parent:?}"))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file: {log_file:?}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn open_expenses(config: &AppConfig) -> Result<ExpenseStore<Box<dyn KeyValueStore>>> {
    Ok(ExpenseStore::new(open_store(config.storage, &config.data_dir)?))
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();
    let config = AppConfig::from_cli(&cli);
    init_logging(&config.log_file)?;
    info!(
        data_dir = %config.data_dir.display(),
        storage = ?config.storage,
        "expense-tui starting"
    );

    match cli.command.unwrap_or(Commands::Show) {
        Commands::Show => app::run(config)?,
        Commands::Add {
            date,
            amount,
            description,
        } => {
            let input = ExpenseInput::new(date, amount, description);
            commands::add(&open_expenses(&config)?, &input, &mut io::stdout().lock())?;
        }
        Commands::List => commands::list(&open_expenses(&config)?, &mut io::stdout().lock())?,
        Commands::Delete { indices, ids } => {
            commands::delete(
                &open_expenses(&config)?,
                &indices,
                &ids,
                &mut io::stdout().lock(),
            )?;
        }
        Commands::Summary => {
            commands::summary(&open_expenses(&config)?, &mut io::stdout().lock())?
        }
    }

    Ok(())
}
