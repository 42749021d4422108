//! Command-line interface argument parsing for expense-tui.
//!
//! - `expense-tui` / `expense-tui show` opens the terminal UI
//! - `expense-tui add --date 2024-03-07 --amount 12.5 --description coffee`
//! - `expense-tui list`, `expense-tui summary`
//! - `expense-tui delete 0 2` or `expense-tui delete --id <ID>`

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::data::StorageKind;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "EXPENSE_TUI_DIR";

/// Log file name inside the data directory
const LOG_FILE_NAME: &str = "expense-tui.log";

/// A terminal expense logger with a daily totals view.
#[derive(Parser, Debug)]
#[command(name = "expense-tui")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the expense store and log file.
    /// Defaults to $EXPENSE_TUI_DIR, then the platform data directory.
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Storage backend for the expense collection
    #[arg(long, global = true, value_enum, default_value_t = StorageKind::Sqlite)]
    pub storage: StorageKind,

    /// Seconds a status notice stays visible in the UI
    #[arg(long, global = true, default_value = "3")]
    pub notice_secs: u64,

    /// Log file path (defaults to expense-tui.log in the data directory)
    #[arg(long, global = true)]
    pub log_file: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Launch the terminal UI (default)
    Show,

    /// Record a new expense
    Add {
        /// Date of the expense, YYYY-MM-DD, not after today
        #[arg(short, long)]
        date: String,

        /// Amount spent
        #[arg(short, long, allow_hyphen_values = true)]
        amount: String,

        /// What the money was spent on
        #[arg(short = 'm', long)]
        description: String,
    },

    /// Print every expense sorted by date
    List,

    /// Delete expenses by ledger position (as printed by `list`) or by id
    Delete {
        /// Positions in the date-sorted ledger
        #[arg(conflicts_with = "ids")]
        indices: Vec<usize>,

        /// Stable expense ids
        #[arg(long = "id")]
        ids: Vec<String>,
    },

    /// Print totals per day, in the order each day was first recorded
    Summary,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub storage: StorageKind,
    pub notice_duration: Duration,
    pub log_file: PathBuf,
}

impl AppConfig {
    /// Create AppConfig from the global CLI options
    pub fn from_cli(cli: &Cli) -> Self {
        Self::from_options(
            cli.data_dir.clone(),
            cli.storage,
            cli.notice_secs,
            cli.log_file.clone(),
        )
    }

    pub fn from_options(
        data_dir: Option<String>,
        storage: StorageKind,
        notice_secs: u64,
        log_file: Option<String>,
    ) -> Self {
        let data_dir = data_dir.map(PathBuf::from).unwrap_or_else(|| {
            if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
                PathBuf::from(dir)
            } else {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("expense-tui")
            }
        });

        let log_file = log_file
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(LOG_FILE_NAME));

        AppConfig {
            data_dir,
            storage,
            notice_duration: Duration::from_secs(notice_secs),
            log_file,
        }
    }
}
