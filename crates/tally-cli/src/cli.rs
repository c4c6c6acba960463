//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Track expenses and budgets
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Self-hosted personal expense and budget tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "tally.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    ///
    /// Reads TALLY_DEFAULT_USER, TALLY_ALLOWED_ORIGINS and TALLY_MAX_PAGE_LIMIT
    /// from the environment.
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Record a transaction
    Add {
        /// Amount spent (must be greater than 0)
        #[arg(short, long)]
        amount: f64,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,

        /// What the money was spent on
        #[arg(short, long)]
        description: String,

        /// Category: Food, Transport, Entertainment, Housing, Healthcare, Shopping, Utilities
        #[arg(short, long)]
        category: String,

        /// User the transaction belongs to
        #[arg(long, default_value = tally_core::models::DEFAULT_USER_ID)]
        user: String,
    },

    /// Manage transactions (list, delete)
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Manage monthly budgets (list, set, delete)
    Budgets {
        #[command(subcommand)]
        action: Option<BudgetsAction>,
    },

    /// Generate reports
    Report {
        #[command(subcommand)]
        report_type: ReportType,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List transactions, newest first
    List {
        /// Maximum number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,

        /// Only show one category
        #[arg(short, long)]
        category: Option<String>,

        /// User whose transactions to show
        #[arg(long, default_value = tally_core::models::DEFAULT_USER_ID)]
        user: String,
    },

    /// Permanently delete a transaction
    Delete {
        /// Transaction ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum BudgetsAction {
    /// List budgets for a month
    List {
        /// Month (1-12), defaults to the current month
        #[arg(long)]
        month: Option<u32>,

        /// Year, defaults to the current year
        #[arg(long)]
        year: Option<i32>,

        /// User whose budgets to show
        #[arg(long, default_value = tally_core::models::DEFAULT_USER_ID)]
        user: String,
    },

    /// Create or replace a category budget
    Set {
        /// Category to budget
        category: String,

        /// Monthly limit (0 or more)
        amount: f64,

        /// Month (1-12), defaults to the current month
        #[arg(long)]
        month: Option<u32>,

        /// Year, defaults to the current year
        #[arg(long)]
        year: Option<i32>,

        /// User the budget belongs to
        #[arg(long, default_value = tally_core::models::DEFAULT_USER_ID)]
        user: String,
    },

    /// Permanently delete a budget
    Delete {
        /// Budget ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum ReportType {
    /// Current-month overview
    Dashboard {
        #[arg(long, default_value = tally_core::models::DEFAULT_USER_ID)]
        user: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Spending per month
    Monthly {
        /// Months of history to include
        #[arg(long, default_value = "6")]
        months: u32,

        #[arg(long, default_value = tally_core::models::DEFAULT_USER_ID)]
        user: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Spending by category
    Categories {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        #[arg(long, default_value = tally_core::models::DEFAULT_USER_ID)]
        user: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Budget versus actual for the current month
    Insights {
        #[arg(long, default_value = tally_core::models::DEFAULT_USER_ID)]
        user: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
