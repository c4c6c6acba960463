//! Tally CLI - Personal expense and budget tracker
//!
//! Usage:
//!   tally init                              Initialize database
//!   tally add -a 12.50 -d Lunch -c Food     Record a transaction
//!   tally budgets set Food 400              Set this month's Food budget
//!   tally report dashboard                  Show the current month
//!   tally serve --port 3000                 Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Serve {
            port,
            host,
            static_dir,
        } => commands::cmd_serve(&cli.db, &host, port, static_dir.as_deref()).await,
        Commands::Add {
            amount,
            date,
            description,
            category,
            user,
        } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_add(&db, amount, date.as_deref(), &description, &category, &user)?;
            Ok(())
        }
        Commands::Transactions { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                None => commands::cmd_transactions_list(
                    &db,
                    20,
                    None,
                    tally_core::models::DEFAULT_USER_ID,
                ),
                Some(TransactionsAction::List {
                    limit,
                    category,
                    user,
                }) => commands::cmd_transactions_list(&db, limit, category.as_deref(), &user),
                Some(TransactionsAction::Delete { id }) => {
                    commands::cmd_transactions_delete(&db, id)
                }
            }
        }
        Commands::Budgets { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                None => {
                    commands::cmd_budgets_list(&db, None, None, tally_core::models::DEFAULT_USER_ID)
                }
                Some(BudgetsAction::List { month, year, user }) => {
                    commands::cmd_budgets_list(&db, month, year, &user)
                }
                Some(BudgetsAction::Set {
                    category,
                    amount,
                    month,
                    year,
                    user,
                }) => {
                    commands::cmd_budgets_set(&db, &category, amount, month, year, &user)?;
                    Ok(())
                }
                Some(BudgetsAction::Delete { id }) => commands::cmd_budgets_delete(&db, id),
            }
        }
        Commands::Report { report_type } => {
            let db = commands::open_db(&cli.db)?;
            match report_type {
                ReportType::Dashboard { user, json } => {
                    commands::cmd_report_dashboard(&db, &user, json)
                }
                ReportType::Monthly { months, user, json } => {
                    commands::cmd_report_monthly(&db, months, &user, json)
                }
                ReportType::Categories {
                    from,
                    to,
                    user,
                    json,
                } => commands::cmd_report_categories(
                    &db,
                    from.as_deref(),
                    to.as_deref(),
                    &user,
                    json,
                ),
                ReportType::Insights { user, json } => {
                    commands::cmd_report_insights(&db, &user, json)
                }
            }
        }
    }
}
