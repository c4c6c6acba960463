//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `parse_user` - Turn a `--user` flag into a user id
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::{Database, UserId};
use tracing::debug;

/// Open (and migrate) the database at `db_path`
pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    debug!(path = path_str, "Opening database");
    Database::new(path_str).context("Failed to open database")
}

pub fn parse_user(user: &str) -> Result<UserId> {
    UserId::new(user).context("User id cannot be empty")
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path)?;

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Record spending: tally add --amount 12.50 --description Lunch --category Food");
    println!("  2. Set a budget: tally budgets set Food 400");
    println!("  3. Start web UI: tally serve");

    Ok(())
}
