//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init command and shared utilities (open_db, parse_user)
//! - `budgets` - Budget commands (list, set, delete)
//! - `reports` - Report commands (dashboard, monthly, categories, insights)
//! - `serve` - Web server command
//! - `transactions` - Transaction commands (add, list, delete)

pub mod budgets;
pub mod core;
pub mod reports;
pub mod serve;
pub mod transactions;

// Re-export command functions for main.rs
pub use budgets::*;
pub use core::*;
pub use reports::*;
pub use serve::*;
pub use transactions::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format an amount as currency
pub fn money(amount: f64) -> String {
    format!("${:.2}", amount)
}
