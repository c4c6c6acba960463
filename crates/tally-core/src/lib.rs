//! Tally Core Library
//!
//! Shared functionality for the Tally expense tracker:
//! - Database access and migrations
//! - Transaction and budget stores
//! - Spending reports (category breakdown, monthly trend, dashboard, budget insights)
//! - Validation of raw request input

pub mod analytics;
pub mod db;
pub mod error;
pub mod models;
pub mod validation;

pub use db::{Database, TransactionFilter};
pub use error::{Error, Result};
pub use models::{Category, UserId};
