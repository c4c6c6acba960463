//! Domain models for Tally

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Spending categories shared by transactions and budgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Food,
    Transport,
    Entertainment,
    Housing,
    Healthcare,
    Shopping,
    Utilities,
}

impl Category {
    /// Every category, in declaration order
    pub const ALL: [Category; 7] = [
        Self::Food,
        Self::Transport,
        Self::Entertainment,
        Self::Housing,
        Self::Healthcare,
        Self::Shopping,
        Self::Utilities,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Entertainment => "Entertainment",
            Self::Housing => "Housing",
            Self::Healthcare => "Healthcare",
            Self::Shopping => "Shopping",
            Self::Utilities => "Utilities",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "food" => Ok(Self::Food),
            "transport" => Ok(Self::Transport),
            "entertainment" => Ok(Self::Entertainment),
            "housing" => Ok(Self::Housing),
            "healthcare" => Ok(Self::Healthcare),
            "shopping" => Ok(Self::Shopping),
            "utilities" => Ok(Self::Utilities),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Id of the user that single-user deployments act for
pub const DEFAULT_USER_ID: &str = "default-user";

/// Owner of every transaction and budget row
///
/// There is no authentication; callers name the user explicitly on every
/// store and report call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Build a user id from a non-empty string (surrounding whitespace is dropped)
    pub fn new(id: &str) -> Option<Self> {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The conventional fallback user; only used when a caller chooses it
impl Default for UserId {
    fn default() -> Self {
        Self(DEFAULT_USER_ID.to_string())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A recorded money movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    /// Always positive
    pub amount: f64,
    pub date: NaiveDate,
    pub description: String,
    pub category: Category,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated transaction ready for insertion
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub amount: f64,
    pub date: NaiveDate,
    pub description: String,
    pub category: Category,
    pub user_id: UserId,
}

/// Partial edit of a transaction; `None` leaves the stored value alone
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub amount: Option<f64>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub category: Option<Category>,
}

impl TransactionUpdate {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.date.is_none()
            && self.description.is_none()
            && self.category.is_none()
    }
}

/// Monthly spending limit for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: i64,
    pub category: Category,
    pub amount: f64,
    pub user_id: UserId,
    pub month: u32,
    pub year: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated budget upsert keyed on (user, category, month, year)
#[derive(Debug, Clone)]
pub struct BudgetUpsert {
    pub user_id: UserId,
    pub category: Category,
    pub month: u32,
    pub year: i32,
    pub amount: f64,
}

/// Inclusive date bounds; either side may be open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

// ============================================================================
// Store aggregate rows
// ============================================================================

/// Per-category sum and count straight from the store
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotalRow {
    pub category: Category,
    pub total: f64,
    pub count: i64,
}

/// Per-(year, month) sum and count straight from the store
#[derive(Debug, Clone, PartialEq)]
pub struct MonthTotalRow {
    pub year: i32,
    pub month: u32,
    pub total: f64,
    pub count: i64,
}

// ============================================================================
// Derived report types
// ============================================================================

/// Spending for one category over a date-filtered transaction set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub category: Category,
    pub total_amount: f64,
    pub transaction_count: i64,
    /// Rounded to 2 decimal places
    pub avg_amount: f64,
    /// Share of the grand total, rounded to 2 decimal places
    pub percentage: f64,
}

/// Category breakdown plus the grand total it was computed against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdownReport {
    pub categories: Vec<CategoryBreakdown>,
    pub total: f64,
}

/// Spending in one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyExpense {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub total_expenses: f64,
    pub transaction_count: i64,
}

/// Category with a single amount (dashboard totals and top category)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAmount {
    pub category: Category,
    pub amount: f64,
}

/// Current-month overview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_expenses: f64,
    pub transaction_count: i64,
    pub total_budget: f64,
    /// Highest-spending category this month; ties follow store order
    pub top_category: Option<CategoryAmount>,
    /// Latest transactions regardless of month
    pub recent_transactions: Vec<Transaction>,
    pub category_totals: Vec<CategoryAmount>,
    pub month: u32,
    pub year: i32,
}

/// How actual spending compares to a budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightStatus {
    /// Spent more than the budget
    Over,
    /// Spent less than 80% of the budget
    Under,
    Good,
}

impl InsightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Over => "over",
            Self::Under => "under",
            Self::Good => "good",
        }
    }
}

impl std::fmt::Display for InsightStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Budget versus actual spend for one category in one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub category: Category,
    pub budget: f64,
    pub actual: f64,
    /// actual - budget
    pub difference: f64,
    /// actual / budget * 100, or 0 for a zero budget
    pub percentage: f64,
    pub status: InsightStatus,
}
