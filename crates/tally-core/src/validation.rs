//! Request validation
//!
//! Raw inputs arrive as optional strings (query parameters) or loosely typed
//! JSON bodies. Everything here turns them into the typed values the stores
//! accept, or fails with `Error::Validation` naming the offending field.
//! Nothing in this module touches the database.

use chrono::{DateTime, Datelike, NaiveDate};
use serde::Deserialize;

use crate::db::TransactionFilter;
use crate::error::{Error, Result};
use crate::models::{BudgetUpsert, Category, DateRange, NewTransaction, TransactionUpdate, UserId};

pub const DEFAULT_PAGE_LIMIT: i64 = 100;
pub const DEFAULT_MAX_PAGE_LIMIT: i64 = 1000;
pub const DEFAULT_MONTHS_BACK: u32 = 6;
pub const MAX_MONTHS_BACK: u32 = 120;
pub const MAX_DESCRIPTION_LEN: usize = 200;
pub const MIN_BUDGET_YEAR: i32 = 2020;
pub const MIN_DATE_YEAR: i32 = 1;
pub const MAX_DATE_YEAR: i32 = 9999;

/// Treat empty query values the same as absent ones
fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// A number sent either as a JSON number or a numeric string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    fn to_f64(&self, field: &str) -> Result<f64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| Error::invalid_field(field, format!("{} must be a number", field)))?,
        };
        if !value.is_finite() {
            return Err(Error::invalid_field(field, format!("{} must be a number", field)));
        }
        Ok(value)
    }

    fn to_integer(&self, field: &str) -> Result<i64> {
        let value = self.to_f64(field)?;
        if value.fract() != 0.0 {
            return Err(Error::invalid_field(
                field,
                format!("{} must be a whole number", field),
            ));
        }
        Ok(value as i64)
    }
}

// ============================================================================
// Scalar parsers
// ============================================================================

/// Parse a record identifier from a path segment
pub fn parse_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| Error::InvalidIdentifier(raw.to_string()))
}

/// Resolve the user a request acts for, falling back to `default_user`
pub fn parse_user_id(raw: Option<&str>, default_user: &UserId) -> UserId {
    present(raw)
        .and_then(UserId::new)
        .unwrap_or_else(|| default_user.clone())
}

pub fn parse_category(raw: &str) -> Result<Category> {
    raw.parse()
        .map_err(|_| Error::invalid_field("category", "Invalid category"))
}

/// Parse `YYYY-MM-DD`, or the date part of an RFC 3339 timestamp
pub fn parse_date(raw: &str, field: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| {
            Error::invalid_field(
                field,
                format!("Invalid {} (use YYYY-MM-DD)", field),
            )
        })?;
    ensure_date(date, field)?;
    Ok(date)
}

/// Parse optional inclusive bounds; start must not be after end
pub fn parse_date_range(start: Option<&str>, end: Option<&str>) -> Result<DateRange> {
    let start = present(start)
        .map(|s| parse_date(s, "startDate"))
        .transpose()?;
    let end = present(end).map(|s| parse_date(s, "endDate")).transpose()?;

    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return Err(Error::invalid_field(
                "startDate",
                "startDate must not be after endDate",
            ));
        }
    }

    Ok(DateRange { start, end })
}

/// How many months the trend report looks back
pub fn parse_months_back(raw: Option<&str>) -> Result<u32> {
    let Some(raw) = present(raw) else {
        return Ok(DEFAULT_MONTHS_BACK);
    };
    let months = raw.parse::<u32>().map_err(|_| months_back_error())?;
    ensure_months_back(months)?;
    Ok(months)
}

pub fn ensure_months_back(months: u32) -> Result<()> {
    if !(1..=MAX_MONTHS_BACK).contains(&months) {
        return Err(months_back_error());
    }
    Ok(())
}

fn months_back_error() -> Error {
    Error::invalid_field(
        "months",
        format!("months must be between 1 and {}", MAX_MONTHS_BACK),
    )
}

fn parse_query_integer(raw: Option<&str>, field: &str) -> Result<Option<i64>> {
    present(raw)
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| Error::invalid_field(field, format!("{} must be an integer", field)))
        })
        .transpose()
}

// ============================================================================
// Field rules shared with the stores
// ============================================================================

pub fn ensure_transaction_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::invalid_field(
            "amount",
            "Amount must be greater than 0",
        ));
    }
    Ok(())
}

pub fn ensure_budget_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::invalid_field(
            "amount",
            "Budget amount cannot be negative",
        ));
    }
    Ok(())
}

/// Dates are stored and compared as `YYYY-MM-DD` text, so the year must
/// fit in four unsigned digits
pub fn ensure_date(date: NaiveDate, field: &str) -> Result<()> {
    if !(MIN_DATE_YEAR..=MAX_DATE_YEAR).contains(&date.year()) {
        return Err(Error::invalid_field(
            field,
            format!(
                "{} year must be between {} and {}",
                field, MIN_DATE_YEAR, MAX_DATE_YEAR
            ),
        ));
    }
    Ok(())
}

pub fn ensure_month(month: u32) -> Result<()> {
    if !(1..=12).contains(&month) {
        return Err(Error::invalid_field("month", "month must be between 1 and 12"));
    }
    Ok(())
}

pub fn ensure_year(year: i32) -> Result<()> {
    if year < MIN_BUDGET_YEAR {
        return Err(Error::invalid_field(
            "year",
            format!("year must be {} or later", MIN_BUDGET_YEAR),
        ));
    }
    Ok(())
}

/// Trim a description and check it is 1..=200 characters
pub fn normalize_description(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_field(
            "description",
            "Description is required",
        ));
    }
    if trimmed.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(Error::invalid_field(
            "description",
            format!(
                "Description cannot exceed {} characters",
                MAX_DESCRIPTION_LEN
            ),
        ));
    }
    Ok(trimmed.to_string())
}

fn month_from(raw: Option<i64>, today: NaiveDate) -> Result<u32> {
    match raw {
        None => Ok(today.month()),
        Some(m) => {
            let month = u32::try_from(m)
                .map_err(|_| Error::invalid_field("month", "month must be between 1 and 12"))?;
            ensure_month(month)?;
            Ok(month)
        }
    }
}

fn year_from(raw: Option<i64>, today: NaiveDate) -> Result<i32> {
    match raw {
        None => Ok(today.year()),
        Some(y) => {
            let year = i32::try_from(y).map_err(|_| {
                Error::invalid_field("year", format!("year must be {} or later", MIN_BUDGET_YEAR))
            })?;
            ensure_year(year)?;
            Ok(year)
        }
    }
}

// ============================================================================
// Transactions
// ============================================================================

/// Raw query parameters for listing transactions
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionListParams {
    pub user_id: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
}

/// A validated transaction listing request
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionQuery {
    pub filter: TransactionFilter,
    pub limit: i64,
    pub page: i64,
}

impl TransactionQuery {
    /// Rows to skip for the requested page
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl TransactionListParams {
    /// Validate filters and normalise pagination
    ///
    /// `limit` is clamped to `1..=max_limit` and `page` to at least 1;
    /// values that are not integers are rejected.
    pub fn validate(&self, default_user: &UserId, max_limit: i64) -> Result<TransactionQuery> {
        let user_id = parse_user_id(self.user_id.as_deref(), default_user);
        let category = present(self.category.as_deref())
            .map(parse_category)
            .transpose()?;
        let range = parse_date_range(self.start_date.as_deref(), self.end_date.as_deref())?;

        let limit = parse_query_integer(self.limit.as_deref(), "limit")?
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, max_limit.max(1));
        let page = parse_query_integer(self.page.as_deref(), "page")?
            .unwrap_or(1)
            .max(1);

        Ok(TransactionQuery {
            filter: TransactionFilter::for_user(user_id)
                .category(category)
                .date_range(range),
            limit,
            page,
        })
    }
}

/// Body of a transaction create request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransactionInput {
    pub amount: Option<NumericInput>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub user_id: Option<String>,
}

impl NewTransactionInput {
    pub fn validate(&self, default_user: &UserId) -> Result<NewTransaction> {
        let missing = |field: &str| {
            Error::invalid_field(field, format!("Missing required field: {}", field))
        };

        let amount = self
            .amount
            .as_ref()
            .ok_or_else(|| missing("amount"))?
            .to_f64("amount")?;
        let date = present(self.date.as_deref()).ok_or_else(|| missing("date"))?;
        let description = self.description.as_deref().ok_or_else(|| missing("description"))?;
        let category = present(self.category.as_deref()).ok_or_else(|| missing("category"))?;

        ensure_transaction_amount(amount)?;

        Ok(NewTransaction {
            amount,
            date: parse_date(date, "date")?,
            description: normalize_description(description)?,
            category: parse_category(category)?,
            user_id: parse_user_id(self.user_id.as_deref(), default_user),
        })
    }
}

/// Body of a transaction edit request; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdateInput {
    pub amount: Option<NumericInput>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl TransactionUpdateInput {
    pub fn validate(&self) -> Result<TransactionUpdate> {
        let amount = self
            .amount
            .as_ref()
            .map(|a| a.to_f64("amount"))
            .transpose()?;
        if let Some(amount) = amount {
            ensure_transaction_amount(amount)?;
        }

        Ok(TransactionUpdate {
            amount,
            date: present(self.date.as_deref())
                .map(|d| parse_date(d, "date"))
                .transpose()?,
            description: self
                .description
                .as_deref()
                .map(normalize_description)
                .transpose()?,
            category: present(self.category.as_deref())
                .map(parse_category)
                .transpose()?,
        })
    }
}

// ============================================================================
// Budgets
// ============================================================================

/// Raw query parameters for listing budgets
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetListParams {
    pub user_id: Option<String>,
    pub month: Option<String>,
    pub year: Option<String>,
}

/// A validated budget listing request
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetPeriod {
    pub user_id: UserId,
    pub month: u32,
    pub year: i32,
}

impl BudgetListParams {
    /// Month and year default to the month containing `today`
    pub fn validate(&self, default_user: &UserId, today: NaiveDate) -> Result<BudgetPeriod> {
        Ok(BudgetPeriod {
            user_id: parse_user_id(self.user_id.as_deref(), default_user),
            month: month_from(parse_query_integer(self.month.as_deref(), "month")?, today)?,
            year: year_from(parse_query_integer(self.year.as_deref(), "year")?, today)?,
        })
    }
}

/// Body of a budget upsert request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetInput {
    pub category: Option<String>,
    pub amount: Option<NumericInput>,
    pub user_id: Option<String>,
    pub month: Option<NumericInput>,
    pub year: Option<NumericInput>,
}

impl BudgetInput {
    /// Month and year default to the month containing `today`
    pub fn validate(&self, default_user: &UserId, today: NaiveDate) -> Result<BudgetUpsert> {
        let category = present(self.category.as_deref()).ok_or_else(|| {
            Error::invalid_field("category", "Missing required field: category")
        })?;
        let amount = self
            .amount
            .as_ref()
            .ok_or_else(|| Error::invalid_field("amount", "Missing required field: amount"))?
            .to_f64("amount")?;
        ensure_budget_amount(amount)?;

        let month = self
            .month
            .as_ref()
            .map(|m| m.to_integer("month"))
            .transpose()?;
        let year = self
            .year
            .as_ref()
            .map(|y| y.to_integer("year"))
            .transpose()?;

        Ok(BudgetUpsert {
            user_id: parse_user_id(self.user_id.as_deref(), default_user),
            category: parse_category(category)?,
            month: month_from(month, today)?,
            year: year_from(year, today)?,
            amount,
        })
    }
}

/// Body of a budget amount edit
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BudgetAmountInput {
    pub amount: Option<NumericInput>,
}

impl BudgetAmountInput {
    pub fn validate(&self) -> Result<f64> {
        let amount = self
            .amount
            .as_ref()
            .ok_or_else(|| {
                Error::invalid_field("amount", "Valid amount is required and cannot be negative")
            })?
            .to_f64("amount")?;
        ensure_budget_amount(amount)?;
        Ok(amount)
    }
}
