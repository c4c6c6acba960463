//! Transaction filter builder for constructing dynamic SQL queries
//!
//! This module provides a builder pattern for constructing WHERE clauses
//! and related SQL components for transaction queries.

use crate::models::{Category, DateRange, UserId};

/// Builder for constructing transaction query filters
///
/// Shared by the paginated list, the count, and the grouped aggregate
/// queries so all of them see exactly the same row set.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFilter {
    pub user_id: UserId,
    pub category: Option<Category>,
    pub date_range: DateRange,
}

/// Result of building a filter - contains SQL components and parameters
pub struct FilterResult {
    /// WHERE clause including "WHERE" keyword
    pub where_clause: String,
    /// Parameters for the query (boxed for rusqlite compatibility)
    pub params: Vec<Box<dyn rusqlite::ToSql>>,
}

impl TransactionFilter {
    /// Create a filter matching every transaction owned by `user_id`
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            category: None,
            date_range: DateRange::default(),
        }
    }

    /// Set category filter
    pub fn category(mut self, category: Option<Category>) -> Self {
        self.category = category;
        self
    }

    /// Set date range filter (inclusive on both ends)
    pub fn date_range(mut self, range: DateRange) -> Self {
        self.date_range = range;
        self
    }

    /// Build the filter components
    pub fn build(&self) -> FilterResult {
        let mut conditions = vec!["t.user_id = ?".to_string()];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> =
            vec![Box::new(self.user_id.as_str().to_string())];

        if let Some(category) = self.category {
            conditions.push("t.category = ?".to_string());
            params.push(Box::new(category.as_str()));
        }

        // Dates are stored as YYYY-MM-DD so string comparison is chronological
        if let Some(start) = self.date_range.start {
            conditions.push("t.date >= ?".to_string());
            params.push(Box::new(start.to_string()));
        }
        if let Some(end) = self.date_range.end {
            conditions.push("t.date <= ?".to_string());
            params.push(Box::new(end.to_string()));
        }

        FilterResult {
            where_clause: format!("WHERE {}", conditions.join(" AND ")),
            params,
        }
    }
}

impl FilterResult {
    /// Build a COUNT query
    pub fn build_count_query(&self) -> String {
        format!("SELECT COUNT(*) FROM transactions t {}", self.where_clause)
    }

    /// Get parameter references for query execution
    pub fn params_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }

    /// Take the parameter vector to append pagination params
    pub fn into_params(self) -> Vec<Box<dyn rusqlite::ToSql>> {
        self.params
    }
}
