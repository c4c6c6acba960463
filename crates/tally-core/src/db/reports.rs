//! Spending reports and analytics
//!
//! Each report has a `*_on` variant that takes "today" explicitly; the plain
//! variant uses the current UTC date.

use chrono::{Datelike, NaiveDate, Utc};

use super::transaction_filter::TransactionFilter;
use super::Database;
use crate::analytics;
use crate::error::Result;
use crate::models::{
    CategoryBreakdownReport, DashboardSummary, DateRange, Insight, MonthlyExpense, UserId,
};

/// Number of transactions shown on the dashboard
pub const RECENT_TRANSACTIONS_LIMIT: i64 = 5;

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl Database {
    /// Per-category totals, averages, and shares for a user over an optional date range
    pub fn category_breakdown(
        &self,
        user_id: &UserId,
        range: DateRange,
    ) -> Result<CategoryBreakdownReport> {
        let filter = TransactionFilter::for_user(user_id.clone()).date_range(range);
        let rows = self.aggregate_by_category(&filter)?;
        Ok(analytics::build_category_breakdown(rows))
    }

    /// Monthly spending over the last `months_back` months, oldest first
    pub fn monthly_expenses(&self, user_id: &UserId, months_back: u32) -> Result<Vec<MonthlyExpense>> {
        self.monthly_expenses_on(user_id, months_back, today())
    }

    pub fn monthly_expenses_on(
        &self,
        user_id: &UserId,
        months_back: u32,
        today: NaiveDate,
    ) -> Result<Vec<MonthlyExpense>> {
        let range = analytics::months_back_range(today, months_back);
        let filter = TransactionFilter::for_user(user_id.clone()).date_range(range);
        let rows = self.aggregate_by_month(&filter)?;
        Ok(analytics::build_monthly_expenses(rows))
    }

    /// Current-month overview for the dashboard
    pub fn dashboard_summary(&self, user_id: &UserId) -> Result<DashboardSummary> {
        self.dashboard_summary_on(user_id, today())
    }

    pub fn dashboard_summary_on(&self, user_id: &UserId, today: NaiveDate) -> Result<DashboardSummary> {
        let (month, year) = (today.month(), today.year());
        let filter = TransactionFilter::for_user(user_id.clone())
            .date_range(analytics::current_month_range(today));

        let rows = self.aggregate_by_category(&filter)?;
        let total_expenses: f64 = rows.iter().map(|r| r.total).sum();
        let transaction_count: i64 = rows.iter().map(|r| r.count).sum();
        let category_totals = analytics::category_totals(&rows);
        let top_category = analytics::top_category(&category_totals);

        let total_budget = self.total_budget(user_id, month, year)?;
        let recent_transactions = self.recent_transactions(user_id, RECENT_TRANSACTIONS_LIMIT)?;

        Ok(DashboardSummary {
            total_expenses,
            transaction_count,
            total_budget,
            top_category,
            recent_transactions,
            category_totals,
            month,
            year,
        })
    }

    /// Budget versus actual for every budget set in the current month
    pub fn budget_insights(&self, user_id: &UserId) -> Result<Vec<Insight>> {
        self.budget_insights_on(user_id, today())
    }

    pub fn budget_insights_on(&self, user_id: &UserId, today: NaiveDate) -> Result<Vec<Insight>> {
        let budgets = self.list_budgets(user_id, today.month(), today.year())?;
        if budgets.is_empty() {
            return Ok(vec![]);
        }

        let breakdown =
            self.category_breakdown(user_id, analytics::current_month_range(today))?;
        Ok(analytics::build_insights(&budgets, &breakdown))
    }
}
