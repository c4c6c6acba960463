//! Analytics handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{ApiResponse, AppError, AppState};
use tally_core::models::{CategoryBreakdown, DashboardSummary, Insight, MonthlyExpense};
use tally_core::validation;

/// Query parameters shared by the analytics endpoints
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    pub user_id: Option<String>,
    /// Months of history for the trend report
    pub months: Option<String>,
    /// Custom start date (YYYY-MM-DD)
    pub start_date: Option<String>,
    /// Custom end date (YYYY-MM-DD)
    pub end_date: Option<String>,
}

/// GET /api/analytics/dashboard - Current-month overview
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AnalyticsQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<DashboardSummary>>, AppError> {
    let Query(params) = query?;
    let user_id = validation::parse_user_id(params.user_id.as_deref(), &state.config.default_user);

    let summary = state
        .run_db(move |db| db.dashboard_summary(&user_id))
        .await?;

    Ok(Json(ApiResponse::ok(summary)))
}

/// GET /api/analytics/monthly-expenses - Spending per month, oldest first
pub async fn get_monthly_expenses(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AnalyticsQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<MonthlyExpense>>>, AppError> {
    let Query(params) = query?;
    let user_id = validation::parse_user_id(params.user_id.as_deref(), &state.config.default_user);
    let months = validation::parse_months_back(params.months.as_deref())?;

    let expenses = state
        .run_db(move |db| db.monthly_expenses(&user_id, months))
        .await?;

    Ok(Json(ApiResponse::ok(expenses)))
}

/// GET /api/analytics/category-breakdown - Per-category totals and shares
pub async fn get_category_breakdown(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AnalyticsQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<CategoryBreakdown>>>, AppError> {
    let Query(params) = query?;
    let user_id = validation::parse_user_id(params.user_id.as_deref(), &state.config.default_user);
    let range =
        validation::parse_date_range(params.start_date.as_deref(), params.end_date.as_deref())?;

    let report = state
        .run_db(move |db| db.category_breakdown(&user_id, range))
        .await?;

    Ok(Json(
        ApiResponse::ok(report.categories).with_total(report.total),
    ))
}

/// GET /api/analytics/insights - Budget versus actual for the current month
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AnalyticsQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Insight>>>, AppError> {
    let Query(params) = query?;
    let user_id = validation::parse_user_id(params.user_id.as_deref(), &state.config.default_user);

    let insights = state
        .run_db(move |db| db.budget_insights(&user_id))
        .await?;

    Ok(Json(ApiResponse::ok(insights)))
}
