//! Budget handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, Request, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;

use super::read_json;
use crate::{ApiResponse, AppError, AppState};
use tally_core::models::Budget;
use tally_core::validation::{self, BudgetAmountInput, BudgetInput, BudgetListParams};

/// GET /api/budgets - Budgets for one month (defaults to the current month)
pub async fn list_budgets(
    State(state): State<Arc<AppState>>,
    query: Result<Query<BudgetListParams>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Budget>>>, AppError> {
    let Query(params) = query?;
    let period = params.validate(&state.config.default_user, Utc::now().date_naive())?;

    let budgets = state
        .run_db(move |db| db.list_budgets(&period.user_id, period.month, period.year))
        .await?;

    Ok(Json(ApiResponse::ok(budgets)))
}

/// POST /api/budgets - Create or replace the budget for a category and month
pub async fn save_budget(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<ApiResponse<Budget>>), AppError> {
    let input: BudgetInput = read_json(request).await?;
    let upsert = input.validate(&state.config.default_user, Utc::now().date_naive())?;

    let budget = state.run_db(move |db| db.upsert_budget(&upsert)).await?;

    info!(
        id = budget.id,
        user = %budget.user_id,
        category = %budget.category,
        "Budget saved"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(budget).with_message("Budget saved successfully")),
    ))
}

/// PUT /api/budgets/:id - Change a budget's amount
pub async fn update_budget(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> Result<Json<ApiResponse<Budget>>, AppError> {
    let id = validation::parse_id(&id)?;
    let input: BudgetAmountInput = read_json(request).await?;
    let amount = input.validate()?;

    let budget = state
        .run_db(move |db| db.update_budget_amount(id, amount))
        .await?;

    Ok(Json(
        ApiResponse::ok(budget).with_message("Budget updated successfully"),
    ))
}

/// DELETE /api/budgets/:id - Permanently delete a budget
pub async fn delete_budget(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let id = validation::parse_id(&id)?;
    state.run_db(move |db| db.delete_budget(id)).await?;

    info!(id, "Budget deleted");

    Ok(Json(ApiResponse::message("Budget deleted successfully")))
}
