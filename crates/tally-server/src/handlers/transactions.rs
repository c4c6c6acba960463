//! Transaction handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, Request, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use super::read_json;
use crate::{ApiResponse, AppError, AppState, Pagination};
use tally_core::models::Transaction;
use tally_core::validation::{
    self, NewTransactionInput, TransactionListParams, TransactionUpdateInput,
};

/// GET /api/transactions - List transactions, newest first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TransactionListParams>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Transaction>>>, AppError> {
    let Query(params) = query?;
    let query = params.validate(&state.config.default_user, state.config.max_page_limit)?;

    let (filter, limit, offset) = (query.filter.clone(), query.limit, query.offset());
    let (transactions, total) = state
        .run_db(move |db| db.query_transactions(&filter, limit, offset))
        .await?;

    Ok(Json(
        ApiResponse::ok(transactions).with_pagination(Pagination::new(query.page, limit, total)),
    ))
}

/// POST /api/transactions - Record a transaction
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<ApiResponse<Transaction>>), AppError> {
    let input: NewTransactionInput = read_json(request).await?;
    let new_tx = input.validate(&state.config.default_user)?;

    let transaction = state
        .run_db(move |db| db.insert_transaction(&new_tx))
        .await?;

    info!(id = transaction.id, user = %transaction.user_id, "Transaction created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(transaction).with_message("Transaction created successfully")),
    ))
}

/// GET /api/transactions/:id - Get a single transaction
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Transaction>>, AppError> {
    let id = validation::parse_id(&id)?;
    let transaction = state.run_db(move |db| db.get_transaction(id)).await?;
    Ok(Json(ApiResponse::ok(transaction)))
}

/// PUT /api/transactions/:id - Edit any subset of amount, date, description, category
pub async fn update_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> Result<Json<ApiResponse<Transaction>>, AppError> {
    let id = validation::parse_id(&id)?;
    let input: TransactionUpdateInput = read_json(request).await?;
    let update = input.validate()?;

    let transaction = state
        .run_db(move |db| db.update_transaction(id, &update))
        .await?;

    Ok(Json(
        ApiResponse::ok(transaction).with_message("Transaction updated successfully"),
    ))
}

/// DELETE /api/transactions/:id - Permanently delete a transaction
pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let id = validation::parse_id(&id)?;
    state.run_db(move |db| db.delete_transaction(id)).await?;

    info!(id, "Transaction deleted");

    Ok(Json(ApiResponse::message("Transaction deleted successfully")))
}
