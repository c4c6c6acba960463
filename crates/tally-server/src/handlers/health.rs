//! Liveness and unknown-route handlers

use axum::Json;

use crate::{ApiResponse, AppError};

/// GET /api/health
pub async fn health() -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("ok"))
}

/// Any unmatched /api path
pub async fn api_not_found() -> AppError {
    AppError::not_found("Route not found")
}
