//! Tally Web Server
//!
//! Axum-based REST API for the Tally expense tracker.
//!
//! Every response, success or failure, uses the same JSON envelope:
//! `{success, data?, error?, message?, field?, pagination?, total?}`.
//! Store calls run on the blocking pool so SQLite never stalls the runtime.

use std::sync::Arc;

use axum::{
    extract::rejection::QueryRejection,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use tally_core::validation::DEFAULT_MAX_PAGE_LIMIT;
use tally_core::{Database, Error as CoreError, UserId};

mod handlers;

/// Maximum accepted JSON body size (64 KB)
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// Substituted when a request omits `userId`
    pub default_user: UserId,
    /// Upper bound for the `limit` query parameter
    pub max_page_limit: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![],
            default_user: UserId::default(),
            max_page_limit: DEFAULT_MAX_PAGE_LIMIT,
        }
    }
}

impl ServerConfig {
    /// Read configuration from the environment
    ///
    /// - `TALLY_DEFAULT_USER`: fallback user id
    /// - `TALLY_ALLOWED_ORIGINS`: comma-separated CORS origins
    /// - `TALLY_MAX_PAGE_LIMIT`: largest page size a client may request
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(user) = std::env::var("TALLY_DEFAULT_USER")
            .ok()
            .and_then(|s| UserId::new(&s))
        {
            config.default_user = user;
        }

        config.allowed_origins =
            parse_origins(&std::env::var("TALLY_ALLOWED_ORIGINS").unwrap_or_default());

        if let Ok(raw) = std::env::var("TALLY_MAX_PAGE_LIMIT") {
            match raw.trim().parse::<i64>() {
                Ok(limit) if limit > 0 => config.max_page_limit = limit,
                _ => warn!(value = %raw, "Ignoring invalid TALLY_MAX_PAGE_LIMIT"),
            }
        }

        config
    }
}

/// Split a comma-separated origin list, dropping blanks
pub fn parse_origins(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
}

impl AppState {
    /// Run a store call on the blocking pool
    pub async fn run_db<F, T>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&Database) -> tally_core::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| CoreError::Task(e.to_string()))?
            .map_err(AppError::from)
    }
}

// ============================================================================
// Response Envelope
// ============================================================================

/// Page metadata for list responses
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }
}

/// Uniform response body
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
            field: None,
            pagination: None,
            total: None,
        }
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn with_total(mut self, total: f64) -> Self {
        self.total = Some(total);
        self
    }
}

impl ApiResponse<()> {
    /// Success with only a message (deletes, health)
    pub fn message(message: &str) -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            message: Some(message.to_string()),
            field: None,
            pagination: None,
            total: None,
        }
    }

    fn failure(error: String, field: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            message: None,
            field,
            pagination: None,
            total: None,
        }
    }
}

// ============================================================================
// Router
// ============================================================================

/// Create the application router
pub fn create_router(db: Database, static_dir: Option<&str>, config: ServerConfig) -> Router {
    let state = Arc::new(AppState {
        db,
        config: config.clone(),
    });

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        // Transactions
        .route(
            "/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route(
            "/transactions/:id",
            get(handlers::get_transaction)
                .put(handlers::update_transaction)
                .delete(handlers::delete_transaction),
        )
        // Budgets
        .route(
            "/budgets",
            get(handlers::list_budgets).post(handlers::save_budget),
        )
        .route(
            "/budgets/:id",
            axum::routing::put(handlers::update_budget).delete(handlers::delete_budget),
        )
        // Analytics
        .route("/analytics/dashboard", get(handlers::get_dashboard))
        .route(
            "/analytics/monthly-expenses",
            get(handlers::get_monthly_expenses),
        )
        .route(
            "/analytics/category-breakdown",
            get(handlers::get_category_breakdown),
        )
        .route("/analytics/insights", get(handlers::get_insights))
        .fallback(handlers::api_not_found);

    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    };

    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; connect-src 'self'; frame-ancestors 'none'",
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve the UI bundle if a directory was given
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    info!(
        default_user = %config.default_user,
        max_page_limit = config.max_page_limit,
        origins = config.allowed_origins.len(),
        "Server configuration loaded"
    );

    let app = create_router(db, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    field: Option<String>,
    internal: Option<CoreError>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            field: None,
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            field: None,
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(ApiResponse::failure(self.message, self.field));
        (self.status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { field, message } => Self {
                status: StatusCode::BAD_REQUEST,
                message,
                field,
                internal: None,
            },
            CoreError::InvalidIdentifier(_) => Self::bad_request("Invalid ID"),
            CoreError::NotFound(what) => Self::not_found(&format!("{} not found", what)),
            other => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                // Return generic message to client
                message: "An internal error occurred".to_string(),
                field: None,
                // Keep full error for logging
                internal: Some(other),
            },
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(&rejection.body_text())
    }
}

#[cfg(test)]
mod tests;
