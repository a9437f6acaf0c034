//! Health check endpoint and routing fallbacks.

use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{error::AppError, response::ApiResponse, state::AppState};

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub service: String,

    /// Database connection status
    pub database: String,

    /// Current server timestamp
    pub timestamp: DateTime<Utc>,
}

/// Health check handler.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "status": 200,
///   "message": "SUCCESS",
///   "data": {
///     "service": "account_management_svc",
///     "database": "connected",
///     "timestamp": "2025-12-21T19:00:00Z"
///   }
/// }
/// ```
///
/// If the database is unreachable, returns the standard 500 error envelope.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<ApiResponse<HealthResponse>, AppError> {
    state.store.ping().await?;

    Ok(ApiResponse::ok(HealthResponse {
        service: env!("CARGO_PKG_NAME").to_string(),
        database: "connected".to_string(),
        timestamp: Utc::now(),
    }))
}

pub async fn route_not_found() -> AppError {
    AppError::RouteNotFound
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
