//! Account management HTTP handlers.
//!
//! This module implements the account-related API endpoints:
//! - POST /new_account - Create an account (message bus)
//! - GET /account - Summary of the caller's account
//! - PUT /account/update/service - Activate or deactivate a service
//! - PUT /account/update/transaction - Apply a debit or credit (message bus)

use axum::{Extension, Json, extract::State, extract::rejection::JsonRejection};

use crate::{
    error::AppError,
    middleware::auth::AuthUser,
    models::{
        account::{AccountSummary, NewAccountRequest},
        update::{UpdateServicesRequest, UpdateTransactionRequest},
    },
    response::ApiResponse,
    services::account_service,
    state::AppState,
};

/// Create a new account.
///
/// # Endpoint
///
/// `POST /new_account`
///
/// # Request Body
///
/// ```json
/// { "user_id": "5f1c7c1e-..." }
/// ```
///
/// # Response
///
/// - **201 Created**: account created, creation event queued
/// - **400**: malformed body or account already exists
/// - **500**: storage failure
pub async fn create_account(
    State(state): State<AppState>,
    payload: Result<Json<NewAccountRequest>, JsonRejection>,
) -> Result<ApiResponse<()>, AppError> {
    let Json(request) = payload?;

    account_service::create_account(
        state.store.as_ref(),
        state.publisher.clone(),
        &request.user_id,
    )
    .await?;

    Ok(ApiResponse::created())
}

/// Summary of the authenticated caller's account.
///
/// # Endpoint
///
/// `GET /account`
///
/// # Response (200)
///
/// ```json
/// {
///   "status": 200,
///   "message": "SUCCESS",
///   "data": {
///     "account_number": 42,
///     "income": 1200.0,
///     "spends": 310.5,
///     "active_services": { "netflix": {} },
///     "inactive_services": {}
///   }
/// }
/// ```
///
/// Returns 400 `account not found` when the caller has no account.
pub async fn account_summary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<ApiResponse<AccountSummary>, AppError> {
    let summary = account_service::account_summary(state.store.as_ref(), &auth.user_id).await?;

    Ok(ApiResponse::ok(summary))
}

/// Activate (`add`) or deactivate (`remove`) a service on the caller's account.
///
/// # Endpoint
///
/// `PUT /account/update/service`
///
/// # Request Body
///
/// ```json
/// { "account_number": 42, "service_id": "netflix", "update_type": "add" }
/// ```
pub async fn update_services(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<UpdateServicesRequest>, JsonRejection>,
) -> Result<ApiResponse<()>, AppError> {
    let Json(request) = payload?;

    account_service::update_services(state.store.as_ref(), &auth.user_id, &request).await?;

    Ok(ApiResponse::accepted())
}

/// Apply a transaction to an account's totals.
///
/// # Endpoint
///
/// `PUT /account/update/transaction`
///
/// # Request Body
///
/// ```json
/// { "account_number": 42, "amount": 99.5, "transaction_type": "debit" }
/// ```
pub async fn update_transaction(
    State(state): State<AppState>,
    payload: Result<Json<UpdateTransactionRequest>, JsonRejection>,
) -> Result<ApiResponse<()>, AppError> {
    let Json(request) = payload?;

    account_service::update_transaction(state.store.as_ref(), &request).await?;

    Ok(ApiResponse::accepted())
}
