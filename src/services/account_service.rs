//! Account service - business rules for account lifecycle and updates.
//!
//! This service handles:
//! - Duplicate checks on account creation
//! - The fire-and-forget creation notification
//! - Validation of update types before any storage access
//! - Translating updates into column mutations for the repository

use std::sync::Arc;

use serde_json::json;

use crate::{
    error::AppError,
    models::{
        account::{Account, AccountSummary},
        update::{
            AccountFilter, ColumnUpdate, ServiceUpdateType, TransactionType,
            UpdateServicesRequest, UpdateTransactionRequest,
        },
    },
    repository::{AccountStore, is_unique_violation},
    services::publisher::MessagePublisher,
};

const ERR_CREATING_ACCOUNT: &str = "error creating account";
const ERR_FETCHING_ACCOUNT: &str = "error fetching account";
const ERR_UPDATING_SERVICES: &str = "error updating services";
const ERR_UPDATING_TRANSACTION: &str = "error updating transaction";

/// Create the account for an external user.
///
/// # Arguments
///
/// * `store` - Account storage
/// * `publisher` - Broker publisher for the creation event
/// * `user_id` - Identifier issued by the user service
///
/// # Process
///
/// 1. Reject empty user ids
/// 2. Reject users who already own an account
/// 3. Insert the account (a concurrent duplicate trips the unique constraint)
/// 4. Spawn the creation notification without awaiting it
///
/// # Errors
///
/// - `InvalidRequest`: empty user id
/// - `AccountExists`: the user already has an account
/// - `Storage`: lookup or insert failed
pub async fn create_account(
    store: &dyn AccountStore,
    publisher: Arc<dyn MessagePublisher>,
    user_id: &str,
) -> Result<Account, AppError> {
    if user_id.trim().is_empty() {
        return Err(AppError::InvalidRequest("user_id is required".to_string()));
    }

    // Check for an existing account first
    let existing = store
        .find_by_user_id(user_id)
        .await
        .map_err(|e| AppError::storage(ERR_CREATING_ACCOUNT, e))?;
    if existing.is_some() {
        return Err(AppError::AccountExists);
    }

    // Insert; losing a race with another create trips the unique constraint
    let account = store.insert(user_id).await.map_err(|e| {
        if is_unique_violation(&e) {
            AppError::AccountExists
        } else {
            AppError::storage(ERR_CREATING_ACCOUNT, e)
        }
    })?;

    tracing::info!(account_number = account.account_number, "account created");

    // Notify listeners in the background; the response does not wait for the broker.
    let message = json!({ "user_id": user_id }).to_string();
    tokio::spawn(async move {
        if let Err(e) = publisher.publish(message).await {
            tracing::error!(error = %e, "failed to publish account creation");
        }
    });

    Ok(account)
}

/// Summary of the account owned by `user_id`.
///
/// # Errors
///
/// - `AccountNotFound`: the user has no account
/// - `Storage`: lookup failed
pub async fn account_summary(
    store: &dyn AccountStore,
    user_id: &str,
) -> Result<AccountSummary, AppError> {
    let account = store
        .find_by_user_id(user_id)
        .await
        .map_err(|e| AppError::storage(ERR_FETCHING_ACCOUNT, e))?
        .ok_or(AppError::AccountNotFound)?;

    Ok(account.into())
}

/// Activate or deactivate a service on an account owned by `user_id`.
///
/// Both JSON sets are changed by one statement, so a service never ends up
/// in both or neither.
///
/// # Errors
///
/// - `InvalidServiceUpdate`: unknown update type or empty service id (storage untouched)
/// - `AccountNotFound`: no account with that number belongs to the user
/// - `Storage`: update failed
pub async fn update_services(
    store: &dyn AccountStore,
    user_id: &str,
    request: &UpdateServicesRequest,
) -> Result<(), AppError> {
    let update_type: ServiceUpdateType = request.update_type.parse().map_err(|_| {
        tracing::warn!(update_type = %request.update_type, "unsupported service update type");
        AppError::InvalidServiceUpdate
    })?;
    if request.service_id.trim().is_empty() {
        return Err(AppError::InvalidServiceUpdate);
    }

    // Insert into one set and remove from the other, scoped to the caller
    let changes = ColumnUpdate::move_service(update_type, &request.service_id);
    let filter = AccountFilter::by_owner(user_id, request.account_number);

    let updated = store
        .update(&changes, &filter)
        .await
        .map_err(|e| AppError::storage(ERR_UPDATING_SERVICES, e))?;
    if updated == 0 {
        return Err(AppError::AccountNotFound);
    }

    Ok(())
}

/// Apply a debit or credit to an account's running totals.
///
/// # Errors
///
/// - `InvalidTransactionType`: unknown transaction type (storage untouched)
/// - `AccountNotFound`: no account with that number
/// - `Storage`: update failed
pub async fn update_transaction(
    store: &dyn AccountStore,
    request: &UpdateTransactionRequest,
) -> Result<(), AppError> {
    let transaction_type: TransactionType = request.transaction_type.parse().map_err(|_| {
        tracing::warn!(transaction_type = %request.transaction_type, "unsupported transaction type");
        AppError::InvalidTransactionType
    })?;

    let changes = [ColumnUpdate::apply_transaction(transaction_type, request.amount)];
    let filter = AccountFilter::by_account_number(request.account_number);

    let updated = store
        .update(&changes, &filter)
        .await
        .map_err(|e| AppError::storage(ERR_UPDATING_TRANSACTION, e))?;
    if updated == 0 {
        return Err(AppError::AccountNotFound);
    }

    Ok(())
}
