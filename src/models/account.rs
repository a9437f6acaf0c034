//! Account data models and API request/response types.
//!
//! This module defines:
//! - `Account`: Database entity representing an account
//! - `NewAccountRequest`: Request body for creating accounts
//! - `AccountSummary`: Response body returned by the summary endpoint

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

/// Set of service ids attached to an account.
///
/// Stored as a JSON object whose keys are the service ids and whose values
/// are empty objects (`{"netflix": {}, "gym": {}}`), so membership checks and
/// removals are single key operations in the database.
pub type ServiceSet = BTreeMap<String, serde_json::Value>;

/// Represents an account record from the database.
///
/// # Database Table
///
/// Maps to the `accounts` table. Each account:
/// - Belongs to exactly one external user (`user_id` is unique)
/// - Is identified by a database-assigned `account_number`
/// - Tracks running `income` and `spends` totals
/// - Holds each service id in exactly one of `active_services` / `inactive_services`
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Account {
    /// External user id from the identity service
    pub user_id: String,

    /// Unique account number assigned by the database
    pub account_number: i64,

    /// Sum of all credit transactions
    pub income: f64,

    /// Sum of all debit transactions
    pub spends: f64,

    pub active_services: Json<ServiceSet>,

    pub inactive_services: Json<ServiceSet>,

    pub created_at: DateTime<Utc>,

    /// Timestamp of the last service or transaction update
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a new account.
///
/// Delivered by the message bus after a user signs up.
///
/// ```json
/// { "user_id": "5f1c7c1e-..." }
/// ```
#[derive(Debug, Deserialize)]
pub struct NewAccountRequest {
    pub user_id: String,
}

/// Response body for `GET /account`.
///
/// ```json
/// {
///   "account_number": 42,
///   "income": 1200.0,
///   "spends": 310.5,
///   "active_services": { "netflix": {} },
///   "inactive_services": {}
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub account_number: i64,
    pub income: f64,
    pub spends: f64,
    pub active_services: ServiceSet,
    pub inactive_services: ServiceSet,
}

/// Projects the stored account onto the public summary (drops user id and timestamps).
impl From<Account> for AccountSummary {
    fn from(account: Account) -> Self {
        Self {
            account_number: account.account_number,
            income: account.income,
            spends: account.spends,
            active_services: account.active_services.0,
            inactive_services: account.inactive_services.0,
        }
    }
}
