//! Partial account updates.
//!
//! Handlers receive `UpdateServicesRequest` / `UpdateTransactionRequest`
//! bodies; the account service turns them into a list of [`ColumnUpdate`]s
//! plus an [`AccountFilter`], which the repository renders into a single
//! parameterized `UPDATE` statement.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Request body for `PUT /account/update/service`.
///
/// ```json
/// { "account_number": 7, "service_id": "netflix", "update_type": "add" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateServicesRequest {
    pub account_number: i64,
    pub service_id: String,
    /// `add` or `remove`; anything else is rejected by the account service
    pub update_type: String,
}

/// Request body for `PUT /account/update/transaction`.
///
/// ```json
/// { "account_number": 7, "amount": 1000.0, "transaction_type": "debit" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTransactionRequest {
    pub account_number: i64,
    pub amount: f64,
    /// `debit` or `credit`; anything else is rejected by the account service
    pub transaction_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceUpdateType {
    /// Move the service from the inactive set into the active set
    Add,
    /// Move the service from the active set into the inactive set
    Remove,
}

impl FromStr for ServiceUpdateType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(ServiceUpdateType::Add),
            "remove" => Ok(ServiceUpdateType::Remove),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    /// Money spent; added to `spends`
    Debit,
    /// Money received; added to `income`
    Credit,
}

impl FromStr for TransactionType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debit" => Ok(TransactionType::Debit),
            "credit" => Ok(TransactionType::Credit),
            _ => Err(()),
        }
    }
}

/// JSON columns holding service sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceColumn {
    Active,
    Inactive,
}

impl ServiceColumn {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceColumn::Active => "active_services",
            ServiceColumn::Inactive => "inactive_services",
        }
    }
}

/// Numeric columns holding running totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceColumn {
    Income,
    Spends,
}

impl BalanceColumn {
    pub fn as_str(self) -> &'static str {
        match self {
            BalanceColumn::Income => "income",
            BalanceColumn::Spends => "spends",
        }
    }
}

/// One mutation in the `SET` clause of an account update.
///
/// Column names come from the enums above, values are always bound as
/// parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnUpdate {
    /// Add `service_id` as a key of the JSON set
    InsertService {
        column: ServiceColumn,
        service_id: String,
    },
    /// Drop `service_id` from the JSON set; absent keys are a no-op
    RemoveService {
        column: ServiceColumn,
        service_id: String,
    },
    /// `column = column + amount`
    Increment { column: BalanceColumn, amount: f64 },
}

impl ColumnUpdate {
    /// Mutations that move `service_id` into the set selected by `update_type`.
    pub fn move_service(update_type: ServiceUpdateType, service_id: &str) -> Vec<ColumnUpdate> {
        let (into, out_of) = match update_type {
            ServiceUpdateType::Add => (ServiceColumn::Active, ServiceColumn::Inactive),
            ServiceUpdateType::Remove => (ServiceColumn::Inactive, ServiceColumn::Active),
        };

        vec![
            ColumnUpdate::InsertService {
                column: into,
                service_id: service_id.to_string(),
            },
            ColumnUpdate::RemoveService {
                column: out_of,
                service_id: service_id.to_string(),
            },
        ]
    }

    /// Mutation applying a transaction amount to the matching total.
    pub fn apply_transaction(transaction_type: TransactionType, amount: f64) -> ColumnUpdate {
        let column = match transaction_type {
            TransactionType::Debit => BalanceColumn::Spends,
            TransactionType::Credit => BalanceColumn::Income,
        };
        ColumnUpdate::Increment { column, amount }
    }
}

/// `WHERE` clause of an account update.
///
/// Updates are always scoped to one account number; service updates are
/// additionally scoped to the owning user.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountFilter {
    pub user_id: Option<String>,
    pub account_number: i64,
}

impl AccountFilter {
    pub fn by_account_number(account_number: i64) -> Self {
        Self {
            user_id: None,
            account_number,
        }
    }

    pub fn by_owner(user_id: &str, account_number: i64) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            account_number,
        }
    }

    pub fn matches(&self, user_id: &str, account_number: i64) -> bool {
        self.account_number == account_number
            && self.user_id.as_deref().is_none_or(|id| id == user_id)
    }
}
