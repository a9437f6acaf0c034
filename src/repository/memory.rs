//! In-memory account stores used by unit tests.

use std::{
    fmt,
    sync::atomic::{AtomicI64, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::{DashMap, mapref::entry::Entry};
use sqlx::{
    error::{DatabaseError, ErrorKind},
    types::Json,
};

use super::AccountStore;
use crate::models::{
    account::{Account, ServiceSet},
    update::{AccountFilter, BalanceColumn, ColumnUpdate, ServiceColumn},
};

/// Account store keyed by user id, mirroring the semantics of the SQL store.
#[derive(Debug)]
pub struct InMemoryAccountStore {
    /// Accounts by user id
    pub accounts: DashMap<String, Account>,
    next_account_number: AtomicI64,
    /// Number of storage calls made, used to assert that validation happens first
    pub calls: AtomicUsize,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            next_account_number: AtomicI64::new(1),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn account(&self, user_id: &str) -> Option<Account> {
        self.accounts.get(user_id).map(|a| a.clone())
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn service_set(account: &mut Account, column: ServiceColumn) -> &mut ServiceSet {
    match column {
        ServiceColumn::Active => &mut account.active_services.0,
        ServiceColumn::Inactive => &mut account.inactive_services.0,
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn ping(&self) -> Result<(), sqlx::Error> {
        Ok(())
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Account>, sqlx::Error> {
        self.record_call();
        Ok(self.account(user_id))
    }

    async fn insert(&self, user_id: &str) -> Result<Account, sqlx::Error> {
        self.record_call();
        match self.accounts.entry(user_id.to_string()) {
            Entry::Occupied(_) => Err(UniqueViolation::error()),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let account = Account {
                    user_id: user_id.to_string(),
                    account_number: self.next_account_number.fetch_add(1, Ordering::SeqCst),
                    income: 0.0,
                    spends: 0.0,
                    active_services: Json(ServiceSet::new()),
                    inactive_services: Json(ServiceSet::new()),
                    created_at: now,
                    updated_at: now,
                };
                slot.insert(account.clone());
                Ok(account)
            }
        }
    }

    async fn update(
        &self,
        changes: &[ColumnUpdate],
        filter: &AccountFilter,
    ) -> Result<u64, sqlx::Error> {
        self.record_call();
        let mut updated = 0;

        for mut entry in self.accounts.iter_mut() {
            let account = entry.value_mut();
            if !filter.matches(&account.user_id, account.account_number) {
                continue;
            }

            for change in changes {
                match change {
                    ColumnUpdate::InsertService { column, service_id } => {
                        service_set(account, *column)
                            .insert(service_id.clone(), serde_json::json!({}));
                    }
                    ColumnUpdate::RemoveService { column, service_id } => {
                        service_set(account, *column).remove(service_id);
                    }
                    ColumnUpdate::Increment { column, amount } => match column {
                        BalanceColumn::Income => account.income += amount,
                        BalanceColumn::Spends => account.spends += amount,
                    },
                }
            }
            account.updated_at = Utc::now();
            updated += 1;
        }

        Ok(updated)
    }
}

/// Database error reported for a duplicate `user_id`, as Postgres does.
#[derive(Debug)]
pub struct UniqueViolation;

impl UniqueViolation {
    pub fn error() -> sqlx::Error {
        sqlx::Error::Database(Box::new(UniqueViolation))
    }
}

impl fmt::Display for UniqueViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for UniqueViolation {}

impl DatabaseError for UniqueViolation {
    fn message(&self) -> &str {
        "duplicate key value violates unique constraint \"accounts_user_id_key\""
    }

    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::UniqueViolation
    }
}

/// Store that loses the race between the duplicate check and the insert:
/// lookups never see an account, inserts still hit the unique constraint.
#[derive(Debug)]
pub struct RacingAccountStore {
    pub inner: InMemoryAccountStore,
}

#[async_trait]
impl AccountStore for RacingAccountStore {
    async fn ping(&self) -> Result<(), sqlx::Error> {
        self.inner.ping().await
    }

    async fn find_by_user_id(&self, _user_id: &str) -> Result<Option<Account>, sqlx::Error> {
        Ok(None)
    }

    async fn insert(&self, user_id: &str) -> Result<Account, sqlx::Error> {
        self.inner.insert(user_id).await
    }

    async fn update(
        &self,
        changes: &[ColumnUpdate],
        filter: &AccountFilter,
    ) -> Result<u64, sqlx::Error> {
        self.inner.update(changes, filter).await
    }
}

/// Store whose every operation fails, for exercising storage error paths.
#[derive(Debug, Default)]
pub struct FailingAccountStore;

#[async_trait]
impl AccountStore for FailingAccountStore {
    async fn ping(&self) -> Result<(), sqlx::Error> {
        Err(sqlx::Error::PoolTimedOut)
    }

    async fn find_by_user_id(&self, _user_id: &str) -> Result<Option<Account>, sqlx::Error> {
        Err(sqlx::Error::PoolTimedOut)
    }

    async fn insert(&self, _user_id: &str) -> Result<Account, sqlx::Error> {
        Err(sqlx::Error::PoolTimedOut)
    }

    async fn update(
        &self,
        _changes: &[ColumnUpdate],
        _filter: &AccountFilter,
    ) -> Result<u64, sqlx::Error> {
        Err(sqlx::Error::PoolTimedOut)
    }
}
