//! Account datasource.
//!
//! [`AccountStore`] is the seam between the account service and storage.
//! [`PgAccountStore`] is the production implementation; every statement it
//! runs binds user input as parameters, including the dynamic `SET` clauses
//! built from [`ColumnUpdate`]s.

use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};

use crate::{
    db::DbPool,
    models::{
        account::Account,
        update::{AccountFilter, ColumnUpdate},
    },
};

#[cfg(test)]
pub mod memory;

const ACCOUNT_COLUMNS: &str = "user_id, account_number, income, spends, \
     active_services, inactive_services, created_at, updated_at";

/// Storage operations needed by the account service.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), sqlx::Error>;

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Account>, sqlx::Error>;

    /// Insert a fresh account for `user_id` with zero totals and empty service sets.
    ///
    /// Fails with a unique violation if the user already owns an account.
    async fn insert(&self, user_id: &str) -> Result<Account, sqlx::Error>;

    /// Apply `changes` to the accounts matching `filter`, returning the number of rows updated.
    async fn update(
        &self,
        changes: &[ColumnUpdate],
        filter: &AccountFilter,
    ) -> Result<u64, sqlx::Error>;
}

/// True when `err` is a unique-constraint violation (duplicate `user_id`).
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// PostgreSQL-backed account store.
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: DbPool,
}

impl PgAccountStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Account>, sqlx::Error> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn insert(&self, user_id: &str) -> Result<Account, sqlx::Error> {
        sqlx::query_as::<_, Account>(&format!(
            "INSERT INTO accounts (user_id) VALUES ($1) RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn update(
        &self,
        changes: &[ColumnUpdate],
        filter: &AccountFilter,
    ) -> Result<u64, sqlx::Error> {
        let mut builder = update_statement(changes, filter);
        let result = builder.build().execute(&self.pool).await?;

        Ok(result.rows_affected())
    }
}

/// Render an account update into a single statement.
///
/// ```sql
/// UPDATE accounts
/// SET active_services = active_services || jsonb_build_object($1::text, '{}'::jsonb),
///     inactive_services = inactive_services - $2::text,
///     updated_at = NOW()
/// WHERE user_id = $3 AND account_number = $4
/// ```
fn update_statement<'a>(
    changes: &'a [ColumnUpdate],
    filter: &'a AccountFilter,
) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new("UPDATE accounts SET ");

    {
        let mut set = builder.separated(", ");
        for change in changes {
            match change {
                ColumnUpdate::InsertService { column, service_id } => {
                    let column = column.as_str();
                    set.push(format!("{column} = {column} || jsonb_build_object("));
                    set.push_bind_unseparated(service_id.as_str());
                    set.push_unseparated("::text, '{}'::jsonb)");
                }
                ColumnUpdate::RemoveService { column, service_id } => {
                    let column = column.as_str();
                    set.push(format!("{column} = {column} - "));
                    set.push_bind_unseparated(service_id.as_str());
                    set.push_unseparated("::text");
                }
                ColumnUpdate::Increment { column, amount } => {
                    let column = column.as_str();
                    set.push(format!("{column} = {column} + "));
                    set.push_bind_unseparated(*amount);
                }
            }
        }
        set.push("updated_at = NOW()");
    }

    builder.push(" WHERE ");
    if let Some(user_id) = &filter.user_id {
        builder.push("user_id = ");
        builder.push_bind(user_id.as_str());
        builder.push(" AND ");
    }
    builder.push("account_number = ");
    builder.push_bind(filter.account_number);

    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::update::{ServiceUpdateType, TransactionType};

    #[test]
    fn service_update_binds_service_id_and_owner() {
        let changes = ColumnUpdate::move_service(ServiceUpdateType::Add, "gym'; DROP TABLE accounts; --");
        let filter = AccountFilter::by_owner("user-1", 7);

        let builder = update_statement(&changes, &filter);

        assert_eq!(
            builder.sql(),
            "UPDATE accounts SET \
             active_services = active_services || jsonb_build_object($1::text, '{}'::jsonb), \
             inactive_services = inactive_services - $2::text, \
             updated_at = NOW() \
             WHERE user_id = $3 AND account_number = $4"
        );
        assert!(!builder.sql().contains("DROP TABLE"));
    }

    #[test]
    fn transaction_update_is_scoped_by_account_number() {
        let changes = vec![ColumnUpdate::apply_transaction(TransactionType::Debit, 25.0)];
        let filter = AccountFilter::by_account_number(3);

        let builder = update_statement(&changes, &filter);

        assert_eq!(
            builder.sql(),
            "UPDATE accounts SET spends = spends + $1, updated_at = NOW() WHERE account_number = $2"
        );
    }

    #[test]
    fn non_database_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }

    #[test]
    fn duplicate_key_errors_are_unique_violations() {
        assert!(is_unique_violation(&memory::UniqueViolation::error()));
    }
}
