//! Database connection pool and migration management.
//!
//! The service owns a single `accounts` table; its schema lives in
//! `migrations/` and is applied at startup before the router is built.

use sqlx::{Pool, Postgres};

/// Type alias for PostgreSQL connection pool.
pub type DbPool = Pool<Postgres>;

/// Create a new PostgreSQL connection pool.
///
/// The pool is shared by every request through [`crate::repository::PgAccountStore`];
/// sqlx hands out connections concurrently, so no extra locking is needed.
///
/// # Errors
///
/// Returns an error if the connection string is invalid or the server cannot be reached.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
}

/// Run the migrations embedded from `./migrations`.
///
/// Applied migrations are tracked in `_sqlx_migrations`, so restarting the
/// service against an existing database is a no-op.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
