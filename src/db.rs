//! PostgreSQL pool and schema setup for the `api_keys` table.
//!
//! Only used when `DATABASE_URL` is configured; otherwise the service runs
//! on the in-memory store and never touches this module.

use sqlx::{Pool, Postgres};

pub type DbPool = Pool<Postgres>;

/// Connect to PostgreSQL.
///
/// Each credential operation holds a connection for a single short query, so
/// the pool size mostly bounds how many validations can hit the database at
/// once. It comes from `DATABASE_MAX_CONNECTIONS` so deployments sharing a
/// small hosted database can keep it low.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Create or upgrade the `api_keys` table from `migrations/`.
///
/// Applied migrations are recorded in `_sqlx_migrations`, so startup is
/// idempotent.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
