//! Remote data-store collaborator for the collection client.
//!
//! [`DataStore`] is the seam the client services depend on. Two
//! implementations share the same semantics:
//!
//! - [`PgStore`] — PostgreSQL via sqlx repositories. Claims and purchases
//!   are conditional updates inside a transaction, so they are exactly-once
//!   regardless of what the client does.
//! - [`MemoryStore`] — in-process state behind a single lock, used for guest
//!   sessions, demos and tests.

use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod memory;
pub mod models;
pub mod pg;
pub mod repositories;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use pg::PgStore;
pub use store::{CollectionState, DataStore};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `migrations/`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
