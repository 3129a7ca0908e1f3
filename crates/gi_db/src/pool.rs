//! Postgres pool construction, following the corpus's `PgPool` alias
//! pattern (`casparian_db::pool::DbPool`) but pinned to Postgres only —
//! the GI services have no SQLite/community split.

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::error::Result;
use crate::schema::ensure_schema;

pub type DbPool = sqlx::PgPool;

/// Connect to `database_url`, apply schema migrations, and return a
/// ready-to-use pool. Called once per process at startup (spec §9:
/// "Database handle ... initialized once at process start and passed
/// by reference into handlers").
pub async fn init_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    ensure_schema(&pool).await?;
    info!("database schema verified");
    Ok(pool)
}
