pub mod models;
pub mod repositories;
pub mod schema;

use std::time::Duration;

use eyre::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

pub type DbPool = Pool<Postgres>;

/// Connects a small fixed-size pool.
///
/// The acquire timeout bounds every persistence call made through the
/// pool, so a stuck connection fails the current maintenance cycle
/// instead of hanging it; the next scheduled cycle retries from scratch.
pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await?;

    Ok(pool)
}
