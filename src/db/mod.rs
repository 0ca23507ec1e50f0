use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Creates the main connection pool for the invoicing database.
pub async fn create_db_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    tracing::info!("🔌 Connecting to invoicing database...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await?;

    tracing::info!("✅ Database pool created successfully");

    Ok(pool)
}
