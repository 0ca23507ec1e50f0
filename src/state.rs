use std::env;
use std::sync::Arc;

use crate::db;
use crate::domains::invoices::repository::PgInvoiceStore;
use crate::domains::invoices::InvoiceStore;

/// Authentication settings consumed by the session middleware. Held in state
/// so nothing re-reads the environment per request.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using development secret");
            "facturo_dev_secret_change_me".to_string()
        });
        Self { jwt_secret }
    }
}

/// Shared application state: the injected persistence handle and auth config.
/// The store is a trait object so tests and local development can run against
/// the in-memory implementation.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn InvoiceStore>,
    pub auth: AuthConfig,
}

impl AppState {
    /// Production construction: Postgres pool from `DATABASE_URL`, pending
    /// migrations applied on startup.
    pub async fn new() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|e| anyhow::anyhow!("DATABASE_URL must be set: {}", e))?;
        let pool = db::create_db_pool(&database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("✅ Database migrations applied");

        Ok(Self::with_store(
            Arc::new(PgInvoiceStore::new(pool)),
            AuthConfig::from_env(),
        ))
    }

    pub fn with_store(store: Arc<dyn InvoiceStore>, auth: AuthConfig) -> Self {
        Self { store, auth }
    }
}
