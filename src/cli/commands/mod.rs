pub mod admin;
pub mod migrate;
pub mod token;

use std::sync::Arc;

use anyhow::Context;

use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgStore, Store};

/// The PostgreSQL store; admin commands have no use for the in-memory one
pub(crate) async fn connect_store(config: &AppConfig) -> anyhow::Result<Arc<dyn Store>> {
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("DATABASE_URL must point at a reachable PostgreSQL database")?;
    DatabaseManager::migrate(&pool).await?;
    Ok(Arc::new(PgStore::new(pool)))
}
