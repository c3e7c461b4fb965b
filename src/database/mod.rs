pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

use std::sync::Arc;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{StoreTx, WorkspaceStore};

use crate::config::DatabaseConfig;

/// Open the store selected by configuration: Postgres when a URL is set
/// (schema is migrated on open), otherwise the in-memory store.
pub async fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn WorkspaceStore>, DatabaseError> {
    match config.url {
        Some(_) => {
            let pool = DatabaseManager::connect(config).await?;
            DatabaseManager::migrate(&pool).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store (data is lost on exit)");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
