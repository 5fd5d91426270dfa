pub mod kv;
pub mod models;
pub mod postgres;
pub mod queries;

#[cfg(test)]
mod store_tests;

use notify_core::config::{BackendKind, Settings};
use notify_core::error::{StoreError, StoreResult};
use notify_core::{MemoryStore, NotifyStore};
use std::sync::Arc;
use tracing::info;

pub use kv::RedisStore;
pub use postgres::PgStore;

/// Build the store selected by `NOTIFY_DB_MODEL`.
pub async fn connect(settings: &Settings) -> StoreResult<Arc<dyn NotifyStore>> {
    match settings.db_model {
        BackendKind::Memory => {
            info!("using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        BackendKind::Postgres => {
            let url = settings
                .database_url
                .as_deref()
                .ok_or_else(|| StoreError::backend("DATABASE_URL must be set"))?;
            let store = PgStore::connect(url).await?;
            store.migrate().await?;
            info!("using postgres store");
            Ok(Arc::new(store))
        }
        BackendKind::Redis => {
            let url = settings
                .redis_url
                .as_deref()
                .ok_or_else(|| StoreError::backend("REDIS_URL must be set"))?;
            let store = RedisStore::open(url).await?;
            info!("using redis store");
            Ok(Arc::new(store))
        }
    }
}
