use std::sync::Arc;

use crate::auth::TokenRegistry;
use crate::catalog::{CatalogCache, CourseCatalog, SocClient};
use crate::config::AppConfig;
use crate::db::ScheduleStore;
use crate::engine::EngineConfig;

/// State shared by every request handler.
pub struct AppState {
    /// Where course and section data comes from
    pub catalog: Arc<dyn CourseCatalog>,
    /// The cache behind `catalog`, exposed for the cache endpoints
    pub catalog_cache: Arc<CatalogCache>,
    /// Saved schedules
    pub store: ScheduleStore,
    /// Settings passed to every schedule generation
    pub engine: EngineConfig,
    /// Users allowed to save schedules
    pub tokens: TokenRegistry,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn CourseCatalog>,
        catalog_cache: Arc<CatalogCache>,
        store: ScheduleStore,
        engine: EngineConfig,
        tokens: TokenRegistry,
    ) -> Self {
        Self {
            catalog,
            catalog_cache,
            store,
            engine,
            tokens,
        }
    }

    /// Builds the production state: the live catalog client and the sqlite
    /// store at the configured path.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let cache = Arc::new(CatalogCache::new(config.catalog.cache_ttl()));
        let client = SocClient::new(config.catalog.clone(), Arc::clone(&cache))?;
        let store = ScheduleStore::open(&config.database_path)?;

        Ok(Self::new(
            Arc::new(client),
            cache,
            store,
            config.engine,
            TokenRegistry::new(&config.users),
        ))
    }
}
