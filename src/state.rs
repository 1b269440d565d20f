use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::database::{MemoryStore, PgStore, ProductRepository, UserRepository};
use crate::pagination::{PaginationFactory, RouteTable};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductRepository>,
    pub users: Arc<dyn UserRepository>,
    pub pagination: PaginationFactory,
    pub urls: Arc<RouteTable>,
    /// Present when backed by Postgres; used by the health probe
    pub pool: Option<PgPool>,
}

impl AppState {
    pub fn postgres(pool: PgPool, config: &AppConfig) -> Self {
        let store = Arc::new(PgStore::new(pool.clone()));
        Self::build(store.clone(), store, Some(pool), config)
    }

    pub fn memory(store: Arc<MemoryStore>, config: &AppConfig) -> Self {
        Self::build(store.clone(), store, None, config)
    }

    fn build(
        products: Arc<dyn ProductRepository>,
        users: Arc<dyn UserRepository>,
        pool: Option<PgPool>,
        config: &AppConfig,
    ) -> Self {
        let urls = Arc::new(crate::routes());
        let pagination = PaginationFactory::new(config.pagination.defaults(), urls.clone())
            .with_debug_logging(config.pagination.debug_logging);

        Self {
            products,
            users,
            pagination,
            urls,
            pool,
        }
    }
}
