use std::sync::Arc;

use crate::cache::QueryCache;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, CatalogService, LoginThrottle, ReportService, SeaOrmAuthService,
    SeaOrmCatalogService, SeaOrmReportService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub cache: Arc<QueryCache>,

    pub catalog_service: Arc<dyn CatalogService>,

    pub report_service: Arc<dyn ReportService>,

    pub auth_service: Arc<dyn AuthService>,

    pub login_throttle: Arc<LoginThrottle>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::from_config(&config.database).await?;
        Ok(Self::with_store(config, store))
    }

    /// Wires the services around an already connected store.
    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let cache = Arc::new(QueryCache::from_config(&config.cache));

        let catalog_service = Arc::new(SeaOrmCatalogService::new(store.clone(), cache.clone()))
            as Arc<dyn CatalogService + Send + Sync + 'static>;

        let report_service = Arc::new(SeaOrmReportService::new(store.clone(), cache.clone()))
            as Arc<dyn ReportService + Send + Sync + 'static>;

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService + Send + Sync + 'static>;

        let login_throttle = Arc::new(LoginThrottle::new(&config.security.auth_throttle));

        Self {
            config: Arc::new(config),
            store,
            cache,
            catalog_service,
            report_service,
            auth_service,
            login_throttle,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}
