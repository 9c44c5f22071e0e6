//! Service layer of the GeoIQ brand-visibility dashboard.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod storage;
pub mod validation;

pub use api::{ApiClient, RequestConfig, ResponseBody};
pub use cache::{CacheService, CacheStats};
pub use crate::config::AppConfig;
pub use error::{ApiError, ServiceResponse, ServiceResult};
pub use logging::{LogLevel, Logger, LoggerRegistry};
pub use services::{
    CompanyBrandsService, DashboardService, PromptsService, SampleDataOptions,
    VisibilityScanningService,
};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use validation::{FormValidation, ValidationResult};

use std::sync::Arc;

use crate::config::{DataSource, StorageBackend};
use services::{
    CompanyBrandsRepository, DashboardSource, HttpCompanyBrandsRepository, HttpDashboardSource,
    LocalCompanyBrandsRepository, MockDashboardSource,
};

/// Every service wired against one configuration.
///
/// The cache, store and logger registry are shared by all services.
#[derive(Clone)]
pub struct AppServices {
    pub registry: LoggerRegistry,
    pub cache: CacheService,
    pub store: Arc<dyn KeyValueStore>,
    pub api: ApiClient,
    pub company_brands: CompanyBrandsService,
    pub dashboard: DashboardService,
    pub prompts: Arc<PromptsService>,
    pub visibility: Arc<VisibilityScanningService>,
}

impl AppServices {
    pub fn from_config(config: &AppConfig) -> ServiceResult<Self> {
        let registry = LoggerRegistry::new(config.logging.level);
        let store: Arc<dyn KeyValueStore> = match config.storage.backend {
            StorageBackend::Memory => Arc::new(match config.storage.quota_bytes {
                Some(quota) => MemoryStore::with_quota(quota),
                None => MemoryStore::new(),
            }),
            StorageBackend::File => Arc::new(
                FileStore::new(&config.storage.data_dir)?.with_logger(registry.logger("file-store")),
            ),
        };

        Self::with_store(config, store, registry)
    }

    /// Builds the services over an existing store, e.g. a shared test store.
    pub fn with_store(
        config: &AppConfig,
        store: Arc<dyn KeyValueStore>,
        registry: LoggerRegistry,
    ) -> ServiceResult<Self> {
        let cache = CacheService::new(&config.cache).with_logger(registry.logger("cache"));
        let api = ApiClient::new(&config.api, registry.logger("api-client"))?;

        let repository: Arc<dyn CompanyBrandsRepository> = match config.services.company_source {
            DataSource::Http => Arc::new(HttpCompanyBrandsRepository::new(api.clone())),
            DataSource::Local => Arc::new(LocalCompanyBrandsRepository::new(
                store.clone(),
                registry.logger("company-brands-store"),
            )),
        };
        let source: Arc<dyn DashboardSource> = if config.services.mock_dashboard {
            Arc::new(MockDashboardSource::new())
        } else {
            Arc::new(HttpDashboardSource::new(api.clone()))
        };

        let company_brands = CompanyBrandsService::new(
            repository,
            cache.clone(),
            &config.cache,
            registry.logger("company-brands"),
        );
        let dashboard = DashboardService::new(
            source,
            cache.clone(),
            &config.cache,
            registry.logger("dashboard"),
        );
        let prompts = Arc::new(PromptsService::new(
            store.clone(),
            cache.clone(),
            &config.cache,
            registry.logger("prompts"),
        ));
        let visibility = Arc::new(VisibilityScanningService::new(
            store.clone(),
            cache.clone(),
            &config.cache,
            &config.services,
            registry.logger("visibility-scanning"),
        ));

        Ok(Self {
            registry,
            cache,
            store,
            api,
            company_brands,
            dashboard,
            prompts,
            visibility,
        })
    }
}
