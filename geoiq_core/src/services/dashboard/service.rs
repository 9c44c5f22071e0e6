use std::sync::Arc;
use std::time::Duration;

use super::source::DashboardSource;
use crate::cache::CacheService;
use crate::config::CacheConfig;
use crate::error::{codes, ApiError, ServiceResult};
use crate::logging::Logger;
use crate::models::{ActivityItem, CompetitorSnapshot, DashboardData, DashboardMetrics, TrendPoint};

pub const DASHBOARD_CACHE_PREFIX: &str = "dashboard:";

const MAX_TREND_DAYS: u32 = 365;
const MAX_ACTIVITY_ITEMS: usize = 100;

/// Cached read access to dashboard figures.
#[derive(Clone)]
pub struct DashboardService {
    source: Arc<dyn DashboardSource>,
    cache: CacheService,
    logger: Logger,
    ttl: Duration,
}

impl DashboardService {
    pub fn new(
        source: Arc<dyn DashboardSource>,
        cache: CacheService,
        config: &CacheConfig,
        logger: Logger,
    ) -> Self {
        Self {
            source,
            cache,
            logger,
            ttl: config.dashboard_ttl(),
        }
    }

    pub async fn get_dashboard_data(&self) -> ServiceResult<DashboardData> {
        self.cached("dashboard:data", || self.source.fetch_dashboard())
            .await
    }

    pub async fn get_metrics(&self) -> ServiceResult<DashboardMetrics> {
        self.cached("dashboard:metrics", || self.source.fetch_metrics())
            .await
    }

    /// Daily trend points for the last `days` days (1 to 365).
    pub async fn get_trends(&self, days: u32) -> ServiceResult<Vec<TrendPoint>> {
        if !(1..=MAX_TREND_DAYS).contains(&days) {
            return Err(range_error("days", days as usize, MAX_TREND_DAYS as usize));
        }

        let key = format!("dashboard:trends:{}", days);
        self.cached(&key, || self.source.fetch_trends(days)).await
    }

    pub async fn get_competitors(&self) -> ServiceResult<Vec<CompetitorSnapshot>> {
        self.cached("dashboard:competitors", || self.source.fetch_competitors())
            .await
    }

    pub async fn get_recent_activity(&self, limit: usize) -> ServiceResult<Vec<ActivityItem>> {
        if !(1..=MAX_ACTIVITY_ITEMS).contains(&limit) {
            return Err(range_error("limit", limit, MAX_ACTIVITY_ITEMS));
        }

        let key = format!("dashboard:activity:{}", limit);
        self.cached(&key, || self.source.fetch_recent_activity(limit))
            .await
    }

    /// Drops every cached dashboard entry and reloads the full dashboard.
    pub async fn refresh(&self) -> ServiceResult<DashboardData> {
        let removed = self.cache.invalidate_prefix(DASHBOARD_CACHE_PREFIX);
        self.logger.debug_with("Dashboard cache invalidated", &removed);
        self.get_dashboard_data().await
    }

    async fn cached<T, F, Fut>(&self, key: &str, load: F) -> ServiceResult<T>
    where
        T: serde::Serialize + serde::de::DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = ServiceResult<T>>,
    {
        self.cache
            .get_or_load(key, self.ttl, load)
            .await
            .inspect_err(|e| self.logger.error_with(&format!("Failed to load {}", key), e))
    }
}

fn range_error(field: &str, value: usize, max: usize) -> ApiError {
    ApiError::new(
        codes::VALIDATION_ERROR,
        format!("{} must be between 1 and {}", field, max),
    )
    .with_detail(field, vec![format!("must be between 1 and {}, got {}", max, value)])
}
