use async_trait::async_trait;

use crate::error::ServiceResult;
use crate::models::{ActivityItem, CompetitorSnapshot, DashboardData, DashboardMetrics, TrendPoint};

/// Where dashboard figures come from.
#[async_trait]
pub trait DashboardSource: Send + Sync {
    async fn fetch_dashboard(&self) -> ServiceResult<DashboardData>;

    async fn fetch_metrics(&self) -> ServiceResult<DashboardMetrics>;

    /// One point per day, oldest first, ending today.
    async fn fetch_trends(&self, days: u32) -> ServiceResult<Vec<TrendPoint>>;

    async fn fetch_competitors(&self) -> ServiceResult<Vec<CompetitorSnapshot>>;

    /// Newest first.
    async fn fetch_recent_activity(&self, limit: usize) -> ServiceResult<Vec<ActivityItem>>;
}
