use async_trait::async_trait;

use super::source::DashboardSource;
use crate::api::{ApiClient, RequestConfig};
use crate::error::ServiceResult;
use crate::models::{ActivityItem, CompetitorSnapshot, DashboardData, DashboardMetrics, TrendPoint};

#[derive(Debug, Clone)]
pub struct HttpDashboardSource {
    api: ApiClient,
}

impl HttpDashboardSource {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl DashboardSource for HttpDashboardSource {
    async fn fetch_dashboard(&self) -> ServiceResult<DashboardData> {
        self.api.get("/dashboard", None).await
    }

    async fn fetch_metrics(&self) -> ServiceResult<DashboardMetrics> {
        self.api.get("/dashboard/metrics", None).await
    }

    async fn fetch_trends(&self, days: u32) -> ServiceResult<Vec<TrendPoint>> {
        let config = RequestConfig::new().with_query("days", days);
        self.api.get("/dashboard/trends", Some(config)).await
    }

    async fn fetch_competitors(&self) -> ServiceResult<Vec<CompetitorSnapshot>> {
        self.api.get("/dashboard/competitors", None).await
    }

    async fn fetch_recent_activity(&self, limit: usize) -> ServiceResult<Vec<ActivityItem>> {
        let config = RequestConfig::new().with_query("limit", limit);
        self.api.get("/dashboard/activity", Some(config)).await
    }
}
