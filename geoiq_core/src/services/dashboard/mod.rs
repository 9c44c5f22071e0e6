//! Overview metrics, trends, competitors and recent activity

pub mod http;
pub mod mock;
pub mod service;
pub mod source;

pub use http::HttpDashboardSource;
pub use mock::MockDashboardSource;
pub use service::{DashboardService, DASHBOARD_CACHE_PREFIX};
pub use source::DashboardSource;
