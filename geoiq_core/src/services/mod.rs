//! Domain services composed from the cache, API client and storage

pub mod company_brands;
pub mod dashboard;
pub mod prompts;
pub mod visibility;

pub use company_brands::{
    CompanyBrandsRepository, CompanyBrandsService, HttpCompanyBrandsRepository,
    LocalCompanyBrandsRepository, SampleDataOptions,
};
pub use dashboard::{DashboardService, DashboardSource, HttpDashboardSource, MockDashboardSource};
pub use prompts::PromptsService;
pub use visibility::VisibilityScanningService;
