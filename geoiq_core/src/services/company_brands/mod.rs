//! Company profile and brand catalog management

pub mod http;
pub mod local;
pub mod repository;
pub mod sample;
pub mod service;

pub use http::HttpCompanyBrandsRepository;
pub use local::LocalCompanyBrandsRepository;
pub use repository::CompanyBrandsRepository;
pub use sample::{sample_brands, sample_company, SampleDataOptions};
pub use service::{CompanyBrandsService, BRANDS_CACHE_KEY, COMPANY_CACHE_KEY};
