use async_trait::async_trait;

use crate::error::ServiceResult;
use crate::models::{Brand, BrandForm, BrandUpdate, Company, CompanyForm, CompanyUpdate};

/// Persistence port behind [`CompanyBrandsService`](super::CompanyBrandsService).
///
/// Implementations receive input that has already been validated.
#[async_trait]
pub trait CompanyBrandsRepository: Send + Sync {
    async fn fetch_company(&self) -> ServiceResult<Option<Company>>;

    /// Creates the company, or replaces every field of the existing one.
    async fn save_company(&self, form: CompanyForm) -> ServiceResult<Company>;

    async fn update_company(&self, update: CompanyUpdate) -> ServiceResult<Company>;

    async fn delete_company(&self) -> ServiceResult<()>;

    async fn fetch_brands(&self) -> ServiceResult<Vec<Brand>>;

    async fn fetch_brand(&self, id: &str) -> ServiceResult<Option<Brand>>;

    async fn create_brand(&self, form: BrandForm) -> ServiceResult<Brand>;

    async fn update_brand(&self, id: &str, update: BrandUpdate) -> ServiceResult<Brand>;

    async fn delete_brand(&self, id: &str) -> ServiceResult<()>;

    /// Writes complete records as-is. `None` leaves that part untouched.
    async fn seed(&self, company: Option<&Company>, brands: Option<&[Brand]>) -> ServiceResult<()>;

    /// Removes the company and every brand. Succeeds when already empty.
    async fn clear(&self) -> ServiceResult<()>;
}
