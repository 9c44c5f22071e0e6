use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use super::repository::CompanyBrandsRepository;
use crate::error::{ApiError, ServiceResult};
use crate::logging::Logger;
use crate::models::{Brand, BrandForm, BrandUpdate, Company, CompanyForm, CompanyUpdate};
use crate::storage::{KeyValueStore, KeyValueStoreExt, BRANDS_KEY, COMPANY_KEY};

/// Repository over a [`KeyValueStore`] using the `geoiq_company` and
/// `geoiq_brands` keys.
pub struct LocalCompanyBrandsRepository {
    store: Arc<dyn KeyValueStore>,
    // Serializes read-modify-write cycles on the brand list.
    write_lock: Mutex<()>,
    logger: Logger,
}

impl LocalCompanyBrandsRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, logger: Logger) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
            logger,
        }
    }

    fn read_company(&self) -> ServiceResult<Option<Company>> {
        Ok(self.store.read_json(COMPANY_KEY)?)
    }

    fn read_brands(&self) -> ServiceResult<Vec<Brand>> {
        Ok(self.store.read_json(BRANDS_KEY)?.unwrap_or_default())
    }

    fn write_brands(&self, brands: &[Brand]) -> ServiceResult<()> {
        Ok(self.store.write_json(BRANDS_KEY, brands)?)
    }
}

#[async_trait]
impl CompanyBrandsRepository for LocalCompanyBrandsRepository {
    async fn fetch_company(&self) -> ServiceResult<Option<Company>> {
        self.read_company()
    }

    async fn save_company(&self, form: CompanyForm) -> ServiceResult<Company> {
        let _guard = self.write_lock.lock();
        let now = Utc::now();

        let company = match self.read_company()? {
            Some(mut existing) => {
                existing.replace_with(form, now);
                existing
            }
            None => Company::from_form(form, now),
        };

        self.store.write_json(COMPANY_KEY, &company)?;
        self.logger.info_with("Company saved", &company.id);
        Ok(company)
    }

    async fn update_company(&self, update: CompanyUpdate) -> ServiceResult<Company> {
        let _guard = self.write_lock.lock();

        let mut company = self
            .read_company()?
            .ok_or_else(|| ApiError::not_found("Company", "current"))?;
        company.apply_update(update, Utc::now());

        self.store.write_json(COMPANY_KEY, &company)?;
        Ok(company)
    }

    async fn delete_company(&self) -> ServiceResult<()> {
        let _guard = self.write_lock.lock();

        if self.read_company()?.is_none() {
            return Err(ApiError::not_found("Company", "current"));
        }
        self.store.remove_item(COMPANY_KEY)?;
        self.logger.info("Company deleted");
        Ok(())
    }

    async fn fetch_brands(&self) -> ServiceResult<Vec<Brand>> {
        self.read_brands()
    }

    async fn fetch_brand(&self, id: &str) -> ServiceResult<Option<Brand>> {
        Ok(self.read_brands()?.into_iter().find(|brand| brand.id == id))
    }

    async fn create_brand(&self, form: BrandForm) -> ServiceResult<Brand> {
        let _guard = self.write_lock.lock();

        let mut brands = self.read_brands()?;
        let brand = Brand::from_form(form, Utc::now());
        brands.push(brand.clone());

        self.write_brands(&brands)?;
        self.logger.info_with("Brand created", &brand.id);
        Ok(brand)
    }

    async fn update_brand(&self, id: &str, update: BrandUpdate) -> ServiceResult<Brand> {
        let _guard = self.write_lock.lock();

        let mut brands = self.read_brands()?;
        let brand = brands
            .iter_mut()
            .find(|brand| brand.id == id)
            .ok_or_else(|| ApiError::not_found("Brand", id))?;
        brand.apply_update(update, Utc::now());
        let updated = brand.clone();

        self.write_brands(&brands)?;
        Ok(updated)
    }

    async fn delete_brand(&self, id: &str) -> ServiceResult<()> {
        let _guard = self.write_lock.lock();

        let mut brands = self.read_brands()?;
        let before = brands.len();
        brands.retain(|brand| brand.id != id);
        if brands.len() == before {
            return Err(ApiError::not_found("Brand", id));
        }

        self.write_brands(&brands)?;
        self.logger.info_with("Brand deleted", id);
        Ok(())
    }

    async fn seed(&self, company: Option<&Company>, brands: Option<&[Brand]>) -> ServiceResult<()> {
        let _guard = self.write_lock.lock();

        if let Some(company) = company {
            self.store.write_json(COMPANY_KEY, company)?;
        }
        if let Some(brands) = brands {
            self.write_brands(brands)?;
        }
        Ok(())
    }

    async fn clear(&self) -> ServiceResult<()> {
        let _guard = self.write_lock.lock();

        self.store.remove_item(COMPANY_KEY)?;
        self.store.remove_item(BRANDS_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::codes;
    use crate::logging::LoggerRegistry;
    use crate::models::BrandStatus;
    use crate::storage::MemoryStore;

    fn repository(store: MemoryStore) -> LocalCompanyBrandsRepository {
        LocalCompanyBrandsRepository::new(
            Arc::new(store),
            LoggerRegistry::default().logger("company-brands"),
        )
    }

    fn form(name: &str) -> BrandForm {
        BrandForm {
            name: name.to_string(),
            description: "A brand description long enough.".to_string(),
            benefits: vec!["Speed".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_brand_lifecycle() {
        let repo = repository(MemoryStore::new());

        let brand = repo.create_brand(form("Acme")).await.unwrap();
        assert_eq!(repo.fetch_brands().await.unwrap().len(), 1);

        let updated = repo
            .update_brand(
                &brand.id,
                BrandUpdate {
                    status: Some(BrandStatus::Inactive),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, BrandStatus::Inactive);
        assert_eq!(updated.name, "Acme");

        repo.delete_brand(&brand.id).await.unwrap();
        assert!(repo.fetch_brand(&brand.id).await.unwrap().is_none());

        let err = repo.delete_brand(&brand.id).await.unwrap_err();
        assert_eq!(err.code, codes::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_save_company_keeps_identity() {
        let repo = repository(MemoryStore::new());
        let first = repo
            .save_company(CompanyForm {
                name: "Acme".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let second = repo
            .save_company(CompanyForm {
                name: "Acme Inc".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);
        assert!(second.updated_at > first.updated_at);
        assert_eq!(second.name, "Acme Inc");
    }

    #[tokio::test]
    async fn test_quota_failure_surfaces_storage_error() {
        let repo = repository(MemoryStore::with_quota(64));
        let err = repo.create_brand(form("Acme")).await.unwrap_err();
        assert_eq!(err.code, codes::STORAGE_WRITE_ERROR);
        assert!(repo.fetch_brands().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let repo = repository(MemoryStore::new());
        repo.create_brand(form("Acme")).await.unwrap();
        repo.clear().await.unwrap();
        repo.clear().await.unwrap();
        assert!(repo.fetch_company().await.unwrap().is_none());
        assert!(repo.fetch_brands().await.unwrap().is_empty());
    }
}
