use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::future::try_join;

use super::repository::CompanyBrandsRepository;
use super::sample::{sample_brands, sample_company, SampleDataOptions};
use crate::cache::CacheService;
use crate::config::CacheConfig;
use crate::error::{codes, ApiError, ServiceResult};
use crate::logging::Logger;
use crate::models::{
    Brand, BrandForm, BrandUpdate, Company, CompanyAndBrands, CompanyForm, CompanyUpdate,
};
use crate::validation::{FormValidation, ValidationResult};

pub const COMPANY_CACHE_KEY: &str = "company";
pub const BRANDS_CACHE_KEY: &str = "brands";

/// Company and brand management over a [`CompanyBrandsRepository`].
///
/// Reads go through the cache. Writes are validated first and invalidate the
/// affected cache key only after the repository confirmed the write, so a
/// failed write never disturbs what readers currently see.
#[derive(Clone)]
pub struct CompanyBrandsService {
    repository: Arc<dyn CompanyBrandsRepository>,
    cache: CacheService,
    logger: Logger,
    company_ttl: Duration,
    brands_ttl: Duration,
}

impl CompanyBrandsService {
    pub fn new(
        repository: Arc<dyn CompanyBrandsRepository>,
        cache: CacheService,
        config: &CacheConfig,
        logger: Logger,
    ) -> Self {
        Self {
            repository,
            cache,
            logger,
            company_ttl: config.company_ttl(),
            brands_ttl: config.brands_ttl(),
        }
    }

    pub fn validate_company(form: &CompanyForm) -> ValidationResult {
        form.validate_form()
    }

    pub fn validate_brand(form: &BrandForm) -> ValidationResult {
        form.validate_form()
    }

    pub async fn get_company(&self) -> ServiceResult<Option<Company>> {
        self.cache
            .get_or_load(COMPANY_CACHE_KEY, self.company_ttl, || {
                self.repository.fetch_company()
            })
            .await
            .inspect_err(|e| self.log_failure("Failed to load company", e))
    }

    pub async fn save_company(&self, form: CompanyForm) -> ServiceResult<Company> {
        Self::validate_company(&form).into_result()?;

        let company = self
            .repository
            .save_company(form)
            .await
            .inspect_err(|e| self.log_failure("Failed to save company", e))?;

        self.cache.delete(COMPANY_CACHE_KEY);
        Ok(company)
    }

    pub async fn update_company(&self, update: CompanyUpdate) -> ServiceResult<Company> {
        update.validate_form().into_result()?;

        let company = self
            .repository
            .update_company(update)
            .await
            .inspect_err(|e| self.log_failure("Failed to update company", e))?;

        self.cache.delete(COMPANY_CACHE_KEY);
        Ok(company)
    }

    /// Deletes the company. Brands are left in place.
    pub async fn delete_company(&self) -> ServiceResult<()> {
        self.repository
            .delete_company()
            .await
            .inspect_err(|e| self.log_failure("Failed to delete company", e))?;

        self.cache.delete(COMPANY_CACHE_KEY);
        Ok(())
    }

    pub async fn get_brands(&self) -> ServiceResult<Vec<Brand>> {
        self.cache
            .get_or_load(BRANDS_CACHE_KEY, self.brands_ttl, || {
                self.repository.fetch_brands()
            })
            .await
            .inspect_err(|e| self.log_failure("Failed to load brands", e))
    }

    pub async fn get_brand_by_id(&self, id: &str) -> ServiceResult<Brand> {
        if let Some(brands) = self.cache.get::<Vec<Brand>>(BRANDS_CACHE_KEY) {
            if let Some(brand) = brands.into_iter().find(|brand| brand.id == id) {
                return Ok(brand);
            }
        }

        self.repository
            .fetch_brand(id)
            .await
            .inspect_err(|e| self.log_failure("Failed to load brand", e))?
            .ok_or_else(|| ApiError::not_found("Brand", id))
    }

    pub async fn create_brand(&self, form: BrandForm) -> ServiceResult<Brand> {
        Self::validate_brand(&form).into_result()?;

        let brand = self
            .repository
            .create_brand(form)
            .await
            .inspect_err(|e| self.log_failure("Failed to create brand", e))?;

        self.cache.delete(BRANDS_CACHE_KEY);
        Ok(brand)
    }

    pub async fn update_brand(&self, id: &str, update: BrandUpdate) -> ServiceResult<Brand> {
        update.validate_form().into_result()?;

        let brand = self
            .repository
            .update_brand(id, update)
            .await
            .inspect_err(|e| self.log_failure("Failed to update brand", e))?;

        self.cache.delete(BRANDS_CACHE_KEY);
        Ok(brand)
    }

    pub async fn delete_brand(&self, id: &str) -> ServiceResult<()> {
        self.repository
            .delete_brand(id)
            .await
            .inspect_err(|e| self.log_failure("Failed to delete brand", e))?;

        self.cache.delete(BRANDS_CACHE_KEY);
        Ok(())
    }

    /// Reads company and brands concurrently; the first failure wins.
    pub async fn get_company_and_brands(&self) -> ServiceResult<CompanyAndBrands> {
        let (company, brands) = try_join(self.get_company(), self.get_brands()).await?;
        Ok(CompanyAndBrands { company, brands })
    }

    /// Seeds storage and cache with demo records, bypassing validation.
    ///
    /// A storage failure is logged and the records are still served from the
    /// cache for this session.
    pub async fn load_sample_data(
        &self,
        options: SampleDataOptions,
    ) -> ServiceResult<CompanyAndBrands> {
        let now = Utc::now();
        let company = options.include_company.then(|| sample_company(now));
        let brands = options
            .include_brands
            .then(|| sample_brands(options.brand_count, now));

        match self
            .repository
            .seed(company.as_ref(), brands.as_deref())
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_storage_error() => {
                self.logger
                    .warn_with("Sample data kept in memory only; storage rejected it", &e);
            }
            Err(e) => {
                self.log_failure("Failed to load sample data", &e);
                return Err(e);
            }
        }

        if let Some(company) = &company {
            self.cache_or_invalidate(COMPANY_CACHE_KEY, &Some(company), self.company_ttl);
        }
        if let Some(brands) = &brands {
            self.cache_or_invalidate(BRANDS_CACHE_KEY, brands, self.brands_ttl);
        }

        self.logger.info_with(
            "Sample data loaded",
            &serde_json::json!({
                "company": company.is_some(),
                "brands": brands.as_ref().map_or(0, Vec::len),
            }),
        );

        Ok(CompanyAndBrands {
            company,
            brands: brands.unwrap_or_default(),
        })
    }

    /// Removes all company and brand data from storage and cache.
    pub async fn clear_all_data(&self) -> ServiceResult<()> {
        self.repository
            .clear()
            .await
            .inspect_err(|e| self.log_failure("Failed to clear data", e))?;

        self.cache.delete(COMPANY_CACHE_KEY);
        self.cache.delete(BRANDS_CACHE_KEY);
        self.logger.info("All company and brand data cleared");
        Ok(())
    }

    fn cache_or_invalidate<T: serde::Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) {
        if let Err(e) = self.cache.set(key, value, ttl) {
            self.logger.warn_with("Failed to cache value", &e.to_string());
            self.cache.delete(key);
        }
    }

    fn log_failure(&self, message: &str, error: &ApiError) {
        if error.is(codes::VALIDATION_ERROR) {
            self.logger.debug_with(message, error);
        } else {
            self.logger.error_with(message, error);
        }
    }
}
