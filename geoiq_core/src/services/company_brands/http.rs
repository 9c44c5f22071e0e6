use async_trait::async_trait;
use serde_json::Value;

use super::repository::CompanyBrandsRepository;
use crate::api::ApiClient;
use crate::error::{ApiError, ServiceResult};
use crate::models::{Brand, BrandForm, BrandUpdate, Company, CompanyForm, CompanyUpdate};

fn is_not_found(error: &ApiError) -> bool {
    error.code == "HTTP_404"
}

/// Repository backed by the REST endpoints `/company`, `/brands` and
/// `/brands/:id`.
#[derive(Debug, Clone)]
pub struct HttpCompanyBrandsRepository {
    api: ApiClient,
}

impl HttpCompanyBrandsRepository {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn brand_path(id: &str) -> String {
        format!("/brands/{}", id)
    }
}

#[async_trait]
impl CompanyBrandsRepository for HttpCompanyBrandsRepository {
    async fn fetch_company(&self) -> ServiceResult<Option<Company>> {
        match self.api.get::<Option<Company>>("/company", None).await {
            Err(error) if is_not_found(&error) => Ok(None),
            other => other,
        }
    }

    async fn save_company(&self, form: CompanyForm) -> ServiceResult<Company> {
        self.api.post("/company", &form, None).await
    }

    async fn update_company(&self, update: CompanyUpdate) -> ServiceResult<Company> {
        self.api.patch("/company", &update, None).await
    }

    async fn delete_company(&self) -> ServiceResult<()> {
        self.api.delete::<Value>("/company", None).await.map(|_| ())
    }

    async fn fetch_brands(&self) -> ServiceResult<Vec<Brand>> {
        self.api
            .get::<Option<Vec<Brand>>>("/brands", None)
            .await
            .map(Option::unwrap_or_default)
    }

    async fn fetch_brand(&self, id: &str) -> ServiceResult<Option<Brand>> {
        match self.api.get::<Brand>(&Self::brand_path(id), None).await {
            Ok(brand) => Ok(Some(brand)),
            Err(error) if is_not_found(&error) => Ok(None),
            Err(error) => Err(error),
        }
    }

    async fn create_brand(&self, form: BrandForm) -> ServiceResult<Brand> {
        self.api.post("/brands", &form, None).await
    }

    async fn update_brand(&self, id: &str, update: BrandUpdate) -> ServiceResult<Brand> {
        self.api.patch(&Self::brand_path(id), &update, None).await
    }

    async fn delete_brand(&self, id: &str) -> ServiceResult<()> {
        self.api
            .delete::<Value>(&Self::brand_path(id), None)
            .await
            .map(|_| ())
    }

    async fn seed(&self, company: Option<&Company>, brands: Option<&[Brand]>) -> ServiceResult<()> {
        if let Some(company) = company {
            self.api.put::<Value, _>("/company", company, None).await?;
        }
        if let Some(brands) = brands {
            self.api.put::<Value, _>("/brands", brands, None).await?;
        }
        Ok(())
    }

    async fn clear(&self) -> ServiceResult<()> {
        for path in ["/company", "/brands"] {
            match self.api.delete::<Value>(path, None).await {
                Ok(_) => {}
                Err(error) if is_not_found(&error) => {}
                Err(error) => return Err(error),
            }
        }
        Ok(())
    }
}
