//! Prompt generation from category templates and persistence of prompt sets

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::cache::CacheService;
use crate::config::CacheConfig;
use crate::error::{ApiError, ServiceResult};
use crate::logging::Logger;
use crate::models::{Brand, Company, Prompt, PromptCategory, PromptGenerationOptions};
use crate::storage::{KeyValueStore, KeyValueStoreExt, PROMPTS_KEY};
use crate::validation::ValidationResult;

pub const PROMPTS_CACHE_KEY: &str = "prompts";
pub const MAX_PROMPTS_PER_BRAND: usize = 50;

const FALLBACK_INDUSTRY: &str = "your industry";
const FALLBACK_AUDIENCE: &str = "businesses";
const FALLBACK_BENEFIT: &str = "better results";

pub struct PromptsService {
    store: Arc<dyn KeyValueStore>,
    cache: CacheService,
    logger: Logger,
    ttl: Duration,
    write_lock: Mutex<()>,
}

impl PromptsService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        cache: CacheService,
        config: &CacheConfig,
        logger: Logger,
    ) -> Self {
        Self {
            store,
            cache,
            logger,
            ttl: config.prompts_ttl(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn validate_options(
        brands: &[Brand],
        options: &PromptGenerationOptions,
    ) -> ValidationResult {
        let mut result = ValidationResult::success();
        if brands.is_empty() {
            result.add_error("brands", "At least one brand is required");
        }
        if !(1..=MAX_PROMPTS_PER_BRAND).contains(&options.prompts_per_brand) {
            result.add_error(
                "promptsPerBrand",
                &format!("Must be between 1 and {}", MAX_PROMPTS_PER_BRAND),
            );
        }
        result
    }

    /// Generates prompts for `brands`, replacing any earlier set for the same
    /// brands, and persists the combined collection.
    pub async fn generate_prompts(
        &self,
        company: Option<&Company>,
        brands: &[Brand],
        options: &PromptGenerationOptions,
    ) -> ServiceResult<Vec<Prompt>> {
        Self::validate_options(brands, options).into_result()?;

        let categories: &[PromptCategory] = if options.categories.is_empty() {
            &PromptCategory::ALL
        } else {
            &options.categories
        };

        let generated: Vec<Prompt> = brands
            .iter()
            .flat_map(|brand| build_prompts(company, brand, categories, options.prompts_per_brand))
            .collect();

        {
            let _guard = self.write_lock.lock();
            let brand_ids: HashSet<&str> = brands.iter().map(|b| b.id.as_str()).collect();

            let mut all = self.read_all()?;
            all.retain(|prompt| !brand_ids.contains(prompt.brand_id.as_str()));
            all.extend(generated.iter().cloned());

            self.store
                .write_json(PROMPTS_KEY, &all)
                .map_err(ApiError::from)
                .inspect_err(|e| self.logger.error_with("Failed to persist prompts", e))?;
        }

        self.cache.delete(PROMPTS_CACHE_KEY);
        self.logger.info_with(
            "Prompts generated",
            &serde_json::json!({ "brands": brands.len(), "prompts": generated.len() }),
        );
        Ok(generated)
    }

    pub async fn get_prompts(&self) -> ServiceResult<Vec<Prompt>> {
        self.cache
            .get_or_load(PROMPTS_CACHE_KEY, self.ttl, || async { self.read_all() })
            .await
            .inspect_err(|e| self.logger.error_with("Failed to load prompts", e))
    }

    pub async fn get_prompts_for_brand(&self, brand_id: &str) -> ServiceResult<Vec<Prompt>> {
        Ok(self
            .get_prompts()
            .await?
            .into_iter()
            .filter(|prompt| prompt.brand_id == brand_id)
            .collect())
    }

    pub async fn delete_prompt(&self, id: &str) -> ServiceResult<()> {
        {
            let _guard = self.write_lock.lock();
            let mut all = self.read_all()?;
            let before = all.len();
            all.retain(|prompt| prompt.id != id);
            if all.len() == before {
                return Err(ApiError::not_found("Prompt", id));
            }
            self.store.write_json(PROMPTS_KEY, &all)?;
        }

        self.cache.delete(PROMPTS_CACHE_KEY);
        Ok(())
    }

    pub async fn clear_prompts(&self) -> ServiceResult<()> {
        {
            let _guard = self.write_lock.lock();
            self.store.remove_item(PROMPTS_KEY)?;
        }

        self.cache.delete(PROMPTS_CACHE_KEY);
        self.logger.info("Prompts cleared");
        Ok(())
    }

    fn read_all(&self) -> ServiceResult<Vec<Prompt>> {
        Ok(self.store.read_json(PROMPTS_KEY)?.unwrap_or_default())
    }
}

/// Up to `count` distinct prompts for one brand, alternating categories so
/// that short sets still cover several of them.
fn build_prompts(
    company: Option<&Company>,
    brand: &Brand,
    categories: &[PromptCategory],
    count: usize,
) -> Vec<Prompt> {
    let industry = company
        .map(|c| c.industry.trim())
        .filter(|industry| !industry.is_empty())
        .unwrap_or(FALLBACK_INDUSTRY);
    let audience = brand
        .target_audience
        .as_deref()
        .or_else(|| company.and_then(|c| c.target_audience.as_deref()))
        .filter(|audience| !audience.trim().is_empty())
        .unwrap_or(FALLBACK_AUDIENCE);
    let benefits: Vec<&str> = if brand.benefits.is_empty() {
        vec![FALLBACK_BENEFIT]
    } else {
        brand.benefits.iter().map(String::as_str).collect()
    };

    let per_category: Vec<Vec<(PromptCategory, String)>> = categories
        .iter()
        .map(|&category| {
            category
                .templates()
                .iter()
                .flat_map(|template| {
                    let variants: &[&str] = if template.contains("{benefit}") {
                        &benefits
                    } else {
                        &benefits[..1]
                    };
                    variants.iter().map(move |benefit| {
                        let text = template
                            .replace("{brand}", &brand.name)
                            .replace("{industry}", industry)
                            .replace("{audience}", audience)
                            .replace("{benefit}", benefit);
                        (category, text)
                    })
                })
                .collect()
        })
        .collect();

    let now = Utc::now();
    let mut seen = HashSet::new();
    let mut prompts = Vec::with_capacity(count);
    let longest = per_category.iter().map(Vec::len).max().unwrap_or(0);

    'outer: for round in 0..longest {
        for candidates in &per_category {
            if prompts.len() == count {
                break 'outer;
            }
            let Some((category, text)) = candidates.get(round) else {
                continue;
            };
            if !seen.insert(text.clone()) {
                continue;
            }
            prompts.push(Prompt {
                id: Uuid::new_v4().to_string(),
                text: text.clone(),
                category: *category,
                brand_id: brand.id.clone(),
                brand_name: brand.name.clone(),
                created_at: now,
            });
        }
    }

    prompts
}
