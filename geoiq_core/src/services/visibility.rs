//! Simulated brand-visibility scans across AI platforms

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::cache::CacheService;
use crate::config::{CacheConfig, ServicesConfig};
use crate::error::{ApiError, ServiceResult};
use crate::logging::Logger;
use crate::models::{
    AiPlatform, PlatformScore, Prompt, PromptResult, ScanRequest, Sentiment, StoredScan,
    VisibilityData,
};
use crate::storage::{KeyValueStore, KeyValueStoreExt, VISIBILITY_KEY};
use crate::validation::ValidationResult;

pub const VISIBILITY_CACHE_KEY: &str = "visibility:latest";

/// How long a persisted scan stays readable.
pub const STORED_SCAN_LIFETIME: Duration = Duration::from_secs(60 * 60);

const MAX_POSITION: u32 = 5;

pub struct VisibilityScanningService {
    store: Arc<dyn KeyValueStore>,
    cache: CacheService,
    logger: Logger,
    ttl: Duration,
    scan_delay: Duration,
    rng: Mutex<StdRng>,
}

impl VisibilityScanningService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        cache: CacheService,
        cache_config: &CacheConfig,
        services_config: &ServicesConfig,
        logger: Logger,
    ) -> Self {
        Self {
            store,
            cache,
            logger,
            ttl: cache_config.visibility_ttl(),
            scan_delay: services_config.scan_delay(),
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Makes generated results reproducible.
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    pub fn with_scan_delay(self, scan_delay: Duration) -> Self {
        Self { scan_delay, ..self }
    }

    pub fn validate_request(request: &ScanRequest) -> ValidationResult {
        let mut result = ValidationResult::success();
        if request.brand.id.trim().is_empty() {
            result.add_error("brand", "A saved brand is required");
        }
        if request.prompts.is_empty() {
            result.add_error("prompts", "At least one prompt is required");
        }
        result
    }

    pub async fn run_scan(&self, request: ScanRequest) -> ServiceResult<VisibilityData> {
        Self::validate_request(&request).into_result()?;

        let platforms: Vec<AiPlatform> = if request.platforms.is_empty() {
            AiPlatform::ALL.to_vec()
        } else {
            request.platforms.clone()
        };

        self.logger.info_with(
            "Visibility scan started",
            &serde_json::json!({
                "brand": request.brand.name,
                "prompts": request.prompts.len(),
                "platforms": platforms.len(),
            }),
        );

        if !self.scan_delay.is_zero() {
            tokio::time::sleep(self.scan_delay).await;
        }

        let results = self.simulate_results(&request, &platforms);
        let now = Utc::now();
        let data = aggregate(&request, &platforms, results, now);

        self.persist(&data, now);
        if let Err(e) = self.cache.set(VISIBILITY_CACHE_KEY, &data, self.ttl) {
            self.logger.warn_with("Failed to cache scan", &e.to_string());
        }

        self.logger.info_with(
            "Visibility scan completed",
            &serde_json::json!({
                "overallScore": data.overall_score,
                "mentionRate": data.mention_rate,
            }),
        );
        Ok(data)
    }

    /// Latest scan from cache, then storage. Expired data is removed and
    /// reported as absent.
    pub async fn get_latest_scan(&self) -> ServiceResult<Option<VisibilityData>> {
        if let Some(data) = self.cache.get::<VisibilityData>(VISIBILITY_CACHE_KEY) {
            return Ok(Some(data));
        }

        let stored: Option<StoredScan> = self.store.read_json(VISIBILITY_KEY).map_err(|e| {
            let e = ApiError::from(e);
            self.logger.error_with("Failed to read scan data", &e);
            e
        })?;

        let Some(stored) = stored else {
            return Ok(None);
        };

        let now = Utc::now();
        if stored.is_expired_at(now) {
            self.logger.debug("Stored scan expired");
            if let Err(e) = self.store.remove_item(VISIBILITY_KEY) {
                self.logger.warn_with("Failed to remove expired scan", &ApiError::from(e));
            }
            return Ok(None);
        }

        let remaining = (stored.expires_at - now).to_std().unwrap_or(Duration::ZERO);
        if let Err(e) = self
            .cache
            .set(VISIBILITY_CACHE_KEY, &stored.data, remaining.min(self.ttl))
        {
            self.logger.warn_with("Failed to cache scan", &e.to_string());
        }
        Ok(Some(stored.data))
    }

    pub async fn clear_scan_data(&self) -> ServiceResult<()> {
        self.store.remove_item(VISIBILITY_KEY)?;
        self.cache.delete(VISIBILITY_CACHE_KEY);
        self.logger.info("Scan data cleared");
        Ok(())
    }

    fn persist(&self, data: &VisibilityData, now: DateTime<Utc>) {
        let expires_at = chrono::Duration::from_std(STORED_SCAN_LIFETIME)
            .ok()
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let stored = StoredScan {
            data: data.clone(),
            timestamp: now,
            expires_at,
        };

        if let Err(e) = self.store.write_json(VISIBILITY_KEY, &stored) {
            self.logger
                .warn_with("Scan kept in memory only; storage rejected it", &ApiError::from(e));
        }
    }

    fn simulate_results(
        &self,
        request: &ScanRequest,
        platforms: &[AiPlatform],
    ) -> Vec<PromptResult> {
        let mut rng = self.rng.lock();
        let brand_strength: f64 = rng.random_range(0.3..=0.8);

        let mut results = Vec::with_capacity(request.prompts.len() * platforms.len());
        for prompt in &request.prompts {
            for &platform in platforms {
                let mentioned = rng.random_bool(brand_strength);
                let position = mentioned.then(|| rng.random_range(1..=MAX_POSITION));
                let sentiment = if !mentioned {
                    Sentiment::Neutral
                } else {
                    match rng.random_range(0..10) {
                        0 => Sentiment::Negative,
                        1..=3 => Sentiment::Neutral,
                        _ => Sentiment::Positive,
                    }
                };
                let competitors_mentioned: Vec<String> = request
                    .competitors
                    .iter()
                    .filter(|_| rng.random_bool(0.4))
                    .cloned()
                    .collect();

                results.push(PromptResult {
                    prompt_id: prompt.id.clone(),
                    prompt_text: prompt.text.clone(),
                    platform,
                    mentioned,
                    position,
                    sentiment,
                    excerpt: excerpt(prompt, &request.brand.name, platform, position),
                    competitors_mentioned,
                });
            }
        }
        results
    }
}

fn excerpt(prompt: &Prompt, brand: &str, platform: AiPlatform, position: Option<u32>) -> String {
    match position {
        Some(1) => format!(
            "{} recommends {} first when asked: \"{}\"",
            platform.display_name(),
            brand,
            prompt.text
        ),
        Some(rank) => format!(
            "{} lists {} at position {} for: \"{}\"",
            platform.display_name(),
            brand,
            rank,
            prompt.text
        ),
        None => format!(
            "{} did not mention {} for: \"{}\"",
            platform.display_name(),
            brand,
            prompt.text
        ),
    }
}

/// Score for a set of results: mention rate weighted 70%, rank 30%.
fn score(results: &[&PromptResult]) -> (f64, f64, Option<f64>) {
    if results.is_empty() {
        return (0.0, 0.0, None);
    }

    let positions: Vec<u32> = results.iter().filter_map(|r| r.position).collect();
    let mention_rate = positions.len() as f64 / results.len() as f64;
    let average_position = (!positions.is_empty())
        .then(|| positions.iter().sum::<u32>() as f64 / positions.len() as f64);
    let rank_quality = average_position
        .map(|avg| (f64::from(MAX_POSITION) + 1.0 - avg) / f64::from(MAX_POSITION))
        .unwrap_or(0.0);

    let score = (mention_rate * 70.0 + rank_quality * 30.0).clamp(0.0, 100.0);
    (round1(score), mention_rate, average_position.map(round1))
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn aggregate(
    request: &ScanRequest,
    platforms: &[AiPlatform],
    results: Vec<PromptResult>,
    now: DateTime<Utc>,
) -> VisibilityData {
    let mut by_platform: HashMap<AiPlatform, Vec<&PromptResult>> = HashMap::new();
    for result in &results {
        by_platform.entry(result.platform).or_default().push(result);
    }

    let platform_scores: Vec<PlatformScore> = platforms
        .iter()
        .map(|platform| {
            let rows = by_platform.get(platform).map(Vec::as_slice).unwrap_or(&[]);
            let (platform_score, mention_rate, _) = score(rows);
            PlatformScore {
                platform: *platform,
                score: platform_score,
                mention_rate,
            }
        })
        .collect();

    let all: Vec<&PromptResult> = results.iter().collect();
    let (overall_score, mention_rate, average_position) = score(&all);

    VisibilityData {
        id: Uuid::new_v4().to_string(),
        brand_id: request.brand.id.clone(),
        brand_name: request.brand.name.clone(),
        overall_score,
        mention_rate,
        average_position,
        platform_scores,
        results,
        scanned_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::codes;
    use crate::logging::LoggerRegistry;
    use crate::models::{Brand, BrandStatus, PromptCategory};
    use crate::storage::MemoryStore;

    fn request(prompt_count: usize) -> ScanRequest {
        let now = Utc::now();
        let brand = Brand {
            id: "b1".to_string(),
            name: "Acme".to_string(),
            description: "A brand description long enough.".to_string(),
            benefits: vec!["Speed".to_string()],
            color: None,
            website: None,
            target_audience: None,
            status: BrandStatus::Active,
            created_at: now,
            updated_at: now,
        };
        let prompts = (0..prompt_count)
            .map(|i| Prompt {
                id: format!("p{}", i),
                text: format!("Question {}", i),
                category: PromptCategory::Recommendation,
                brand_id: brand.id.clone(),
                brand_name: brand.name.clone(),
                created_at: now,
            })
            .collect();

        ScanRequest {
            brand,
            prompts,
            platforms: Vec::new(),
            competitors: vec!["Globex".to_string()],
        }
    }

    fn service(store: Arc<MemoryStore>) -> VisibilityScanningService {
        VisibilityScanningService::new(
            store,
            CacheService::default(),
            &CacheConfig::default(),
            &ServicesConfig::default(),
            LoggerRegistry::default().logger("visibility"),
        )
        .with_scan_delay(Duration::ZERO)
        .with_seed(11)
    }

    #[tokio::test]
    async fn test_scan_covers_every_prompt_and_platform() {
        let service = service(Arc::new(MemoryStore::new()));
        let data = service.run_scan(request(3)).await.unwrap();

        assert_eq!(data.results.len(), 3 * AiPlatform::ALL.len());
        assert_eq!(data.platform_scores.len(), AiPlatform::ALL.len());
        assert!((0.0..=100.0).contains(&data.overall_score));
        assert!((0.0..=1.0).contains(&data.mention_rate));
        for result in &data.results {
            assert_eq!(result.mentioned, result.position.is_some());
        }
    }

    #[tokio::test]
    async fn test_empty_prompts_rejected() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());

        let err = service.run_scan(request(0)).await.unwrap_err();
        assert_eq!(err.code, codes::VALIDATION_ERROR);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_latest_scan_survives_cache_loss() {
        let store = Arc::new(MemoryStore::new());
        let data = service(store.clone()).run_scan(request(2)).await.unwrap();

        // A fresh service has an empty cache and reads storage.
        let latest = service(store).get_latest_scan().await.unwrap();
        assert_eq!(latest, Some(data));
    }

    #[tokio::test]
    async fn test_expired_scan_is_not_returned() {
        let store = Arc::new(MemoryStore::new());
        let data = service(store.clone()).run_scan(request(1)).await.unwrap();

        let past = Utc::now() - chrono::Duration::hours(2);
        store
            .write_json(
                VISIBILITY_KEY,
                &StoredScan {
                    data,
                    timestamp: past,
                    expires_at: past + chrono::Duration::hours(1),
                },
            )
            .unwrap();

        let fresh = service(store.clone());
        assert_eq!(fresh.get_latest_scan().await.unwrap(), None);
        assert!(store.get_item(VISIBILITY_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_storage_failure_still_returns_scan() {
        let store = Arc::new(MemoryStore::with_quota(16));
        let service = service(store);

        let data = service.run_scan(request(2)).await.unwrap();
        assert_eq!(service.get_latest_scan().await.unwrap(), Some(data));
    }

    #[tokio::test]
    async fn test_clear_scan_data() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store);
        service.run_scan(request(1)).await.unwrap();

        service.clear_scan_data().await.unwrap();
        service.clear_scan_data().await.unwrap();
        assert_eq!(service.get_latest_scan().await.unwrap(), None);
    }

    #[test]
    fn test_score_weights_mentions_and_rank() {
        let make = |position: Option<u32>| PromptResult {
            prompt_id: "p".to_string(),
            prompt_text: "q".to_string(),
            platform: AiPlatform::Claude,
            mentioned: position.is_some(),
            position,
            sentiment: Sentiment::Neutral,
            competitors_mentioned: Vec::new(),
            excerpt: String::new(),
        };

        let top = make(Some(1));
        assert_eq!(score(&[&top]), (100.0, 1.0, Some(1.0)));

        let missed = make(None);
        assert_eq!(score(&[&missed]), (0.0, 0.0, None));

        let last = make(Some(MAX_POSITION));
        assert_eq!(score(&[&last, &missed]).0, 41.0);
    }
}
