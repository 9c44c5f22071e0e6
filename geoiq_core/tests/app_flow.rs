use std::sync::Arc;

use geoiq_core::config::{DataSource, StorageBackend};
use geoiq_core::models::{AiPlatform, PromptGenerationOptions, ScanRequest};
use geoiq_core::storage::{FileStore, PROMPTS_KEY, VISIBILITY_KEY};
use geoiq_core::{AppConfig, AppServices, KeyValueStore, LoggerRegistry, MemoryStore, SampleDataOptions};

fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.storage.backend = StorageBackend::Memory;
    config.services.company_source = DataSource::Local;
    config.services.mock_dashboard = true;
    config.services.scan_delay_ms = 10;
    config
}

#[tokio::test]
async fn test_sample_to_dashboard_flow() {
    let store = Arc::new(MemoryStore::new());
    let services =
        AppServices::with_store(&config(), store.clone(), LoggerRegistry::default()).unwrap();

    let seeded = services
        .company_brands
        .load_sample_data(SampleDataOptions::default())
        .await
        .unwrap();
    let brand = seeded.brands[0].clone();

    let prompts = services
        .prompts
        .generate_prompts(
            seeded.company.as_ref(),
            &seeded.brands,
            &PromptGenerationOptions {
                prompts_per_brand: 4,
                categories: Vec::new(),
            },
        )
        .await
        .unwrap();
    assert_eq!(prompts.len(), 4 * seeded.brands.len());
    assert!(prompts
        .iter()
        .any(|p| p.text.contains(&seeded.company.as_ref().unwrap().industry)));
    assert!(store.get_item(PROMPTS_KEY).unwrap().is_some());

    let scan = services
        .visibility
        .run_scan(ScanRequest {
            brand: brand.clone(),
            prompts: services
                .prompts
                .get_prompts_for_brand(&brand.id)
                .await
                .unwrap(),
            platforms: vec![AiPlatform::Claude, AiPlatform::Gemini],
            competitors: Vec::new(),
        })
        .await
        .unwrap();
    assert_eq!(scan.results.len(), 4 * 2);
    assert_eq!(scan.brand_id, brand.id);
    assert!(store.get_item(VISIBILITY_KEY).unwrap().is_some());
    assert_eq!(
        services.visibility.get_latest_scan().await.unwrap(),
        Some(scan)
    );

    let dashboard = services.dashboard.get_dashboard_data().await.unwrap();
    assert!(!dashboard.trends.is_empty());
    assert_eq!(services.dashboard.get_dashboard_data().await.unwrap(), dashboard);

    services.company_brands.clear_all_data().await.unwrap();
    services.prompts.clear_prompts().await.unwrap();
    services.visibility.clear_scan_data().await.unwrap();
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_file_backend_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config();
    config.storage.backend = StorageBackend::File;
    config.storage.data_dir = dir.path().to_path_buf();

    let first = AppServices::from_config(&config).unwrap();
    let seeded = first
        .company_brands
        .load_sample_data(SampleDataOptions {
            include_company: false,
            include_brands: true,
            brand_count: 2,
        })
        .await
        .unwrap();
    assert!(seeded.company.is_none());

    let second = AppServices::from_config(&config).unwrap();
    let reloaded = second.company_brands.get_company_and_brands().await.unwrap();
    assert!(reloaded.company.is_none());
    assert_eq!(reloaded.brands, seeded.brands);

    let store = FileStore::new(dir.path()).unwrap();
    assert_eq!(store.keys().unwrap().len(), 1);
}
