//! Developer harness that walks the sample-data, prompts, scan and dashboard flow

use std::io::IsTerminal;

use anyhow::Result;
use geoiq_core::config::{LogFormat, LoggingConfig};
use geoiq_core::models::{AiPlatform, PromptGenerationOptions, ScanRequest};
use geoiq_core::{AppConfig, AppServices, SampleDataOptions};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_tracing(&config.logging);

    info!("Configuration loaded successfully");
    info!("API base URL: {}", config.api.base_url);
    info!("Storage backend: {:?}", config.storage.backend);

    config
        .create_directories()
        .map_err(|e| anyhow::anyhow!("Failed to create directories: {}", e))?;

    let services = AppServices::from_config(&config)?;

    let seeded = services
        .company_brands
        .load_sample_data(SampleDataOptions::default())
        .await?;
    info!(
        "Sample data loaded: company={}, brands={}",
        seeded.company.is_some(),
        seeded.brands.len()
    );

    let current = services.company_brands.get_company_and_brands().await?;
    let active: Vec<_> = current
        .brands
        .iter()
        .filter(|brand| brand.is_active())
        .cloned()
        .collect();

    let prompts = services
        .prompts
        .generate_prompts(
            current.company.as_ref(),
            &active,
            &PromptGenerationOptions {
                prompts_per_brand: 5,
                categories: Vec::new(),
            },
        )
        .await?;
    info!("Generated {} prompts for {} brands", prompts.len(), active.len());

    match active.first() {
        Some(brand) => {
            let request = ScanRequest {
                brand: brand.clone(),
                prompts: services.prompts.get_prompts_for_brand(&brand.id).await?,
                platforms: AiPlatform::ALL.to_vec(),
                competitors: vec!["BrightMetrics".to_string(), "RankLens".to_string()],
            };
            let scan = services.visibility.run_scan(request).await?;
            info!(
                "Scan for {}: overall score {:.1}, mention rate {:.0}%",
                scan.brand_name,
                scan.overall_score,
                scan.mention_rate * 100.0
            );
            for platform in &scan.platform_scores {
                info!("  {}: {:.1}", platform.platform.display_name(), platform.score);
            }
        }
        None => warn!("No active brands; skipping visibility scan"),
    }

    match services.dashboard.get_dashboard_data().await {
        Ok(dashboard) => info!(
            "Dashboard: visibility {:.1}, share of voice {:.1}%, {} trend points, {} competitors",
            dashboard.metrics.visibility_score,
            dashboard.metrics.share_of_voice,
            dashboard.trends.len(),
            dashboard.competitors.len()
        ),
        Err(e) => warn!("Dashboard unavailable: {}", e),
    }

    let stats = services.cache.stats();
    info!(
        "Cache: {} entries, {} hits, {} misses, hit rate {:.2}",
        stats.current_size,
        stats.hits,
        stats.misses,
        stats.hit_rate()
    );

    Ok(())
}

fn init_tracing(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "geoiq_core={level},{}={level}",
            env!("CARGO_CRATE_NAME").replace('-', "_"),
            level = config.level
        )
        .into()
    });

    let fmt_layer = fmt::layer().with_target(true).with_line_number(true);

    let is_json = match config.format {
        LogFormat::Json => true,
        LogFormat::Pretty => false,
        LogFormat::Auto => !std::io::stdout().is_terminal(),
    };

    if is_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.pretty())
            .init();
    }
}
