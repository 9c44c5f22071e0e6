//! Demo records used by `load_sample_data`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Brand, BrandStatus, Company};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleDataOptions {
    pub include_company: bool,
    pub include_brands: bool,
    pub brand_count: usize,
}

impl Default for SampleDataOptions {
    fn default() -> Self {
        Self {
            include_company: true,
            include_brands: true,
            brand_count: 3,
        }
    }
}

struct BrandTemplate {
    name: &'static str,
    description: &'static str,
    benefits: &'static [&'static str],
    color: &'static str,
    audience: &'static str,
}

const BRAND_TEMPLATES: &[BrandTemplate] = &[
    BrandTemplate {
        name: "GeoIQ Insights",
        description: "Analytics suite that tracks how AI assistants talk about your brand.",
        benefits: &["Real-time visibility tracking", "Competitor benchmarking", "Actionable content suggestions"],
        color: "#4F46E5",
        audience: "Marketing teams at growing SaaS companies",
    },
    BrandTemplate {
        name: "GeoIQ Monitor",
        description: "Always-on monitoring of brand mentions across major LLM platforms.",
        benefits: &["Instant mention alerts", "Sentiment analysis"],
        color: "#059669",
        audience: "Brand managers and PR agencies",
    },
    BrandTemplate {
        name: "GeoIQ Studio",
        description: "Content workshop that turns visibility gaps into publishable drafts.",
        benefits: &["AI-ready content briefs", "SEO and GEO alignment"],
        color: "#DC2626",
        audience: "Content marketers",
    },
    BrandTemplate {
        name: "GeoIQ Signals",
        description: "Lightweight reporting for executives who need the headline numbers.",
        benefits: &["Weekly executive summaries", "Share-of-voice trends"],
        color: "#D97706",
        audience: "Marketing leadership",
    },
];

pub fn sample_company(now: DateTime<Utc>) -> Company {
    Company {
        id: Uuid::new_v4().to_string(),
        name: "GeoIQ Labs".to_string(),
        description: "Helps brands understand and improve how they appear in AI-generated answers."
            .to_string(),
        industry: "Marketing Technology".to_string(),
        website: Some("https://geoiq.example".to_string()),
        core_kpis: vec![
            "AI visibility score".to_string(),
            "Share of voice".to_string(),
            "Qualified leads".to_string(),
        ],
        mission_statement:
            "Make every great product discoverable in the age of AI-assisted search.".to_string(),
        target_audience: Some("B2B marketing teams".to_string()),
        created_at: now,
        updated_at: now,
    }
}

/// `count` brands cycling through the template catalog; repeats get a
/// numeric suffix so names stay unique.
pub fn sample_brands(count: usize, now: DateTime<Utc>) -> Vec<Brand> {
    (0..count)
        .map(|i| {
            let template = &BRAND_TEMPLATES[i % BRAND_TEMPLATES.len()];
            let round = i / BRAND_TEMPLATES.len();
            let name = if round == 0 {
                template.name.to_string()
            } else {
                format!("{} {}", template.name, round + 1)
            };

            Brand {
                id: Uuid::new_v4().to_string(),
                name,
                description: template.description.to_string(),
                benefits: template.benefits.iter().map(|b| b.to_string()).collect(),
                color: Some(template.color.to_string()),
                website: None,
                target_audience: Some(template.audience.to_string()),
                status: if i % 3 == 2 {
                    BrandStatus::Draft
                } else {
                    BrandStatus::Active
                },
                created_at: now,
                updated_at: now,
            }
        })
        .collect()
}
