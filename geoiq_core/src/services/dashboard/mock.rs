//! Synthetic dashboard figures for development without a backend

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use super::source::DashboardSource;
use crate::error::ServiceResult;
use crate::models::{
    ActivityItem, ActivityKind, CompetitorSnapshot, DashboardData, DashboardMetrics,
    TrendDirection, TrendPoint,
};

const COMPETITORS: &[&str] = &[
    "BrightMetrics",
    "Voxly Analytics",
    "SignalSpring",
    "RankLens",
    "EchoScope",
];

const DEFAULT_TREND_DAYS: u32 = 30;
const DEFAULT_ACTIVITY_LIMIT: usize = 10;

/// Random but plausible dashboard data. A fixed seed makes it reproducible.
pub struct MockDashboardSource {
    rng: Mutex<StdRng>,
}

impl Default for MockDashboardSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDashboardSource {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn metrics(&self) -> DashboardMetrics {
        let mut rng = self.rng.lock();
        DashboardMetrics {
            visibility_score: round1(rng.random_range(35.0..=92.0)),
            share_of_voice: round1(rng.random_range(5.0..=45.0)),
            total_mentions: rng.random_range(120..=4_800),
            average_position: round1(rng.random_range(1.0..=6.0)),
            sentiment_score: round2(rng.random_range(-0.2..=0.9)),
            prompts_tracked: rng.random_range(20..=250),
            updated_at: Utc::now(),
        }
    }

    fn trends(&self, days: u32) -> Vec<TrendPoint> {
        let mut rng = self.rng.lock();
        let today = Utc::now().date_naive();
        let mut score: f64 = rng.random_range(40.0..=70.0);

        (0..days)
            .rev()
            .map(|offset| {
                score = (score + rng.random_range(-4.0..=4.5)).clamp(0.0, 100.0);
                TrendPoint {
                    date: today - ChronoDuration::days(i64::from(offset)),
                    visibility_score: round1(score),
                    mentions: rng.random_range(5..=180),
                }
            })
            .collect()
    }

    fn competitors(&self) -> Vec<CompetitorSnapshot> {
        let mut rng = self.rng.lock();
        let mut rows: Vec<CompetitorSnapshot> = COMPETITORS
            .iter()
            .map(|name| CompetitorSnapshot {
                name: name.to_string(),
                visibility_score: round1(rng.random_range(20.0..=95.0)),
                share_of_voice: round1(rng.random_range(2.0..=35.0)),
                trend: *[TrendDirection::Up, TrendDirection::Down, TrendDirection::Stable]
                    .choose(&mut *rng)
                    .unwrap_or(&TrendDirection::Stable),
            })
            .collect();

        rows.sort_by(|a, b| b.visibility_score.total_cmp(&a.visibility_score));
        rows
    }

    fn activity(&self, limit: usize) -> Vec<ActivityItem> {
        let mut rng = self.rng.lock();
        let mut occurred_at = Utc::now();

        (0..limit)
            .map(|_| {
                occurred_at -= ChronoDuration::minutes(rng.random_range(5..=240));
                let competitor = COMPETITORS.choose(&mut *rng).copied().unwrap_or("a competitor");
                let (kind, title, description) = match rng.random_range(0..4) {
                    0 => (
                        ActivityKind::ScanCompleted,
                        "Visibility scan completed".to_string(),
                        format!("Scanned {} prompts across 4 platforms", rng.random_range(10..=60)),
                    ),
                    1 => (
                        ActivityKind::PromptsGenerated,
                        "New prompts generated".to_string(),
                        format!("{} prompts added to tracking", rng.random_range(5..=30)),
                    ),
                    2 => (
                        ActivityKind::BrandUpdated,
                        "Brand profile updated".to_string(),
                        "Benefits and audience were revised".to_string(),
                    ),
                    _ => (
                        ActivityKind::MentionDetected,
                        "Mentioned alongside competitor".to_string(),
                        format!("Your brand appeared next to {}", competitor),
                    ),
                };

                ActivityItem {
                    id: Uuid::new_v4().to_string(),
                    kind,
                    title,
                    description,
                    occurred_at,
                }
            })
            .collect()
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[async_trait]
impl DashboardSource for MockDashboardSource {
    async fn fetch_dashboard(&self) -> ServiceResult<DashboardData> {
        Ok(DashboardData {
            metrics: self.metrics(),
            trends: self.trends(DEFAULT_TREND_DAYS),
            competitors: self.competitors(),
            recent_activity: self.activity(DEFAULT_ACTIVITY_LIMIT),
        })
    }

    async fn fetch_metrics(&self) -> ServiceResult<DashboardMetrics> {
        Ok(self.metrics())
    }

    async fn fetch_trends(&self, days: u32) -> ServiceResult<Vec<TrendPoint>> {
        Ok(self.trends(days))
    }

    async fn fetch_competitors(&self) -> ServiceResult<Vec<CompetitorSnapshot>> {
        Ok(self.competitors())
    }

    async fn fetch_recent_activity(&self, limit: usize) -> ServiceResult<Vec<ActivityItem>> {
        Ok(self.activity(limit))
    }
}
