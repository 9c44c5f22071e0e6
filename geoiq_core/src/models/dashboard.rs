use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    /// 0-100 composite score.
    pub visibility_score: f64,
    /// Percentage of tracked answers mentioning the brand.
    pub share_of_voice: f64,
    pub total_mentions: u64,
    pub average_position: f64,
    /// -1.0 (negative) to 1.0 (positive).
    pub sentiment_score: f64,
    pub prompts_tracked: u32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub visibility_score: f64,
    pub mentions: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorSnapshot {
    pub name: String,
    pub visibility_score: f64,
    pub share_of_voice: f64,
    pub trend: TrendDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    ScanCompleted,
    PromptsGenerated,
    BrandUpdated,
    MentionDetected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    pub id: String,
    pub kind: ActivityKind,
    pub title: String,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub metrics: DashboardMetrics,
    pub trends: Vec<TrendPoint>,
    pub competitors: Vec<CompetitorSnapshot>,
    pub recent_activity: Vec<ActivityItem>,
}
