use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Brand, Prompt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiPlatform {
    ChatGpt,
    Claude,
    Gemini,
    Perplexity,
}

impl AiPlatform {
    pub const ALL: [AiPlatform; 4] = [
        AiPlatform::ChatGpt,
        AiPlatform::Claude,
        AiPlatform::Gemini,
        AiPlatform::Perplexity,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            AiPlatform::ChatGpt => "ChatGPT",
            AiPlatform::Claude => "Claude",
            AiPlatform::Gemini => "Gemini",
            AiPlatform::Perplexity => "Perplexity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptResult {
    pub prompt_id: String,
    pub prompt_text: String,
    pub platform: AiPlatform,
    pub mentioned: bool,
    /// 1-based rank among the answer's mentions, when mentioned.
    pub position: Option<u32>,
    pub sentiment: Sentiment,
    pub competitors_mentioned: Vec<String>,
    pub excerpt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformScore {
    pub platform: AiPlatform,
    pub score: f64,
    pub mention_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityData {
    pub id: String,
    pub brand_id: String,
    pub brand_name: String,
    /// 0-100.
    pub overall_score: f64,
    /// 0.0-1.0.
    pub mention_rate: f64,
    pub average_position: Option<f64>,
    pub platform_scores: Vec<PlatformScore>,
    pub results: Vec<PromptResult>,
    pub scanned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub brand: Brand,
    pub prompts: Vec<Prompt>,
    /// Empty means every platform.
    #[serde(default)]
    pub platforms: Vec<AiPlatform>,
    #[serde(default)]
    pub competitors: Vec<String>,
}

/// On-disk form of the latest scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredScan {
    pub data: VisibilityData,
    pub timestamp: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl StoredScan {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
