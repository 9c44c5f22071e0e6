use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptCategory {
    Recommendation,
    Comparison,
    ProblemSolving,
    Feature,
    Review,
    Industry,
}

impl PromptCategory {
    pub const ALL: [PromptCategory; 6] = [
        PromptCategory::Recommendation,
        PromptCategory::Comparison,
        PromptCategory::ProblemSolving,
        PromptCategory::Feature,
        PromptCategory::Review,
        PromptCategory::Industry,
    ];

    /// Question templates. Placeholders: `{brand}`, `{industry}`,
    /// `{benefit}`, `{audience}`.
    pub fn templates(&self) -> &'static [&'static str] {
        match self {
            PromptCategory::Recommendation => &[
                "What is the best {industry} solution for {audience}?",
                "Which {industry} tools would you recommend for {audience}?",
                "Can you recommend a {industry} product known for {benefit}?",
            ],
            PromptCategory::Comparison => &[
                "How does {brand} compare to other {industry} options?",
                "What are the main alternatives to {brand}?",
                "Is {brand} better than its competitors for {benefit}?",
            ],
            PromptCategory::ProblemSolving => &[
                "How can {audience} achieve {benefit}?",
                "What is the easiest way to get {benefit} in {industry}?",
            ],
            PromptCategory::Feature => &[
                "What features does {brand} offer?",
                "Does {brand} support {benefit}?",
            ],
            PromptCategory::Review => &[
                "What do customers say about {brand}?",
                "Is {brand} worth it for {audience}?",
            ],
            PromptCategory::Industry => &[
                "Who are the leading companies in {industry}?",
                "What trends are shaping {industry} this year?",
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: String,
    pub text: String,
    pub category: PromptCategory,
    pub brand_id: String,
    pub brand_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptGenerationOptions {
    pub prompts_per_brand: usize,
    /// Empty means every category.
    #[serde(default)]
    pub categories: Vec<PromptCategory>,
}

impl Default for PromptGenerationOptions {
    fn default() -> Self {
        Self {
            prompts_per_brand: 10,
            categories: Vec::new(),
        }
    }
}
