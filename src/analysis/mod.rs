//! Personality analysis of free text.
//!
//! Provides the `PersonalityAnalyzer` trait and the profile model returned by
//! the analysis service. The profile is a three-part result:
//!
//! ```text
//! personality: [trait group { children: [facet { trait_id, percentile }] }]
//! needs:       [need { name, percentile }]
//! consumption_preferences:
//!              [category { consumption_preferences: [{ id, score }] }]
//! ```

pub mod watson;

pub use watson::WatsonPersonalityInsights;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::AnalysisError;

/// A scored node of the personality model: a trait group, a facet, a need, or
/// a value. Percentiles range from 0.0 to 1.0 on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Trait {
    pub trait_id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub percentile: f64,
    #[serde(default)]
    pub raw_score: Option<f64>,
    #[serde(default)]
    pub significant: Option<bool>,
    /// Facets of a trait group. Empty for facets, needs and values.
    #[serde(default)]
    pub children: Vec<Trait>,
}

/// A single like/dislike signal.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConsumptionPreference {
    pub consumption_preference_id: String,
    #[serde(default)]
    pub name: String,
    /// 0.0 = unlikely, 0.5 = neutral, 1.0 = likely.
    pub score: f64,
}

/// A group of related consumption preferences (shopping, movies, music, ...).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConsumptionPreferenceCategory {
    pub consumption_preference_category_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub consumption_preferences: Vec<ConsumptionPreference>,
}

/// Non-fatal diagnostic attached to a profile (e.g. too few words).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisWarning {
    pub warning_id: String,
    pub message: String,
}

/// Profile returned by the analysis service.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub processed_language: String,
    #[serde(default)]
    pub word_count: u64,
    #[serde(default)]
    pub personality: Vec<Trait>,
    #[serde(default)]
    pub needs: Vec<Trait>,
    #[serde(default)]
    pub values: Vec<Trait>,
    #[serde(default)]
    pub consumption_preferences: Vec<ConsumptionPreferenceCategory>,
    #[serde(default)]
    pub warnings: Vec<AnalysisWarning>,
}

impl AnalysisResult {
    /// All facets across all trait groups, in encounter order.
    pub fn facets(&self) -> impl Iterator<Item = &Trait> {
        self.personality.iter().flat_map(|group| group.children.iter())
    }

    /// All consumption preferences across all categories, in encounter order.
    pub fn preferences(&self) -> impl Iterator<Item = &ConsumptionPreference> {
        self.consumption_preferences
            .iter()
            .flat_map(|category| category.consumption_preferences.iter())
    }
}

/// Trait for personality-analysis services.
#[async_trait]
pub trait PersonalityAnalyzer: Send + Sync {
    /// Service name (e.g., "watson").
    fn name(&self) -> &str;

    /// Analyze an unstructured plain-text document.
    async fn analyze(&self, document: &str) -> Result<AnalysisResult, AnalysisError>;
}
