//! Configuration management.
//!
//! All dedup/scoring thresholds and ranking weights are configuration rather
//! than hard-coded constants. Values can be overridden from a config file or
//! `AI_SCHOLAR_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tunable pipeline constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Hard ceiling on the limit passed to any single provider
    #[serde(default = "default_per_provider_cap")]
    pub per_provider_cap: usize,

    /// Floor for the citations-mode target total
    #[serde(default = "default_citation_target_floor")]
    pub citation_target_floor: usize,

    /// Minimum combined score a paper needs to survive the pre-filter
    #[serde(default = "default_min_filter_score")]
    pub min_filter_score: f64,

    /// Maximum candidates handed to the AI ranking engine
    #[serde(default = "default_ai_input_capacity")]
    pub ai_input_capacity: usize,

    /// Jaro-Winkler similarity threshold for title-based deduplication
    #[serde(default = "default_title_similarity_threshold")]
    pub title_similarity_threshold: f64,

    /// Relevance weight in the composite pre-rank score
    #[serde(default = "default_composite_relevance_weight")]
    pub composite_relevance_weight: f64,

    /// Quality weight in the composite pre-rank score
    #[serde(default = "default_composite_quality_weight")]
    pub composite_quality_weight: f64,

    /// Log-scaled citation impact weight in the composite pre-rank score
    #[serde(default = "default_composite_impact_weight")]
    pub composite_impact_weight: f64,

    /// Per-provider call timeout in seconds
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,

    /// AI ranking call timeout in seconds (deliberately longer than the
    /// provider budget)
    #[serde(default = "default_ranker_timeout_secs")]
    pub ranker_timeout_secs: u64,

    /// Delay before the single AI retry
    #[serde(default = "default_ranker_retry_delay_secs")]
    pub ranker_retry_delay_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            per_provider_cap: default_per_provider_cap(),
            citation_target_floor: default_citation_target_floor(),
            min_filter_score: default_min_filter_score(),
            ai_input_capacity: default_ai_input_capacity(),
            title_similarity_threshold: default_title_similarity_threshold(),
            composite_relevance_weight: default_composite_relevance_weight(),
            composite_quality_weight: default_composite_quality_weight(),
            composite_impact_weight: default_composite_impact_weight(),
            provider_timeout_secs: default_provider_timeout_secs(),
            ranker_timeout_secs: default_ranker_timeout_secs(),
            ranker_retry_delay_secs: default_ranker_retry_delay_secs(),
        }
    }
}

impl PipelineConfig {
    /// Per-provider call timeout
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    /// AI ranking call timeout
    pub fn ranker_timeout(&self) -> Duration {
        Duration::from_secs(self.ranker_timeout_secs)
    }

    /// Delay before the single AI retry
    pub fn ranker_retry_delay(&self) -> Duration {
        Duration::from_secs(self.ranker_retry_delay_secs)
    }
}

fn default_per_provider_cap() -> usize {
    100
}

fn default_citation_target_floor() -> usize {
    500
}

fn default_min_filter_score() -> f64 {
    0.3
}

fn default_ai_input_capacity() -> usize {
    200
}

fn default_title_similarity_threshold() -> f64 {
    0.9
}

fn default_composite_relevance_weight() -> f64 {
    0.5
}

fn default_composite_quality_weight() -> f64 {
    0.3
}

fn default_composite_impact_weight() -> f64 {
    0.2
}

fn default_provider_timeout_secs() -> u64 {
    15
}

fn default_ranker_timeout_secs() -> u64 {
    45
}

fn default_ranker_retry_delay_secs() -> u64 {
    2
}

/// Credentials and model selection for the OpenRouter-backed ranker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankerConfig {
    /// OpenRouter API key
    #[serde(default)]
    pub api_key: Option<String>,

    /// Chat completions endpoint
    #[serde(default = "default_ranker_api_url")]
    pub api_url: String,

    /// Model identifier
    #[serde(default = "default_ranker_model")]
    pub model: String,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("OPENROUTER_API_KEY").ok(),
            api_url: default_ranker_api_url(),
            model: default_ranker_model(),
        }
    }
}

fn default_ranker_api_url() -> String {
    "https://openrouter.ai/api/v1/chat/completions".to_string()
}

fn default_ranker_model() -> String {
    "deepseek/deepseek-r1:free".to_string()
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub ranker: RankerConfig,
}

/// Load configuration from a file, layered under `AI_SCHOLAR_*` environment
/// variables.
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix("AI_SCHOLAR").separator("__"))
        .build()?;

    settings.try_deserialize()
}
