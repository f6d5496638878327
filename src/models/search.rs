//! Search request and result models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::Paper;

/// Strategy selector controlling provider selection and final ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingMode {
    Ai,
    Citations,
    Default,
}

impl std::fmt::Display for RankingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RankingMode::Ai => "ai",
            RankingMode::Citations => "citations",
            RankingMode::Default => "default",
        };
        write!(f, "{}", s)
    }
}

/// Which ranking path produced the final ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankingPath {
    #[serde(rename = "ai-ranked")]
    AiRanked,
    #[serde(rename = "heuristic-fallback")]
    HeuristicFallback,
}

/// Errors raised during SearchRequest validation, before any provider call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Query cannot be empty")]
    EmptyQuery,

    #[error("At least one provider must be requested")]
    NoProviders,

    #[error("Per-provider limit must be positive")]
    ZeroProviderLimit,

    #[error("Final result limit must be positive")]
    ZeroFinalLimit,

    #[error("Year range is inverted: {min} > {max}")]
    InvertedYearRange { min: i32, max: i32 },
}

/// A validated search request consumed from the web/controller layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Main search query string
    pub query: String,

    /// Provider ids to query
    pub providers: Vec<String>,

    /// Maximum results requested from each provider (a ceiling, not a
    /// guarantee)
    pub per_provider_limit: usize,

    /// Maximum length of the final ranked list
    pub final_limit: usize,

    /// Ranking strategy
    pub ranking_mode: RankingMode,

    /// Inclusive publication year range
    pub year_range: Option<(i32, i32)>,
}

impl SearchRequest {
    /// Create a request with the standard defaults
    pub fn new(query: impl Into<String>, providers: Vec<String>) -> Self {
        Self {
            query: query.into(),
            providers,
            per_provider_limit: 50,
            final_limit: 10,
            ranking_mode: RankingMode::Ai,
            year_range: None,
        }
    }

    /// Set per-provider limit
    pub fn per_provider_limit(mut self, limit: usize) -> Self {
        self.per_provider_limit = limit;
        self
    }

    /// Set final result limit
    pub fn final_limit(mut self, limit: usize) -> Self {
        self.final_limit = limit;
        self
    }

    /// Set ranking mode
    pub fn ranking_mode(mut self, mode: RankingMode) -> Self {
        self.ranking_mode = mode;
        self
    }

    /// Set inclusive year range
    pub fn year_range(mut self, min: i32, max: i32) -> Self {
        self.year_range = Some((min, max));
        self
    }

    /// Reject malformed requests before any provider is called
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.query.trim().is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        if self.providers.is_empty() {
            return Err(ValidationError::NoProviders);
        }
        if self.per_provider_limit == 0 {
            return Err(ValidationError::ZeroProviderLimit);
        }
        if self.final_limit == 0 {
            return Err(ValidationError::ZeroFinalLimit);
        }
        if let Some((min, max)) = self.year_range {
            if min > max {
                return Err(ValidationError::InvertedYearRange { min, max });
            }
        }
        Ok(())
    }
}

/// Why a provider contributed no papers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Transient,
    Permanent,
}

/// A recorded provider failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderFailure {
    pub kind: FailureKind,
    pub message: String,
}

/// Per-provider counters attached to every result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderStats {
    /// Papers the provider returned before any filtering
    pub raw_count: usize,

    /// Papers attributed to this provider that survived the quality filter
    pub after_filter: usize,

    /// Failure, if the provider call did not succeed
    pub failure: Option<ProviderFailure>,
}

/// Diagnostic record of the aggregation pipeline, attached to every result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregationStats {
    /// Per-provider counters, keyed by provider id
    pub providers: BTreeMap<String, ProviderStats>,

    /// Papers collected across all providers before dedup
    pub total_collected: usize,

    /// Papers remaining after cross-provider deduplication
    pub after_dedup: usize,

    /// Papers remaining after the quality pre-filter
    pub after_filter: usize,

    /// Papers handed to the ranking stage
    pub sent_to_ranker: usize,

    /// Whether the composite pre-ranker had to trim the candidate set
    pub pre_ranking_applied: bool,

    /// Which ranking path produced the final ordering
    pub ranking_path: Option<RankingPath>,

    /// Wall-clock pipeline time in milliseconds
    pub elapsed_ms: u64,
}

impl AggregationStats {
    /// True when every requested provider failed
    pub fn all_providers_failed(&self) -> bool {
        !self.providers.is_empty() && self.providers.values().all(|s| s.failure.is_some())
    }
}

/// Final ranked result returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Ranked papers, at most `final_limit` entries
    pub papers: Vec<Paper>,

    /// Query that was executed
    pub query: String,

    /// Ranking mode that was requested
    pub ranking_mode: RankingMode,

    /// Pipeline diagnostics
    pub aggregation_stats: AggregationStats,
}

impl SearchResult {
    /// An empty result carrying only diagnostics, used when aggregation
    /// produced nothing. This is a normal outcome, not an error.
    pub fn empty(query: impl Into<String>, mode: RankingMode, stats: AggregationStats) -> Self {
        Self {
            papers: Vec::new(),
            query: query.into(),
            ranking_mode: mode,
            aggregation_stats: stats,
        }
    }
}
