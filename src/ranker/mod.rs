//! AI ranking engine abstraction.
//!
//! The pipeline talks to the ranker through the [`AiRanker`] trait; the
//! production implementation calls OpenRouter. The ranker returns an ordered
//! list of titles with rationales, which the pipeline merges back onto full
//! records. Every ranker failure is recoverable: the pipeline falls back to
//! heuristic ordering.

mod openrouter;
pub mod mock;
mod prompt;

pub use mock::MockRanker;
pub use openrouter::OpenRouterRanker;
pub use prompt::build_prompt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Paper, RankingMode};

/// One entry of the ranker's ordered output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedEntry {
    /// Title identifying the candidate, possibly abbreviated by the model
    pub title: String,

    /// Model-assigned relevance in [0, 100]
    #[serde(default)]
    pub relevance_score: Option<u8>,

    /// One-sentence rationale for the placement
    #[serde(default)]
    pub explanation: Option<String>,
}

/// Errors from the AI ranking engine. All of them are recoverable by
/// falling back to heuristic ordering.
#[derive(Debug, Error)]
pub enum RankerError {
    #[error("AI ranking timed out")]
    Timeout,

    #[error("AI ranking API error: {0}")]
    Api(String),

    #[error("Could not parse AI ranking response: {0}")]
    Parse(String),

    #[error("AI ranking is not configured")]
    Unavailable,
}

/// A ranking engine that orders candidate papers for a query.
#[async_trait]
pub trait AiRanker: Send + Sync {
    /// Rank `papers` against `query`, returning at most `limit` entries in
    /// descending order of relevance.
    async fn rank(
        &self,
        query: &str,
        papers: &[Paper],
        limit: usize,
        mode: RankingMode,
    ) -> Result<Vec<RankedEntry>, RankerError>;
}
