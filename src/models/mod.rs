//! Core data structures shared across the pipeline.

mod paper;
mod search;

pub use paper::{Paper, PaperBuilder, SourceType};
pub use search::{
    AggregationStats, FailureKind, ProviderFailure, ProviderStats, RankingMode, RankingPath,
    SearchRequest, SearchResult, ValidationError,
};
