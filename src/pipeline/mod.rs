//! The aggregation, deduplication and ranking pipeline.
//!
//! A request fans out to the selected providers concurrently, each under its
//! own timeout; failures are recorded per provider and never abort the
//! request. The merged pool is deduplicated, quality-filtered, pre-ranked to
//! a bounded candidate set, and finally ordered by the AI ranking engine or
//! a heuristic fallback.

pub mod budget;
pub mod dedup;
pub mod ranking;
pub mod scoring;

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::models::{
    AggregationStats, Paper, ProviderFailure, ProviderStats, RankingMode, RankingPath,
    SearchRequest, SearchResult, ValidationError,
};
use crate::ranker::{AiRanker, RankerError};
use crate::sources::{ProviderCapabilities, ProviderError, ProviderRegistry};

/// Errors that reject a request before any provider is called
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),
}

/// The aggregation pipeline. Owns the provider registry and, when
/// configured, an AI ranking engine.
pub struct Pipeline {
    registry: ProviderRegistry,
    ranker: Option<Arc<dyn AiRanker>>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(registry: ProviderRegistry, config: PipelineConfig) -> Self {
        Self {
            registry,
            ranker: None,
            config,
        }
    }

    /// Attach an AI ranking engine. Without one, every mode ranks
    /// heuristically.
    pub fn with_ranker(mut self, ranker: Arc<dyn AiRanker>) -> Self {
        self.ranker = Some(ranker);
        self
    }

    /// Execute a search request end to end.
    ///
    /// Returns `Err` only for malformed requests; provider and ranker
    /// failures degrade the result instead of failing it. An empty result
    /// with populated stats is a normal outcome.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResult, PipelineError> {
        request.validate()?;

        let providers: Vec<Arc<dyn crate::sources::Provider>> = request
            .providers
            .iter()
            .map(|id| {
                self.registry
                    .get(id)
                    .cloned()
                    .ok_or_else(|| PipelineError::UnknownProvider(id.clone()))
            })
            .collect::<Result<_, _>>()?;

        let started = Instant::now();
        let mut stats = AggregationStats::default();

        let budgets = budget::allocate(
            request.ranking_mode,
            &providers,
            request.per_provider_limit,
            request.final_limit,
            &self.config,
        );
        if budgets.is_empty() {
            debug!(mode = %request.ranking_mode, "no eligible providers for request");
            stats.elapsed_ms = started.elapsed().as_millis() as u64;
            return Ok(SearchResult::empty(
                &request.query,
                request.ranking_mode,
                stats,
            ));
        }

        let collected = self.fan_out(&request.query, request.year_range, budgets, &mut stats).await;
        stats.total_collected = collected.len();

        let deduped = dedup::deduplicate(&collected, self.config.title_similarity_threshold);
        stats.after_dedup = deduped.len();

        let filtered = scoring::pre_filter(&request.query, deduped, self.config.min_filter_score);
        stats.after_filter = filtered.len();
        for (id, provider_stats) in stats.providers.iter_mut() {
            provider_stats.after_filter =
                filtered.iter().filter(|p| p.source.id() == id).count();
        }

        if filtered.is_empty() {
            stats.elapsed_ms = started.elapsed().as_millis() as u64;
            return Ok(SearchResult::empty(
                &request.query,
                request.ranking_mode,
                stats,
            ));
        }

        let (candidates, trimmed) = scoring::pre_rank(
            &request.query,
            filtered,
            self.config.ai_input_capacity,
            &self.config,
        );
        stats.pre_ranking_applied = trimmed;
        stats.sent_to_ranker = candidates.len();

        let (papers, path) = self
            .rank(&request.query, candidates, request.final_limit, request.ranking_mode)
            .await;
        stats.ranking_path = Some(path);
        stats.elapsed_ms = started.elapsed().as_millis() as u64;

        debug!(
            query = %request.query,
            total = stats.total_collected,
            after_dedup = stats.after_dedup,
            after_filter = stats.after_filter,
            returned = papers.len(),
            path = ?path,
            "pipeline finished"
        );

        Ok(SearchResult {
            papers,
            query: request.query.clone(),
            ranking_mode: request.ranking_mode,
            aggregation_stats: stats,
        })
    }

    /// Query all budgeted providers concurrently, each under its own timeout.
    async fn fan_out(
        &self,
        query: &str,
        year_range: Option<(i32, i32)>,
        budgets: Vec<budget::ProviderBudget>,
        stats: &mut AggregationStats,
    ) -> Vec<Paper> {
        let timeout = self.config.provider_timeout();
        let mut tasks = JoinSet::new();
        for entry in budgets {
            let query = query.to_string();
            // Providers with native year filtering are trusted; everything
            // else gets the range enforced here. Records with an unknown
            // year are kept.
            let enforce_year = year_range.filter(|_| {
                !entry
                    .provider
                    .capabilities()
                    .contains(ProviderCapabilities::YEAR_FILTER)
            });
            tasks.spawn(async move {
                let id = entry.provider.id().to_string();
                let outcome =
                    match tokio::time::timeout(timeout, entry.provider.search(&query, entry.limit, year_range))
                        .await
                    {
                        Ok(result) => result,
                        Err(_) => Err(ProviderError::Timeout),
                    };
                let outcome = outcome.map(|papers| {
                    let raw_count = papers.len();
                    let papers = match enforce_year {
                        Some((min, max)) => papers
                            .into_iter()
                            .filter(|p| p.year.map_or(true, |y| (min..=max).contains(&y)))
                            .collect(),
                        None => papers,
                    };
                    (raw_count, papers)
                });
                (id, outcome)
            });
        }

        let mut collected = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let Ok((id, outcome)) = joined else {
                // A panicked provider task is recorded as nothing; the
                // request continues with the rest.
                warn!("provider task panicked");
                continue;
            };
            match outcome {
                Ok((raw_count, papers)) => {
                    debug!(provider = %id, count = papers.len(), "provider returned");
                    stats.providers.insert(
                        id,
                        ProviderStats {
                            raw_count,
                            ..Default::default()
                        },
                    );
                    collected.extend(papers);
                }
                Err(err) => {
                    warn!(provider = %id, error = %err, "provider failed");
                    stats.providers.insert(
                        id,
                        ProviderStats {
                            failure: Some(ProviderFailure {
                                kind: err.kind(),
                                message: err.to_string(),
                            }),
                            ..Default::default()
                        },
                    );
                }
            }
        }
        collected
    }

    /// Produce the final ordering for the candidate set.
    ///
    /// Default mode is purely heuristic. Ai and citations modes try the AI
    /// engine (one retry after a short delay), falling back to the
    /// mode-appropriate heuristic on any failure.
    async fn rank(
        &self,
        query: &str,
        candidates: Vec<Paper>,
        limit: usize,
        mode: RankingMode,
    ) -> (Vec<Paper>, RankingPath) {
        if mode == RankingMode::Default {
            return (
                ranking::rank_by_composite(query, candidates, limit, &self.config),
                RankingPath::HeuristicFallback,
            );
        }

        if let Some(ranker) = &self.ranker {
            match self.rank_with_retry(ranker, query, &candidates, limit, mode).await {
                Ok(entries) if !entries.is_empty() => {
                    let merged = ranking::merge_ranked_with_details(&entries, candidates.clone(), limit);
                    if !merged.is_empty() {
                        return (merged, RankingPath::AiRanked);
                    }
                    warn!("AI ranking matched no candidates, falling back");
                }
                Ok(_) => warn!("AI ranking returned no entries, falling back"),
                Err(err) => warn!(error = %err, "AI ranking failed, falling back"),
            }
        }

        let fallback = match mode {
            RankingMode::Citations => ranking::rank_by_citations(candidates, limit),
            _ => ranking::rank_by_composite(query, candidates, limit, &self.config),
        };
        (fallback, RankingPath::HeuristicFallback)
    }

    async fn rank_with_retry(
        &self,
        ranker: &Arc<dyn AiRanker>,
        query: &str,
        candidates: &[Paper],
        limit: usize,
        mode: RankingMode,
    ) -> Result<Vec<crate::ranker::RankedEntry>, RankerError> {
        let timeout = self.config.ranker_timeout();
        let attempt = || async {
            match tokio::time::timeout(timeout, ranker.rank(query, candidates, limit, mode)).await
            {
                Ok(result) => result,
                Err(_) => Err(RankerError::Timeout),
            }
        };

        match attempt().await {
            Ok(entries) => Ok(entries),
            Err(err) => {
                warn!(error = %err, "AI ranking attempt failed, retrying once");
                tokio::time::sleep(self.config.ranker_retry_delay()).await;
                attempt().await
            }
        }
    }
}
