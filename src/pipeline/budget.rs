//! Mode-aware provider budget allocation.
//!
//! Decides which providers participate in a request and how many results each
//! is asked for. Citations mode over-fetches from citation-rich indices so the
//! ranked head of the list is dense with cited work; other modes hand every
//! provider the caller's per-provider limit.

use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::models::RankingMode;
use crate::sources::Provider;

/// A provider selected for a request together with its fetch limit
#[derive(Clone)]
pub struct ProviderBudget {
    pub provider: Arc<dyn Provider>,
    pub limit: usize,
}

/// Assign fetch limits to the requested providers.
///
/// In citations mode, providers without citation data are excluded entirely
/// and the remaining budgets are scaled by each provider's citation weight,
/// bounded by the per-provider cap. In ai/default mode the caller's
/// per-provider limit is passed through unmodified; adapters clamp to their
/// own API maxima.
pub fn allocate(
    mode: RankingMode,
    providers: &[Arc<dyn Provider>],
    per_provider_limit: usize,
    final_limit: usize,
    config: &PipelineConfig,
) -> Vec<ProviderBudget> {
    match mode {
        RankingMode::Citations => allocate_for_citations(providers, final_limit, config),
        RankingMode::Ai | RankingMode::Default => providers
            .iter()
            .map(|provider| ProviderBudget {
                provider: Arc::clone(provider),
                limit: per_provider_limit,
            })
            .collect(),
    }
}

fn allocate_for_citations(
    providers: &[Arc<dyn Provider>],
    final_limit: usize,
    config: &PipelineConfig,
) -> Vec<ProviderBudget> {
    let eligible: Vec<&Arc<dyn Provider>> = providers
        .iter()
        .filter(|p| p.supports_citations())
        .collect();
    if eligible.is_empty() {
        return Vec::new();
    }

    // Over-fetch so the post-dedup pool is deep enough to rank by citations.
    let target_total = (final_limit * 10).max(config.citation_target_floor);
    let base = (target_total / eligible.len()).min(config.per_provider_cap);

    eligible
        .into_iter()
        .map(|provider| {
            let scaled = (base as f64 * provider.citation_weight()) as usize;
            ProviderBudget {
                provider: Arc::clone(provider),
                limit: scaled.min(config.per_provider_cap).max(1),
            }
        })
        .collect()
}
