//! Heuristic scoring, quality pre-filter, and the composite pre-ranker.
//!
//! These cheap lexical scores keep the expensive AI ranking stage fed with a
//! bounded, plausible candidate set; they also double as the fallback ordering
//! when the AI path is unavailable.

use chrono::Datelike;

use crate::config::PipelineConfig;
use crate::models::Paper;

/// Weight of title term matches in the relevance score
const TITLE_TERM_WEIGHT: f64 = 0.6;
/// Weight of abstract term matches in the relevance score
const ABSTRACT_TERM_WEIGHT: f64 = 0.4;
/// Bonus when the full query appears verbatim in the title
const TITLE_PHRASE_BONUS: f64 = 0.3;
/// Bonus when the full query appears verbatim in the abstract
const ABSTRACT_PHRASE_BONUS: f64 = 0.2;

/// Titles shorter than this are treated as junk records
const MIN_TITLE_LEN: usize = 10;

/// Relevance weight in the pre-filter combined score
const FILTER_RELEVANCE_WEIGHT: f64 = 0.7;
/// Quality weight in the pre-filter combined score
const FILTER_QUALITY_WEIGHT: f64 = 0.3;

/// Lexical overlap between the query and a paper's title/abstract, in [0, 1].
///
/// Term matches in the title dominate; a verbatim phrase match earns a bonus
/// on top.
pub fn relevance_score(query: &str, paper: &Paper) -> f64 {
    let query_lower = query.to_lowercase();
    let terms: Vec<&str> = query_lower.split_whitespace().collect();
    if terms.is_empty() {
        return 0.0;
    }

    let title = paper.title.to_lowercase();
    let abstract_text = paper
        .r#abstract
        .as_deref()
        .map(str::to_lowercase)
        .unwrap_or_default();

    let title_hits = terms.iter().filter(|t| title.contains(**t)).count();
    let abstract_hits = terms.iter().filter(|t| abstract_text.contains(**t)).count();

    let mut score = TITLE_TERM_WEIGHT * title_hits as f64 / terms.len() as f64
        + ABSTRACT_TERM_WEIGHT * abstract_hits as f64 / terms.len() as f64;

    if terms.len() > 1 {
        if title.contains(&query_lower) {
            score += TITLE_PHRASE_BONUS;
        } else if abstract_text.contains(&query_lower) {
            score += ABSTRACT_PHRASE_BONUS;
        }
    }

    score.min(1.0)
}

/// Metadata richness of a record, in [0, 1], independent of the query.
pub fn quality_score(paper: &Paper) -> f64 {
    let mut score: f64 = 0.0;

    if paper.doi.as_deref().is_some_and(|d| !d.is_empty()) {
        score += 0.3;
    }
    if paper.url.as_deref().is_some_and(|u| !u.is_empty()) {
        score += 0.2;
    }

    match paper.abstract_len() {
        len if len > 100 => score += 0.3,
        len if len > 50 => score += 0.2,
        _ => {}
    }

    match paper.citations {
        Some(count) if count > 100 => score += 0.2,
        Some(count) if count > 10 => score += 0.1,
        _ => {}
    }

    if let Some(year) = paper.year {
        if chrono::Utc::now().year() - year <= 10 {
            score += 0.1;
        }
    }

    score.min(1.0)
}

/// Drop records too thin or too off-topic to be worth ranking.
///
/// A paper survives when its title is long enough and its combined
/// relevance/quality score is at least `min_score`; only papers below the
/// minimum are dropped. Relative order is preserved.
pub fn pre_filter(query: &str, papers: Vec<Paper>, min_score: f64) -> Vec<Paper> {
    papers
        .into_iter()
        .filter(|paper| {
            if paper.title.trim().len() < MIN_TITLE_LEN {
                return false;
            }
            let combined = FILTER_RELEVANCE_WEIGHT * relevance_score(query, paper)
                + FILTER_QUALITY_WEIGHT * quality_score(paper);
            combined >= min_score
        })
        .collect()
}

/// Composite score combining relevance, quality, and log-scaled citation
/// impact under the configured weights. Also the heuristic-fallback
/// ordering key.
pub fn composite_score(query: &str, paper: &Paper, config: &PipelineConfig) -> f64 {
    let impact = match paper.citations {
        Some(count) => (((count as f64) + 1.0).log10() / 3.0).min(1.0),
        None => 0.0,
    };
    config.composite_relevance_weight * relevance_score(query, paper)
        + config.composite_quality_weight * quality_score(paper)
        + config.composite_impact_weight * impact
}

/// Sort candidates by composite score and trim to `capacity`.
///
/// Returns the (possibly trimmed) candidates plus whether trimming happened;
/// every surviving paper carries its score in `raw_score`.
pub fn pre_rank(
    query: &str,
    mut papers: Vec<Paper>,
    capacity: usize,
    config: &PipelineConfig,
) -> (Vec<Paper>, bool) {
    for paper in &mut papers {
        paper.raw_score = composite_score(query, paper, config);
    }
    papers.sort_by(|a, b| {
        b.raw_score
            .partial_cmp(&a.raw_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let trimmed = papers.len() > capacity;
    papers.truncate(capacity);
    (papers, trimmed)
}
