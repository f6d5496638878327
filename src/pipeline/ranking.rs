//! Final ordering strategies.
//!
//! The AI ranker returns titles and rationales, not full records; this module
//! merges those back onto the candidate papers, and supplies the heuristic
//! orderings used when the AI path is skipped or fails.

use crate::config::PipelineConfig;
use crate::models::Paper;
use crate::pipeline::dedup::normalize_title;
use crate::pipeline::scoring;
use crate::ranker::RankedEntry;

/// Order by citation count descending; papers without citation data follow,
/// newest first. Used in citations mode when the AI path is unavailable.
pub fn rank_by_citations(papers: Vec<Paper>, limit: usize) -> Vec<Paper> {
    let (mut cited, mut uncited): (Vec<Paper>, Vec<Paper>) =
        papers.into_iter().partition(|p| p.citations.is_some());

    cited.sort_by(|a, b| b.citations.cmp(&a.citations));
    uncited.sort_by(|a, b| b.year.cmp(&a.year));

    cited.extend(uncited);
    cited.truncate(limit);
    cited
}

/// Order by the composite heuristic score. Used in default mode and as the
/// AI fallback for ai mode.
pub fn rank_by_composite(
    query: &str,
    papers: Vec<Paper>,
    limit: usize,
    config: &PipelineConfig,
) -> Vec<Paper> {
    let (mut ranked, _) = scoring::pre_rank(query, papers, usize::MAX, config);
    ranked.truncate(limit);
    ranked
}

/// Merge the AI ranker's ordered entries back onto the full candidate
/// records.
///
/// Entries are matched by normalized title, tolerating containment in either
/// direction since the model may abbreviate or expand titles. Each candidate
/// is consumed at most once; entries matching nothing are dropped, and
/// candidates the model skipped do not reappear.
pub fn merge_ranked_with_details(
    entries: &[RankedEntry],
    candidates: Vec<Paper>,
    limit: usize,
) -> Vec<Paper> {
    let normalized: Vec<String> = candidates
        .iter()
        .map(|p| normalize_title(&p.title))
        .collect();
    let mut pool: Vec<Option<Paper>> = candidates.into_iter().map(Some).collect();

    let mut merged = Vec::with_capacity(limit.min(entries.len()));
    for entry in entries {
        if merged.len() >= limit {
            break;
        }
        let wanted = normalize_title(&entry.title);
        if wanted.is_empty() {
            continue;
        }

        let found = (0..pool.len()).find(|&i| {
            pool[i].is_some()
                && (normalized[i] == wanted
                    || normalized[i].contains(&wanted)
                    || wanted.contains(&normalized[i]))
        });
        if let Some(i) = found {
            if let Some(mut paper) = pool[i].take() {
                paper.explanation = entry.explanation.clone();
                merged.push(paper);
            }
        }
    }
    merged
}
