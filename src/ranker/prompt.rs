//! Ranking prompt construction.
//!
//! The scoring rubric adapts to the candidate mix: when most candidates come
//! from indices without citation data (preprint servers, mainly), the
//! citation-impact weight would only punish them for missing metadata, so it
//! is folded back into relevance and quality instead.

use crate::models::{Paper, RankingMode};

/// Relative rubric weights, in percent
struct RubricWeights {
    relevance: u8,
    quality: u8,
    novelty: u8,
    impact: u8,
}

/// Standard rubric for citation-rich candidate sets
const BALANCED: RubricWeights = RubricWeights {
    relevance: 45,
    quality: 30,
    novelty: 15,
    impact: 10,
};

/// Rubric when citation data is mostly absent: impact weight redistributed
const CITATION_SPARSE: RubricWeights = RubricWeights {
    relevance: 50,
    quality: 35,
    novelty: 15,
    impact: 0,
};

fn weights_for(papers: &[Paper], mode: RankingMode) -> RubricWeights {
    if mode == RankingMode::Citations {
        return RubricWeights {
            relevance: 25,
            quality: 15,
            novelty: 0,
            impact: 60,
        };
    }

    let without_citations = papers.iter().filter(|p| p.citations.is_none()).count();
    if without_citations * 2 > papers.len() {
        CITATION_SPARSE
    } else {
        BALANCED
    }
}

/// Render one candidate as a numbered prompt line.
fn candidate_line(index: usize, paper: &Paper) -> String {
    let mut line = format!("{}. \"{}\"", index + 1, paper.title);
    if !paper.authors.is_empty() {
        let shown: Vec<&str> = paper.authors.iter().take(3).map(String::as_str).collect();
        line.push_str(&format!(" by {}", shown.join(", ")));
        if paper.authors.len() > 3 {
            line.push_str(" et al.");
        }
    }
    if let Some(year) = paper.year {
        line.push_str(&format!(" ({})", year));
    }
    if let Some(citations) = paper.citations {
        line.push_str(&format!(", {} citations", citations));
    }
    if let Some(text) = paper.r#abstract.as_deref() {
        let snippet: String = text.chars().take(300).collect();
        line.push_str(&format!("\n   Abstract: {}", snippet));
    }
    line
}

/// Build the full ranking prompt for a query and candidate set.
pub fn build_prompt(query: &str, papers: &[Paper], limit: usize, mode: RankingMode) -> String {
    let weights = weights_for(papers, mode);

    let candidates = papers
        .iter()
        .enumerate()
        .map(|(i, p)| candidate_line(i, p))
        .collect::<Vec<_>>()
        .join("\n");

    let impact_rule = if weights.impact == 0 {
        "Ignore citation counts entirely; most of these papers come from \
         sources that do not report them."
            .to_string()
    } else {
        format!(
            "- Citation impact ({}%): established influence in the field",
            weights.impact
        )
    };

    format!(
        "You are an expert research librarian. Rank the following papers for \
         the query \"{query}\".\n\n\
         Score each paper using this rubric:\n\
         - Relevance ({relevance}%): how directly the paper addresses the query\n\
         - Quality ({quality}%): rigor and completeness judging from title and abstract\n\
         - Novelty ({novelty}%): new methods or findings over incremental work\n\
         {impact_rule}\n\n\
         Papers:\n{candidates}\n\n\
         Return ONLY a JSON array of the top {limit} papers, best first. Each \
         element must be an object with keys \"title\" (copied exactly from \
         the list), \"relevance_score\" (integer 0-100), and \"explanation\" \
         (one sentence). Do not invent papers that are not in the list.",
        query = query,
        relevance = weights.relevance,
        quality = weights.quality,
        novelty = weights.novelty,
        impact_rule = impact_rule,
        candidates = candidates,
        limit = limit,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaperBuilder, SourceType};

    fn cited(title: &str) -> Paper {
        PaperBuilder::new(title, SourceType::SemanticScholar)
            .citations(100)
            .build()
    }

    fn uncited(title: &str) -> Paper {
        PaperBuilder::new(title, SourceType::Arxiv).build()
    }

    #[test]
    fn test_balanced_rubric_for_cited_candidates() {
        let papers = vec![cited("Paper A"), cited("Paper B"), uncited("Paper C")];
        let prompt = build_prompt("q", &papers, 5, RankingMode::Ai);
        assert!(prompt.contains("Relevance (45%)"));
        assert!(prompt.contains("Citation impact (10%)"));
    }

    #[test]
    fn test_sparse_rubric_redistributes_impact() {
        let papers = vec![uncited("Paper A"), uncited("Paper B"), cited("Paper C")];
        let prompt = build_prompt("q", &papers, 5, RankingMode::Ai);
        assert!(prompt.contains("Relevance (50%)"));
        assert!(prompt.contains("Ignore citation counts"));
    }

    #[test]
    fn test_citations_mode_weighs_impact_heavily() {
        let papers = vec![cited("Paper A")];
        let prompt = build_prompt("q", &papers, 5, RankingMode::Citations);
        assert!(prompt.contains("Citation impact (60%)"));
    }

    #[test]
    fn test_prompt_lists_candidates_with_metadata() {
        let paper = PaperBuilder::new("Deep Residual Learning", SourceType::SemanticScholar)
            .authors(vec!["K. He".into(), "X. Zhang".into()])
            .year(2016)
            .citations(150000)
            .abstract_text("Deeper neural networks are more difficult to train.")
            .build();

        let prompt = build_prompt("image recognition", &[paper], 3, RankingMode::Ai);
        assert!(prompt.contains("1. \"Deep Residual Learning\""));
        assert!(prompt.contains("K. He, X. Zhang"));
        assert!(prompt.contains("(2016)"));
        assert!(prompt.contains("150000 citations"));
        assert!(prompt.contains("top 3"));
    }

    #[test]
    fn test_long_author_lists_abbreviated() {
        let paper = PaperBuilder::new("Many Authors", SourceType::CrossRef)
            .authors((0..6).map(|i| format!("Author {}", i)).collect())
            .build();
        let prompt = build_prompt("q", &[paper], 1, RankingMode::Ai);
        assert!(prompt.contains("et al."));
        assert!(!prompt.contains("Author 4"));
    }
}
