//! Cross-provider deduplication.
//!
//! Collapses records describing the same underlying paper. A normalized DOI
//! match is authoritative; otherwise records match on normalized-title
//! similarity plus a non-conflicting publication year. Colliding records are
//! merged into a new record, keeping the most complete metadata; provider
//! responses are never mutated in place.

use std::collections::HashMap;
use strsim::jaro_winkler;

use crate::models::Paper;

/// Normalize a DOI for identity comparison: lowercase, strip the resolver
/// prefix and any whitespace.
pub fn normalize_doi(doi: &str) -> String {
    doi.trim()
        .to_lowercase()
        .trim_start_matches("https://doi.org/")
        .trim_start_matches("http://doi.org/")
        .trim_start_matches("doi:")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Normalize a title for comparison: case-fold, drop punctuation, collapse
/// whitespace.
pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether two records without a shared DOI describe the same paper.
fn titles_match(a: &Paper, b: &Paper, threshold: f64) -> bool {
    // A year present on both sides must agree exactly; a missing year is
    // non-conflicting.
    if let (Some(year_a), Some(year_b)) = (a.year, b.year) {
        if year_a != year_b {
            return false;
        }
    }

    let norm_a = normalize_title(&a.title);
    let norm_b = normalize_title(&b.title);
    if norm_a.is_empty() || norm_b.is_empty() {
        return false;
    }

    norm_a == norm_b || jaro_winkler(&norm_a, &norm_b) >= threshold
}

/// Whether two records describe the same paper.
fn are_duplicates(a: &Paper, b: &Paper, threshold: f64) -> bool {
    if let (Some(doi_a), Some(doi_b)) = (&a.doi, &b.doi) {
        let (norm_a, norm_b) = (normalize_doi(doi_a), normalize_doi(doi_b));
        if !norm_a.is_empty() && !norm_b.is_empty() {
            // Exact DOI match is authoritative in both directions.
            return norm_a == norm_b;
        }
    }

    titles_match(a, b, threshold)
}

/// Total order on metadata completeness used to pick the surviving record.
/// Deterministic regardless of input order: completeness priority first, then
/// abstract length, then source id as a final tie-break.
fn more_complete<'a>(a: &'a Paper, b: &'a Paper) -> &'a Paper {
    let key = |p: &Paper| (p.completeness(), p.abstract_len());
    match key(a).cmp(&key(b)) {
        std::cmp::Ordering::Greater => a,
        std::cmp::Ordering::Less => b,
        std::cmp::Ordering::Equal => {
            if a.source.id() <= b.source.id() {
                a
            } else {
                b
            }
        }
    }
}

/// Merge a group of duplicate records into one new record.
///
/// The most complete record wins and supplies the `source` attribution;
/// missing fields are adopted from the others. Citation counts from different
/// indices are not directly comparable, so when both sides carry one the
/// larger figure is kept as the more complete signal.
fn merge_group(group: &[&Paper]) -> Paper {
    let winner = group
        .iter()
        .copied()
        .reduce(|best, candidate| more_complete(best, candidate))
        .expect("merge group is never empty");

    let mut merged = winner.clone();
    for other in group.iter().filter(|p| !std::ptr::eq(**p, winner)) {
        if merged.doi.is_none() {
            merged.doi = other.doi.clone();
        }
        if merged.url.is_none() {
            merged.url = other.url.clone();
        }
        if merged.year.is_none() {
            merged.year = other.year;
        }
        if merged.r#abstract.is_none() {
            merged.r#abstract = other.r#abstract.clone();
        }
        if merged.authors.is_empty() {
            merged.authors = other.authors.clone();
        }
        merged.citations = match (merged.citations, other.citations) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }
    merged
}

/// Collapse duplicate records across providers into new merged records.
///
/// Single-pass, order-independent grouping: the merged set does not depend on
/// provider completion order, only the completeness-based merge policy decides
/// which duplicate wins. Idempotent on its own output.
pub fn deduplicate(papers: &[Paper], similarity_threshold: f64) -> Vec<Paper> {
    if papers.len() <= 1 {
        return papers.to_vec();
    }

    // Union-find over indices so that transitive matches land in one group.
    let mut parent: Vec<usize> = (0..papers.len()).collect();

    fn find(parent: &mut Vec<usize>, i: usize) -> usize {
        if parent[i] != i {
            let root = find(parent, parent[i]);
            parent[i] = root;
        }
        parent[i]
    }
    fn union(parent: &mut Vec<usize>, a: usize, b: usize) {
        let (ra, rb) = (find(parent, a), find(parent, b));
        if ra != rb {
            // Smaller root wins, keeping grouping order-independent.
            let (lo, hi) = (ra.min(rb), ra.max(rb));
            parent[hi] = lo;
        }
    }

    // DOI pass: hash join on normalized DOI.
    let mut by_doi: HashMap<String, usize> = HashMap::new();
    for (i, paper) in papers.iter().enumerate() {
        if let Some(doi) = &paper.doi {
            let key = normalize_doi(doi);
            if key.is_empty() {
                continue;
            }
            match by_doi.get(&key) {
                Some(&first) => union(&mut parent, first, i),
                None => {
                    by_doi.insert(key, i);
                }
            }
        }
    }

    // Title pass: pairwise similarity for records not already joined by DOI.
    for i in 0..papers.len() {
        for j in (i + 1)..papers.len() {
            if find(&mut parent, i) == find(&mut parent, j) {
                continue;
            }
            if are_duplicates(&papers[i], &papers[j], similarity_threshold) {
                union(&mut parent, i, j);
            }
        }
    }

    // Collect groups by root, preserving first-seen order for output
    // stability; the contents of each merged record do not depend on it.
    let mut groups: Vec<Vec<&Paper>> = Vec::new();
    let mut group_of_root: HashMap<usize, usize> = HashMap::new();
    for i in 0..papers.len() {
        let root = find(&mut parent, i);
        match group_of_root.get(&root) {
            Some(&g) => groups[g].push(&papers[i]),
            None => {
                group_of_root.insert(root, groups.len());
                groups.push(vec![&papers[i]]);
            }
        }
    }

    groups.iter().map(|group| merge_group(group)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaperBuilder, SourceType};

    const THRESHOLD: f64 = 0.9;

    #[test]
    fn test_normalize_doi() {
        assert_eq!(normalize_doi("10.1234/TEST"), "10.1234/test");
        assert_eq!(normalize_doi("https://doi.org/10.1234/test"), "10.1234/test");
        assert_eq!(normalize_doi("doi:10.1234/test"), "10.1234/test");
        assert_eq!(normalize_doi(" 10.1234/ test "), "10.1234/test");
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("Hello, World!"), "hello world");
        assert_eq!(normalize_title("Test:   A-B/C"), "test abc");
        assert_eq!(normalize_title("   "), "");
    }

    #[test]
    fn test_doi_match_collapses() {
        let papers = vec![
            PaperBuilder::new("GNNs for chemistry", SourceType::Arxiv)
                .doi("10.1234/X")
                .build(),
            PaperBuilder::new("Graph neural nets for chemistry", SourceType::CrossRef)
                .doi("https://doi.org/10.1234/x")
                .build(),
        ];
        assert_eq!(deduplicate(&papers, THRESHOLD).len(), 1);
    }

    #[test]
    fn test_doi_mismatch_short_circuits_title_check() {
        // Identical titles but distinct DOIs: DOI comparison is authoritative.
        let papers = vec![
            PaperBuilder::new("Same Title", SourceType::Arxiv)
                .doi("10.1/a")
                .build(),
            PaperBuilder::new("Same Title", SourceType::CrossRef)
                .doi("10.1/b")
                .build(),
        ];
        assert_eq!(deduplicate(&papers, THRESHOLD).len(), 2);
    }

    #[test]
    fn test_title_and_year_match() {
        let papers = vec![
            PaperBuilder::new("Attention Is All You Need", SourceType::Arxiv)
                .year(2017)
                .build(),
            PaperBuilder::new("Attention is all you need.", SourceType::SemanticScholar)
                .year(2017)
                .build(),
        ];
        assert_eq!(deduplicate(&papers, THRESHOLD).len(), 1);
    }

    #[test]
    fn test_conflicting_year_blocks_title_match() {
        let papers = vec![
            PaperBuilder::new("Attention Is All You Need", SourceType::Arxiv)
                .year(2017)
                .build(),
            PaperBuilder::new("Attention Is All You Need", SourceType::SemanticScholar)
                .year(2018)
                .build(),
        ];
        assert_eq!(deduplicate(&papers, THRESHOLD).len(), 2);
    }

    #[test]
    fn test_missing_year_is_non_conflicting() {
        let papers = vec![
            PaperBuilder::new("Attention Is All You Need", SourceType::Arxiv).build(),
            PaperBuilder::new("Attention Is All You Need", SourceType::SemanticScholar)
                .year(2017)
                .build(),
        ];
        assert_eq!(deduplicate(&papers, THRESHOLD).len(), 1);
    }

    #[test]
    fn test_merge_keeps_union_of_fields_and_max_citations() {
        let p1 = PaperBuilder::new("Shared Paper", SourceType::SemanticScholar)
            .doi("10.1234/x")
            .citations(120)
            .build();
        let p2 = PaperBuilder::new("Shared Paper", SourceType::CrossRef)
            .doi("10.1234/x")
            .citations(80)
            .abstract_text("A much richer abstract from the other index.")
            .authors(vec!["A. Author".into()])
            .build();

        let merged = deduplicate(&[p1, p2], THRESHOLD);
        assert_eq!(merged.len(), 1);
        let paper = &merged[0];

        // p2 is more complete (abstract + authors), so it wins attribution,
        // but the citation count is the max of both sides.
        assert_eq!(paper.source, SourceType::CrossRef);
        assert_eq!(paper.citations, Some(120));
        assert!(paper.r#abstract.is_some());
        assert_eq!(paper.authors.len(), 1);
    }

    #[test]
    fn test_citation_adopted_when_present_on_one_side() {
        let p1 = PaperBuilder::new("Shared Paper", SourceType::Arxiv)
            .doi("10.1234/x")
            .abstract_text("abstract")
            .build();
        let p2 = PaperBuilder::new("Shared Paper", SourceType::SemanticScholar)
            .doi("10.1234/x")
            .citations(7)
            .build();

        let merged = deduplicate(&[p1, p2], THRESHOLD);
        assert_eq!(merged[0].citations, Some(7));
    }

    #[test]
    fn test_order_independence() {
        let a = PaperBuilder::new("Paper One", SourceType::Arxiv)
            .doi("10.1/one")
            .build();
        let b = PaperBuilder::new("Paper One", SourceType::CrossRef)
            .doi("10.1/one")
            .abstract_text("details")
            .citations(3)
            .build();
        let c = PaperBuilder::new("Unrelated Paper", SourceType::Core)
            .year(2020)
            .build();

        let forward = deduplicate(&[a.clone(), b.clone(), c.clone()], THRESHOLD);
        let reverse = deduplicate(&[c, b, a], THRESHOLD);

        let key = |p: &Paper| (normalize_title(&p.title), p.citations, p.source.id().to_string());
        let mut fwd: Vec<_> = forward.iter().map(key).collect();
        let mut rev: Vec<_> = reverse.iter().map(key).collect();
        fwd.sort();
        rev.sort();
        assert_eq!(fwd, rev);
    }

    #[test]
    fn test_idempotence() {
        let papers = vec![
            PaperBuilder::new("Paper A", SourceType::Arxiv).doi("10.1/a").build(),
            PaperBuilder::new("Paper A", SourceType::CrossRef).doi("10.1/a").build(),
            PaperBuilder::new("Paper B", SourceType::Core).year(2021).build(),
        ];

        let once = deduplicate(&papers, THRESHOLD);
        let twice = deduplicate(&once, THRESHOLD);
        assert_eq!(once.len(), twice.len());
    }

    #[test]
    fn test_empty_and_single() {
        assert!(deduplicate(&[], THRESHOLD).is_empty());
        let one = vec![PaperBuilder::new("Solo", SourceType::Arxiv).build()];
        assert_eq!(deduplicate(&one, THRESHOLD).len(), 1);
    }
}
