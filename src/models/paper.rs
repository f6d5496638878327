//! Paper model representing a research paper from any provider.

use serde::{Deserialize, Serialize};

/// The provider a paper was fetched from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Arxiv,
    SemanticScholar,
    CrossRef,
    OpenAlex,
    Core,
    #[serde(untagged)]
    Other(String),
}

impl SourceType {
    /// Returns the display name of the provider
    pub fn name(&self) -> &str {
        match self {
            SourceType::Arxiv => "arXiv",
            SourceType::SemanticScholar => "Semantic Scholar",
            SourceType::CrossRef => "CrossRef",
            SourceType::OpenAlex => "OpenAlex",
            SourceType::Core => "CORE",
            SourceType::Other(s) => s,
        }
    }

    /// Returns the provider identifier used in requests and stats
    pub fn id(&self) -> &str {
        match self {
            SourceType::Arxiv => "arxiv",
            SourceType::SemanticScholar => "semantic_scholar",
            SourceType::CrossRef => "crossref",
            SourceType::OpenAlex => "openalex",
            SourceType::Core => "core",
            SourceType::Other(s) => s,
        }
    }

    /// Parse a provider identifier back into a SourceType
    pub fn from_id(id: &str) -> Self {
        match id {
            "arxiv" => SourceType::Arxiv,
            "semantic_scholar" => SourceType::SemanticScholar,
            "crossref" => SourceType::CrossRef,
            "openalex" => SourceType::OpenAlex,
            "core" => SourceType::Core,
            other => SourceType::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A research paper from any academic provider.
///
/// This struct provides a standardized format across all providers so the
/// pipeline stages never need to know where a record came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paper {
    /// Paper title (required for identity)
    pub title: String,

    /// Author names in publication order
    #[serde(default)]
    pub authors: Vec<String>,

    /// Publication year
    pub year: Option<i32>,

    /// Citation count. `None` means the provider has no citation data,
    /// which is not the same as `Some(0)`.
    pub citations: Option<u32>,

    /// Digital Object Identifier
    pub doi: Option<String>,

    /// Paper page URL
    pub url: Option<String>,

    /// Abstract text
    pub r#abstract: Option<String>,

    /// Provider this record originated from
    pub source: SourceType,

    /// Ranker-supplied rationale, for display only
    pub explanation: Option<String>,

    /// Transient composite score assigned by the pre-ranker
    #[serde(skip)]
    pub raw_score: f64,
}

impl Paper {
    /// Create a new paper with required fields
    pub fn new(title: impl Into<String>, source: SourceType) -> Self {
        Self {
            title: title.into(),
            authors: Vec::new(),
            year: None,
            citations: None,
            doi: None,
            url: None,
            r#abstract: None,
            source,
            explanation: None,
            raw_score: 0.0,
        }
    }

    /// Completeness ranking used by the dedup merge policy.
    ///
    /// Fields are weighted by priority: abstract, DOI, citation count,
    /// author list. Higher is more complete.
    pub fn completeness(&self) -> u8 {
        let mut score = 0u8;
        if self.r#abstract.as_deref().is_some_and(|a| !a.is_empty()) {
            score += 8;
        }
        if self.doi.as_deref().is_some_and(|d| !d.is_empty()) {
            score += 4;
        }
        if self.citations.is_some() {
            score += 2;
        }
        if !self.authors.is_empty() {
            score += 1;
        }
        score
    }

    /// Length of the abstract, 0 when absent. Merge tie-breaker.
    pub fn abstract_len(&self) -> usize {
        self.r#abstract.as_deref().map_or(0, str::len)
    }
}

/// Builder for constructing Paper objects
#[derive(Debug, Clone)]
pub struct PaperBuilder {
    paper: Paper,
}

impl PaperBuilder {
    /// Create a new builder with required fields
    pub fn new(title: impl Into<String>, source: SourceType) -> Self {
        Self {
            paper: Paper::new(title, source),
        }
    }

    /// Set authors
    pub fn authors(mut self, authors: Vec<String>) -> Self {
        self.paper.authors = authors;
        self
    }

    /// Set publication year
    pub fn year(mut self, year: i32) -> Self {
        self.paper.year = Some(year);
        self
    }

    /// Set citation count
    pub fn citations(mut self, count: u32) -> Self {
        self.paper.citations = Some(count);
        self
    }

    /// Set DOI
    pub fn doi(mut self, doi: impl Into<String>) -> Self {
        self.paper.doi = Some(doi.into());
        self
    }

    /// Set URL
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.paper.url = Some(url.into());
        self
    }

    /// Set abstract
    pub fn abstract_text(mut self, text: impl Into<String>) -> Self {
        self.paper.r#abstract = Some(text.into());
        self
    }

    /// Build the Paper
    pub fn build(self) -> Paper {
        self.paper
    }
}
