//! Semantic Scholar search provider implementation.
//!
//! Uses the Semantic Scholar Graph API. Richest citation coverage of the
//! built-in providers, so it carries the highest citation weight.

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::{Paper, PaperBuilder, SourceType};
use crate::sources::{http_client, Provider, ProviderCapabilities, ProviderError};

const SEMANTIC_API_URL: &str = "https://api.semanticscholar.org/graph/v1/paper/search";
const SEARCH_FIELDS: &str = "title,authors,year,abstract,citationCount,externalIds,url";

/// Semantic Scholar search provider
#[derive(Debug, Clone)]
pub struct SemanticScholarProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl SemanticScholarProvider {
    pub fn new() -> Self {
        Self {
            client: http_client(),
            api_key: std::env::var("SEMANTIC_SCHOLAR_API_KEY").ok(),
            base_url: SEMANTIC_API_URL.to_string(),
        }
    }

    /// Point the provider at a different endpoint (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn parse_paper(data: &S2Paper) -> Option<Paper> {
        let title = data.title.as_deref()?.trim().to_string();
        if title.is_empty() {
            return None;
        }

        let authors = data
            .authors
            .iter()
            .filter_map(|a| a.name.clone())
            .collect();

        let mut builder =
            PaperBuilder::new(title, SourceType::SemanticScholar).authors(authors);
        if let Some(year) = data.year {
            builder = builder.year(year);
        }
        if let Some(count) = data.citation_count {
            builder = builder.citations(count);
        }
        if let Some(doi) = data.external_ids.as_ref().and_then(|ids| ids.doi.clone()) {
            builder = builder.doi(doi);
        }
        if let Some(url) = &data.url {
            builder = builder.url(url.clone());
        }
        if let Some(text) = data.r#abstract.as_deref().filter(|a| !a.is_empty()) {
            builder = builder.abstract_text(text);
        }

        Some(builder.build())
    }
}

impl Default for SemanticScholarProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for SemanticScholarProvider {
    fn id(&self) -> &str {
        "semantic_scholar"
    }

    fn name(&self) -> &str {
        "Semantic Scholar"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::SEARCH
            | ProviderCapabilities::CITATIONS
            | ProviderCapabilities::YEAR_FILTER
    }

    fn citation_weight(&self) -> f64 {
        2.0
    }

    async fn search(
        &self,
        query: &str,
        limit: usize,
        year_range: Option<(i32, i32)>,
    ) -> Result<Vec<Paper>, ProviderError> {
        let mut url = format!(
            "{}?query={}&limit={}&fields={}",
            self.base_url,
            urlencoding::encode(query),
            limit.min(100),
            SEARCH_FIELDS
        );
        if let Some((min, max)) = year_range {
            url.push_str(&format!("&year={}-{}", min, max));
        }

        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::from_status(
                response.status(),
                "Semantic Scholar",
            ));
        }

        let data: S2SearchResponse = response.json().await.map_err(|e| {
            ProviderError::Parse(format!("Semantic Scholar response: {}", e))
        })?;

        Ok(data.data.iter().filter_map(Self::parse_paper).collect())
    }
}

#[derive(Debug, Deserialize)]
struct S2SearchResponse {
    #[serde(default)]
    data: Vec<S2Paper>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct S2Paper {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<S2Author>,
    year: Option<i32>,
    r#abstract: Option<String>,
    citation_count: Option<u32>,
    external_ids: Option<S2ExternalIds>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct S2Author {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct S2ExternalIds {
    #[serde(rename = "DOI")]
    doi: Option<String>,
}
