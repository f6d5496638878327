//! arXiv search provider implementation.
//!
//! Uses the arXiv Atom API. arXiv is a preprint archive and carries no
//! citation metadata, so it is excluded from citations-mode aggregation.

use async_trait::async_trait;
use feed_rs::parser;

use crate::models::{Paper, PaperBuilder, SourceType};
use crate::sources::{http_client, Provider, ProviderCapabilities, ProviderError};

const ARXIV_API_URL: &str = "http://export.arxiv.org/api/query";

/// arXiv search provider
#[derive(Debug, Clone)]
pub struct ArxivProvider {
    client: reqwest::Client,
    base_url: String,
}

impl ArxivProvider {
    pub fn new() -> Self {
        Self {
            client: http_client(),
            base_url: ARXIV_API_URL.to_string(),
        }
    }

    /// Point the provider at a different endpoint (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the arXiv search expression, folding in the year range as a
    /// submitted-date window.
    fn build_query(query: &str, year_range: Option<(i32, i32)>) -> String {
        match year_range {
            Some((min, max)) => format!(
                "all:{} AND submitted_date:[{}0101 TO {}1231]",
                query, min, max
            ),
            None => format!("all:{}", query),
        }
    }

    fn parse_entry(entry: &feed_rs::model::Entry) -> Option<Paper> {
        let title = entry.title.as_ref()?.content.trim().to_string();
        if title.is_empty() {
            return None;
        }

        let authors: Vec<String> = entry.authors.iter().map(|a| a.name.clone()).collect();
        let year = entry.published.map(|d| {
            use chrono::Datelike;
            d.year()
        });

        let mut builder = PaperBuilder::new(title, SourceType::Arxiv)
            .authors(authors)
            .url(entry.id.clone());
        if let Some(year) = year {
            builder = builder.year(year);
        }
        if let Some(summary) = &entry.summary {
            let text = summary.content.split_whitespace().collect::<Vec<_>>().join(" ");
            if !text.is_empty() {
                builder = builder.abstract_text(text);
            }
        }

        Some(builder.build())
    }
}

impl Default for ArxivProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for ArxivProvider {
    fn id(&self) -> &str {
        "arxiv"
    }

    fn name(&self) -> &str {
        "arXiv"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::SEARCH | ProviderCapabilities::YEAR_FILTER
    }

    async fn search(
        &self,
        query: &str,
        limit: usize,
        year_range: Option<(i32, i32)>,
    ) -> Result<Vec<Paper>, ProviderError> {
        let url = format!(
            "{}?search_query={}&start=0&max_results={}",
            self.base_url,
            urlencoding::encode(&Self::build_query(query, year_range)),
            limit
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::from_status(response.status(), "arXiv"));
        }

        let body = response.bytes().await?;
        let feed = parser::parse(&body[..])
            .map_err(|e| ProviderError::Parse(format!("arXiv Atom feed: {}", e)))?;

        let papers = feed
            .entries
            .iter()
            .filter_map(Self::parse_entry)
            .take(limit)
            .collect();
        Ok(papers)
    }
}
