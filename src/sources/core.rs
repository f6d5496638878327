//! CORE search provider implementation.
//!
//! Uses the CORE v3 works search API. Requires an API key (CORE_API_KEY);
//! searching without one fails permanently at call time rather than at
//! registration.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::models::{Paper, PaperBuilder, SourceType};
use crate::sources::{http_client, Provider, ProviderCapabilities, ProviderError};

const CORE_API_URL: &str = "https://api.core.ac.uk/v3/search/works";

/// CORE search provider
#[derive(Debug, Clone)]
pub struct CoreProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl CoreProvider {
    pub fn new() -> Self {
        Self {
            client: http_client(),
            api_key: std::env::var("CORE_API_KEY").ok(),
            base_url: CORE_API_URL.to_string(),
        }
    }

    /// Set an explicit API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Point the provider at a different endpoint (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn parse_work(work: &CoreWork) -> Option<Paper> {
        let title = work.title.as_deref()?.trim().to_string();
        if title.is_empty() {
            return None;
        }

        let authors = work
            .authors
            .iter()
            .filter_map(|a| a.name.clone())
            .collect();

        let mut builder = PaperBuilder::new(title, SourceType::Core).authors(authors);
        if let Some(year) = work.year_published {
            builder = builder.year(year);
        }
        if let Some(count) = work.citation_count {
            builder = builder.citations(count);
        }
        if let Some(doi) = work.doi.as_deref().filter(|d| !d.is_empty()) {
            builder = builder.doi(doi);
        }
        if let Some(url) = &work.download_url {
            builder = builder.url(url.clone());
        }
        if let Some(text) = work.r#abstract.as_deref().filter(|a| !a.is_empty()) {
            builder = builder.abstract_text(text);
        }

        Some(builder.build())
    }
}

impl Default for CoreProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for CoreProvider {
    fn id(&self) -> &str {
        "core"
    }

    fn name(&self) -> &str {
        "CORE"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::SEARCH
            | ProviderCapabilities::CITATIONS
            | ProviderCapabilities::YEAR_FILTER
    }

    async fn search(
        &self,
        query: &str,
        limit: usize,
        year_range: Option<(i32, i32)>,
    ) -> Result<Vec<Paper>, ProviderError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            ProviderError::Auth("CORE_API_KEY is not configured".to_string())
        })?;

        let q = match year_range {
            Some((min, max)) => {
                format!("{} AND yearPublished>={} AND yearPublished<={}", query, min, max)
            }
            None => query.to_string(),
        };

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(api_key)
            .json(&json!({ "q": q, "limit": limit.min(100) }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::from_status(response.status(), "CORE"));
        }

        let data: CoreResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("CORE response: {}", e)))?;

        Ok(data.results.iter().filter_map(Self::parse_work).collect())
    }
}

#[derive(Debug, Deserialize)]
struct CoreResponse {
    #[serde(default)]
    results: Vec<CoreWork>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoreWork {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<CoreAuthor>,
    year_published: Option<i32>,
    citation_count: Option<u32>,
    doi: Option<String>,
    download_url: Option<String>,
    r#abstract: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CoreAuthor {
    name: Option<String>,
}
