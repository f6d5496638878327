//! CrossRef search provider implementation.
//!
//! Uses the CrossRef works API. Reliable DOI registry with citation counts
//! (`is-referenced-by-count`).

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::{Paper, PaperBuilder, SourceType};
use crate::sources::{http_client, Provider, ProviderCapabilities, ProviderError};

const CROSSREF_API_URL: &str = "https://api.crossref.org/works";

/// CrossRef search provider
#[derive(Debug, Clone)]
pub struct CrossRefProvider {
    client: reqwest::Client,
    base_url: String,
}

impl CrossRefProvider {
    pub fn new() -> Self {
        Self {
            client: http_client(),
            base_url: CROSSREF_API_URL.to_string(),
        }
    }

    /// Point the provider at a different endpoint (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn parse_work(work: &CrossRefWork) -> Option<Paper> {
        // CrossRef titles arrive as an array; take the first non-empty one.
        let title = work
            .title
            .iter()
            .map(|t| t.trim())
            .find(|t| !t.is_empty())?
            .to_string();

        let authors = work
            .author
            .iter()
            .map(|a| match (&a.given, &a.family) {
                (Some(given), Some(family)) => format!("{} {}", given, family),
                (None, Some(family)) => family.clone(),
                (Some(given), None) => given.clone(),
                (None, None) => String::new(),
            })
            .filter(|name| !name.is_empty())
            .collect();

        let year = work
            .published
            .as_ref()
            .and_then(|p| p.date_parts.first())
            .and_then(|parts| parts.first())
            .copied();

        let mut builder = PaperBuilder::new(title, SourceType::CrossRef).authors(authors);
        if let Some(count) = work.is_referenced_by_count {
            builder = builder.citations(count);
        }
        if let Some(year) = year {
            builder = builder.year(year);
        }
        if let Some(doi) = work.doi.as_deref().filter(|d| !d.is_empty()) {
            builder = builder.doi(doi).url(format!("https://doi.org/{}", doi));
        } else if let Some(url) = &work.url {
            builder = builder.url(url.clone());
        }
        if let Some(text) = work.r#abstract.as_deref().filter(|a| !a.is_empty()) {
            builder = builder.abstract_text(strip_jats(text));
        }

        Some(builder.build())
    }
}

/// CrossRef abstracts are JATS XML fragments; drop the tags.
fn strip_jats(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl Default for CrossRefProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for CrossRefProvider {
    fn id(&self) -> &str {
        "crossref"
    }

    fn name(&self) -> &str {
        "CrossRef"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::SEARCH
            | ProviderCapabilities::CITATIONS
            | ProviderCapabilities::YEAR_FILTER
    }

    fn citation_weight(&self) -> f64 {
        1.5
    }

    async fn search(
        &self,
        query: &str,
        limit: usize,
        year_range: Option<(i32, i32)>,
    ) -> Result<Vec<Paper>, ProviderError> {
        let mut url = format!(
            "{}?query={}&rows={}",
            self.base_url,
            urlencoding::encode(query),
            limit.min(100)
        );
        if let Some((min, max)) = year_range {
            url.push_str(&format!(
                "&filter=from-pub-date:{}-01-01,until-pub-date:{}-12-31",
                min, max
            ));
        }

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::from_status(response.status(), "CrossRef"));
        }

        let data: CrossRefResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("CrossRef response: {}", e)))?;

        Ok(data
            .message
            .items
            .iter()
            .filter_map(Self::parse_work)
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct CrossRefResponse {
    message: CrossRefMessage,
}

#[derive(Debug, Deserialize)]
struct CrossRefMessage {
    #[serde(default)]
    items: Vec<CrossRefWork>,
}

#[derive(Debug, Deserialize)]
struct CrossRefWork {
    #[serde(default)]
    title: Vec<String>,
    #[serde(default)]
    author: Vec<CrossRefAuthor>,
    #[serde(rename = "DOI")]
    doi: Option<String>,
    #[serde(rename = "URL")]
    url: Option<String>,
    r#abstract: Option<String>,
    #[serde(rename = "is-referenced-by-count")]
    is_referenced_by_count: Option<u32>,
    published: Option<CrossRefDate>,
}

#[derive(Debug, Deserialize)]
struct CrossRefAuthor {
    given: Option<String>,
    family: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CrossRefDate {
    #[serde(rename = "date-parts", default)]
    date_parts: Vec<Vec<i32>>,
}
