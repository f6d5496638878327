//! OpenAlex search provider implementation.
//!
//! Uses the OpenAlex works API. Broad aggregator index with good citation
//! coverage (`cited_by_count`).

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::{Paper, PaperBuilder, SourceType};
use crate::sources::{http_client, Provider, ProviderCapabilities, ProviderError};

const OPENALEX_API_URL: &str = "https://api.openalex.org/works";

/// OpenAlex search provider
#[derive(Debug, Clone)]
pub struct OpenAlexProvider {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAlexProvider {
    pub fn new() -> Self {
        Self {
            client: http_client(),
            base_url: OPENALEX_API_URL.to_string(),
        }
    }

    /// Point the provider at a different endpoint (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn parse_work(work: &OpenAlexWork) -> Option<Paper> {
        let title = work.display_name.as_deref()?.trim().to_string();
        if title.is_empty() {
            return None;
        }

        let authors = work
            .authorships
            .iter()
            .filter_map(|a| a.author.as_ref())
            .filter_map(|a| a.display_name.clone())
            .collect();

        let mut builder = PaperBuilder::new(title, SourceType::OpenAlex).authors(authors);
        if let Some(year) = work.publication_year {
            builder = builder.year(year);
        }
        if let Some(count) = work.cited_by_count {
            builder = builder.citations(count);
        }
        if let Some(doi) = &work.doi {
            // OpenAlex reports DOIs as full https://doi.org/ URLs.
            builder = builder
                .doi(doi.trim_start_matches("https://doi.org/"))
                .url(doi.clone());
        } else if let Some(id) = &work.id {
            builder = builder.url(id.clone());
        }
        if let Some(index) = &work.abstract_inverted_index {
            let text = reconstruct_abstract(index);
            if !text.is_empty() {
                builder = builder.abstract_text(text);
            }
        }

        Some(builder.build())
    }
}

/// OpenAlex returns abstracts as an inverted index (word -> positions);
/// rebuild the original token order.
fn reconstruct_abstract(index: &std::collections::HashMap<String, Vec<usize>>) -> String {
    let mut positions: Vec<(usize, &str)> = index
        .iter()
        .flat_map(|(word, at)| at.iter().map(move |&pos| (pos, word.as_str())))
        .collect();
    positions.sort_unstable_by_key(|(pos, _)| *pos);
    positions
        .into_iter()
        .map(|(_, word)| word)
        .collect::<Vec<_>>()
        .join(" ")
}

impl Default for OpenAlexProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for OpenAlexProvider {
    fn id(&self) -> &str {
        "openalex"
    }

    fn name(&self) -> &str {
        "OpenAlex"
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
            "{}?search={}&per-page={}",
            self.base_url,
            urlencoding::encode(query),
            limit.min(200)
        );
        if let Some((min, max)) = year_range {
            url.push_str(&format!("&filter=publication_year:{}-{}", min, max));
        }

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::from_status(response.status(), "OpenAlex"));
        }

        let data: OpenAlexResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("OpenAlex response: {}", e)))?;

        Ok(data.results.iter().filter_map(Self::parse_work).collect())
    }
}

#[derive(Debug, Deserialize)]
struct OpenAlexResponse {
    #[serde(default)]
    results: Vec<OpenAlexWork>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexWork {
    id: Option<String>,
    display_name: Option<String>,
    publication_year: Option<i32>,
    cited_by_count: Option<u32>,
    doi: Option<String>,
    #[serde(default)]
    authorships: Vec<OpenAlexAuthorship>,
    abstract_inverted_index: Option<std::collections::HashMap<String, Vec<usize>>>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexAuthorship {
    author: Option<OpenAlexAuthor>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexAuthor {
    display_name: Option<String>,
}
