//! Mock provider for testing purposes.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::models::Paper;
use crate::sources::{Provider, ProviderCapabilities, ProviderError};

/// Scripted behavior for a [`MockProvider`] call
#[derive(Debug)]
enum MockBehavior {
    Papers(Vec<Paper>),
    Transient,
    Permanent,
}

/// A mock provider returning predefined papers or failures.
#[derive(Debug)]
pub struct MockProvider {
    id: String,
    capabilities: ProviderCapabilities,
    citation_weight: f64,
    behavior: Mutex<MockBehavior>,
    /// The limit passed to the most recent `search` call
    last_limit: Mutex<Option<usize>>,
}

impl MockProvider {
    /// A provider that returns the given papers
    pub fn returning(id: &str, papers: Vec<Paper>) -> Self {
        Self {
            id: id.to_string(),
            capabilities: ProviderCapabilities::SEARCH | ProviderCapabilities::CITATIONS,
            citation_weight: 1.0,
            behavior: Mutex::new(MockBehavior::Papers(papers)),
            last_limit: Mutex::new(None),
        }
    }

    /// A provider that always fails transiently (as if rate-limited)
    pub fn failing_transient(id: &str) -> Self {
        Self {
            behavior: Mutex::new(MockBehavior::Transient),
            ..Self::returning(id, Vec::new())
        }
    }

    /// A provider that always fails permanently (as if misconfigured)
    pub fn failing_permanent(id: &str) -> Self {
        Self {
            behavior: Mutex::new(MockBehavior::Permanent),
            ..Self::returning(id, Vec::new())
        }
    }

    /// Drop the CITATIONS capability, marking this a citation-sparse source
    pub fn without_citations(mut self) -> Self {
        self.capabilities -= ProviderCapabilities::CITATIONS;
        self
    }

    /// Advertise native year filtering
    pub fn with_year_filter(mut self) -> Self {
        self.capabilities |= ProviderCapabilities::YEAR_FILTER;
        self
    }

    /// Set the citation-richness weight
    pub fn with_citation_weight(mut self, weight: f64) -> Self {
        self.citation_weight = weight;
        self
    }

    /// The limit the orchestrator passed to the most recent call
    pub fn last_limit(&self) -> Option<usize> {
        *self.last_limit.lock().unwrap()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> ProviderCapabilities {
        self.capabilities
    }

    fn citation_weight(&self) -> f64 {
        self.citation_weight
    }

    async fn search(
        &self,
        _query: &str,
        limit: usize,
        _year_range: Option<(i32, i32)>,
    ) -> Result<Vec<Paper>, ProviderError> {
        *self.last_limit.lock().unwrap() = Some(limit);
        match &*self.behavior.lock().unwrap() {
            MockBehavior::Papers(papers) => {
                Ok(papers.iter().take(limit).cloned().collect())
            }
            MockBehavior::Transient => Err(ProviderError::RateLimit),
            MockBehavior::Permanent => {
                Err(ProviderError::Auth("mock credentials rejected".to_string()))
            }
        }
    }
}
