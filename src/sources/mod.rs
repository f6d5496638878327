//! Search provider plugins with an extensible trait-based architecture.
//!
//! This module defines the [`Provider`] trait that all academic search
//! providers implement. New providers are added by implementing the trait and
//! registering them with the [`ProviderRegistry`]; the aggregation pipeline
//! never needs to change.

mod arxiv;
mod core;
mod crossref;
mod openalex;
mod registry;
mod semantic;

pub mod mock;

pub use arxiv::ArxivProvider;
pub use core::CoreProvider;
pub use crossref::CrossRefProvider;
pub use mock::MockProvider;
pub use openalex::OpenAlexProvider;
pub use registry::{ProviderCapabilities, ProviderRegistry};
pub use semantic::SemanticScholarProvider;

use crate::models::{FailureKind, Paper};
use async_trait::async_trait;

/// Contract every academic search provider implements.
///
/// A provider is queried with a caller-specified limit, treated as a ceiling
/// rather than a guarantee, and either returns zero or more paper records or
/// fails with a [`ProviderError`]. Transport details (HTTP, auth headers)
/// stay inside the implementation.
#[async_trait]
pub trait Provider: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this provider (e.g. "arxiv", "crossref")
    fn id(&self) -> &str;

    /// Human-readable name
    fn name(&self) -> &str;

    /// Capabilities of this provider
    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::SEARCH
    }

    /// Whether this provider carries citation metadata
    fn supports_citations(&self) -> bool {
        self.capabilities().contains(ProviderCapabilities::CITATIONS)
    }

    /// Static weight reflecting historical citation-data richness, used by
    /// the orchestrator's budget allocation in citations mode.
    fn citation_weight(&self) -> f64 {
        1.0
    }

    /// Search for papers matching the query.
    ///
    /// `limit` is a ceiling on the number of records returned. `year_range`
    /// is an inclusive publication-year filter when the provider supports it.
    async fn search(
        &self,
        query: &str,
        limit: usize,
        year_range: Option<(i32, i32)>,
    ) -> Result<Vec<Paper>, ProviderError>;
}

/// Errors that can occur when querying a provider
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Network or connectivity error (transient)
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded (transient)
    #[error("Rate limit exceeded")]
    RateLimit,

    /// Request timed out (transient)
    #[error("Request timed out")]
    Timeout,

    /// Authentication or configuration failure (permanent)
    #[error("Auth error: {0}")]
    Auth(String),

    /// Invalid request parameters (permanent)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Response parsing error (permanent)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Other API error from the provider
    #[error("API error: {0}")]
    Api(String),
}

impl ProviderError {
    /// Whether the caller may retry (or simply omit this provider for the
    /// request) rather than treating the failure as a configuration problem.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Network(_) | ProviderError::RateLimit | ProviderError::Timeout
        )
    }

    /// Failure kind recorded in aggregation stats
    pub fn kind(&self) -> FailureKind {
        if self.is_transient() {
            FailureKind::Transient
        } else {
            FailureKind::Permanent
        }
    }

    /// Classify an HTTP status from a provider API
    pub fn from_status(status: reqwest::StatusCode, provider: &str) -> Self {
        match status.as_u16() {
            429 => ProviderError::RateLimit,
            401 | 403 => ProviderError::Auth(format!("{} rejected credentials", provider)),
            500..=599 => {
                ProviderError::Network(format!("{} returned server error {}", provider, status))
            }
            _ => ProviderError::Api(format!("{} returned status {}", provider, status)),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Parse(format!("JSON: {}", err))
    }
}

/// Shared HTTP client construction with the defaults all adapters use
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .timeout(std::time::Duration::from_secs(30))
        .connect_timeout(std::time::Duration::from_secs(10))
        .build()
        .expect("Failed to create HTTP client")
}
