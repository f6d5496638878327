//! Registry for managing search provider plugins.

use std::collections::HashMap;
use std::sync::Arc;

use super::{
    ArxivProvider, CoreProvider, CrossRefProvider, OpenAlexProvider, Provider,
    SemanticScholarProvider,
};

bitflags::bitflags! {
    /// Capabilities a provider can support
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ProviderCapabilities: u32 {
        const SEARCH = 1 << 0;
        const CITATIONS = 1 << 1;
        const YEAR_FILTER = 1 << 2;
    }
}

/// Registry for all available search providers.
///
/// The registry owns the provider trait objects and answers
/// capability-filtered lookups for the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Create a registry with all built-in providers registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ArxivProvider::new()));
        registry.register(Arc::new(SemanticScholarProvider::new()));
        registry.register(Arc::new(CrossRefProvider::new()));
        registry.register(Arc::new(OpenAlexProvider::new()));
        registry.register(Arc::new(CoreProvider::new()));
        registry
    }

    /// Register a provider
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.providers.insert(provider.id().to_string(), provider);
    }

    /// Get a provider by id
    pub fn get(&self, id: &str) -> Option<&Arc<dyn Provider>> {
        self.providers.get(id)
    }

    /// Check if a provider exists
    pub fn has(&self, id: &str) -> bool {
        self.providers.contains_key(id)
    }

    /// All registered provider ids
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(|s| s.as_str())
    }

    /// Number of registered providers
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry() {
        let registry = ProviderRegistry::with_defaults();
        assert_eq!(registry.len(), 5);

        for id in ["arxiv", "semantic_scholar", "crossref", "openalex", "core"] {
            assert!(registry.has(id), "provider '{}' should be registered", id);
        }
        assert!(!registry.has("pubmed"));
    }

    #[test]
    fn test_arxiv_is_the_only_citation_sparse_default() {
        let registry = ProviderRegistry::with_defaults();

        for id in registry.ids() {
            let provider = registry.get(id).unwrap();
            assert_eq!(provider.supports_citations(), id != "arxiv");
        }
    }

    #[test]
    fn test_citation_weights() {
        let registry = ProviderRegistry::with_defaults();

        let weight = |id: &str| registry.get(id).unwrap().citation_weight();
        assert_eq!(weight("semantic_scholar"), 2.0);
        assert_eq!(weight("crossref"), 1.5);
        assert_eq!(weight("openalex"), 1.5);
        assert_eq!(weight("core"), 1.0);
    }
}
