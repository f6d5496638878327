//! # AI Scholar
//!
//! Aggregates academic paper search results from multiple providers,
//! deduplicates them across sources, and produces an AI-ranked shortlist
//! with graceful heuristic fallback.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (Paper, SearchRequest, SearchResult)
//! - [`sources`]: Search provider plugins with an extensible trait-based
//!   architecture
//! - [`pipeline`]: Aggregation, deduplication, filtering and ranking stages
//! - [`ranker`]: AI ranking engine abstraction and the OpenRouter backend
//! - [`config`]: Configuration management

pub mod config;
pub mod models;
pub mod pipeline;
pub mod ranker;
pub mod sources;

// Re-export commonly used types
pub use models::{Paper, SearchRequest, SearchResult};
pub use pipeline::Pipeline;
pub use sources::{Provider, ProviderRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
