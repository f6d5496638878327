use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use ai_scholar::config::{load_config, Config};
use ai_scholar::models::{RankingMode, SearchRequest};
use ai_scholar::ranker::OpenRouterRanker;
use ai_scholar::sources::ProviderRegistry;
use ai_scholar::Pipeline;

/// AI Scholar - aggregate, deduplicate and rank academic paper search results
#[derive(Parser, Debug)]
#[command(name = "ai-scholar")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search academic papers across providers and rank the results", long_about = None)]
struct Cli {
    /// Search query
    query: String,

    /// Providers to query (repeatable)
    #[arg(long, short, default_values_t = [
        "arxiv".to_string(),
        "semantic_scholar".to_string(),
        "crossref".to_string(),
        "openalex".to_string(),
    ])]
    providers: Vec<String>,

    /// Maximum results requested from each provider
    #[arg(long, default_value_t = 50)]
    limit: usize,

    /// Maximum length of the final ranked list
    #[arg(long, default_value_t = 10)]
    final_limit: usize,

    /// Ranking strategy
    #[arg(long, short, value_enum, default_value_t = Mode::Ai)]
    mode: Mode,

    /// Earliest publication year (inclusive)
    #[arg(long)]
    min_year: Option<i32>,

    /// Latest publication year (inclusive)
    #[arg(long)]
    max_year: Option<i32>,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Ai,
    Citations,
    Default,
}

impl From<Mode> for RankingMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Ai => RankingMode::Ai,
            Mode::Citations => RankingMode::Citations,
            Mode::Default => RankingMode::Default,
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    let mut request = SearchRequest::new(&cli.query, cli.providers.clone())
        .per_provider_limit(cli.limit)
        .final_limit(cli.final_limit)
        .ranking_mode(cli.mode.into());
    if cli.min_year.is_some() || cli.max_year.is_some() {
        use chrono::Datelike;
        let min = cli.min_year.unwrap_or(1900);
        let max = cli.max_year.unwrap_or_else(|| chrono::Utc::now().year());
        request = request.year_range(min, max);
    }

    let registry = ProviderRegistry::with_defaults();
    for id in &cli.providers {
        if !registry.has(id) {
            let mut known: Vec<&str> = registry.ids().collect();
            known.sort_unstable();
            anyhow::bail!("unknown provider '{}' (available: {})", id, known.join(", "));
        }
    }

    let mut pipeline = Pipeline::new(registry, config.pipeline);
    if let Some(ranker) = OpenRouterRanker::from_config(&config.ranker) {
        pipeline = pipeline.with_ranker(Arc::new(ranker));
    } else if request.ranking_mode != RankingMode::Default {
        tracing::warn!("OPENROUTER_API_KEY is not set, results will be ranked heuristically");
    }

    let result = pipeline.search(&request).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
