//! Integration tests for AI Scholar
//!
//! These tests drive the whole pipeline through its public API using mock
//! providers and a mock ranking engine.

use std::sync::Arc;

use ai_scholar::models::{
    FailureKind, Paper, PaperBuilder, RankingMode, RankingPath, SearchRequest, SourceType,
};
use ai_scholar::pipeline::{ranking, scoring, PipelineError};
use ai_scholar::ranker::{AiRanker, MockRanker, RankedEntry};
use ai_scholar::sources::{MockProvider, Provider, ProviderRegistry};
use ai_scholar::{config::PipelineConfig, Pipeline};

fn registry_with(providers: Vec<Arc<dyn Provider>>) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    for provider in providers {
        registry.register(provider);
    }
    registry
}

fn fast_config() -> PipelineConfig {
    PipelineConfig {
        ranker_retry_delay_secs: 0,
        ..PipelineConfig::default()
    }
}

fn rich_paper(title: &str, source: SourceType) -> Paper {
    PaperBuilder::new(title, source)
        .doi(format!("10.1/{}", title.to_lowercase().replace(' ', "-")))
        .abstract_text(format!(
            "{}: an extended study of graph neural networks and their behavior.",
            title
        ))
        .authors(vec!["A. Researcher".into()])
        .citations(80)
        .year(2022)
        .build()
}

#[tokio::test]
async fn partial_failure_degrades_gracefully() {
    let registry = registry_with(vec![
        Arc::new(MockProvider::returning(
            "openalex",
            vec![
                rich_paper("Graph neural networks survey", SourceType::OpenAlex),
                rich_paper("Graph neural networks in chemistry", SourceType::OpenAlex),
            ],
        )),
        Arc::new(MockProvider::returning(
            "crossref",
            vec![rich_paper("Graph neural networks benchmarks", SourceType::CrossRef)],
        )),
        Arc::new(MockProvider::failing_transient("semantic_scholar")),
        Arc::new(MockProvider::failing_permanent("core")),
    ]);
    let pipeline = Pipeline::new(registry, fast_config());

    let request = SearchRequest::new(
        "graph neural networks",
        vec![
            "openalex".into(),
            "crossref".into(),
            "semantic_scholar".into(),
            "core".into(),
        ],
    )
    .ranking_mode(RankingMode::Default);

    let result = pipeline.search(&request).await.unwrap();

    // Two of four providers failed; the request still succeeds with the
    // survivors' papers and the failures recorded per provider.
    assert_eq!(result.papers.len(), 3);
    let stats = &result.aggregation_stats;
    assert_eq!(stats.total_collected, 3);
    assert_eq!(stats.providers.len(), 4);
    assert_eq!(
        stats.providers["semantic_scholar"]
            .failure
            .as_ref()
            .unwrap()
            .kind,
        FailureKind::Transient
    );
    assert_eq!(
        stats.providers["core"].failure.as_ref().unwrap().kind,
        FailureKind::Permanent
    );
    assert_eq!(stats.providers["openalex"].raw_count, 2);
}

#[tokio::test]
async fn duplicates_merge_into_the_most_complete_record() {
    // The same paper seen twice: the preprint server copy carries the
    // abstract, the citation index copy carries the count. The merged record
    // must carry both.
    let preprint = PaperBuilder::new("Neural Message Passing for Quantum Chemistry", SourceType::Arxiv)
        .abstract_text(
            "We reformulate existing models into a single common framework called \
             message passing neural networks for predicting molecular properties.",
        )
        .authors(vec!["J. Gilmer".into()])
        .year(2017)
        .url("https://arxiv.org/abs/1704.01212")
        .build();
    let indexed = PaperBuilder::new("Neural message passing for quantum chemistry", SourceType::SemanticScholar)
        .citations(4200)
        .doi("10.5555/3305381.3305512")
        .year(2017)
        .build();

    let registry = registry_with(vec![
        Arc::new(MockProvider::returning("arxiv", vec![preprint]).without_citations()),
        Arc::new(MockProvider::returning("semantic_scholar", vec![indexed])),
    ]);
    let pipeline = Pipeline::new(registry, fast_config());

    let request = SearchRequest::new(
        "neural message passing quantum chemistry",
        vec!["arxiv".into(), "semantic_scholar".into()],
    )
    .ranking_mode(RankingMode::Default);

    let result = pipeline.search(&request).await.unwrap();

    assert_eq!(result.aggregation_stats.total_collected, 2);
    assert_eq!(result.aggregation_stats.after_dedup, 1);
    assert_eq!(result.papers.len(), 1);

    let merged = &result.papers[0];
    assert!(merged.r#abstract.is_some());
    assert_eq!(merged.citations, Some(4200));
    assert_eq!(merged.doi.as_deref(), Some("10.5555/3305381.3305512"));
}

#[tokio::test]
async fn ai_mode_merges_model_order_with_full_records() {
    let registry = registry_with(vec![Arc::new(MockProvider::returning(
        "openalex",
        vec![
            rich_paper("Graph neural networks survey", SourceType::OpenAlex),
            rich_paper("Graph neural networks in chemistry", SourceType::OpenAlex),
            rich_paper("Graph neural networks benchmarks", SourceType::OpenAlex),
        ],
    ))]);
    let ranker = Arc::new(MockRanker::returning(vec![
        RankedEntry {
            title: "Graph neural networks in chemistry".into(),
            relevance_score: Some(95),
            explanation: Some("Closest match to the query domain".into()),
        },
        RankedEntry {
            title: "Graph neural networks survey".into(),
            relevance_score: Some(85),
            explanation: None,
        },
    ]));
    let pipeline = Pipeline::new(registry, fast_config()).with_ranker(Arc::clone(&ranker) as Arc<dyn AiRanker>);

    let request = SearchRequest::new("graph neural networks", vec!["openalex".into()]);
    let result = pipeline.search(&request).await.unwrap();

    assert_eq!(
        result.aggregation_stats.ranking_path,
        Some(RankingPath::AiRanked)
    );
    assert_eq!(result.papers.len(), 2);
    assert_eq!(result.papers[0].title, "Graph neural networks in chemistry");
    assert_eq!(
        result.papers[0].explanation.as_deref(),
        Some("Closest match to the query domain")
    );
}

#[tokio::test]
async fn ranker_failure_falls_back_to_heuristics() {
    let registry = registry_with(vec![Arc::new(MockProvider::returning(
        "semantic_scholar",
        vec![
            rich_paper("Graph neural networks survey", SourceType::SemanticScholar),
            rich_paper("Graph neural networks benchmarks", SourceType::SemanticScholar),
        ],
    ))]);
    let ranker = Arc::new(MockRanker::timing_out());
    let pipeline = Pipeline::new(registry, fast_config()).with_ranker(Arc::clone(&ranker) as Arc<dyn AiRanker>);

    let request = SearchRequest::new("graph neural networks", vec!["semantic_scholar".into()]);
    let result = pipeline.search(&request).await.unwrap();

    // One retry, then the heuristic ordering takes over.
    assert_eq!(ranker.calls(), 2);
    assert_eq!(
        result.aggregation_stats.ranking_path,
        Some(RankingPath::HeuristicFallback)
    );
    assert_eq!(result.papers.len(), 2);
}

#[tokio::test]
async fn failed_ai_output_equals_direct_composite_ranking() {
    let query = "graph neural networks";
    let mut papers = vec![
        rich_paper("Graph neural networks survey", SourceType::OpenAlex),
        rich_paper("Graph neural networks in chemistry", SourceType::OpenAlex),
        rich_paper("Graph neural networks benchmarks", SourceType::OpenAlex),
        rich_paper("Spectral methods on large graphs", SourceType::OpenAlex),
    ];
    // Distinct citation counts keep every composite score unique.
    for (i, paper) in papers.iter_mut().enumerate() {
        paper.citations = Some(10u32.pow(i as u32 + 1));
    }

    let registry = registry_with(vec![Arc::new(MockProvider::returning(
        "openalex",
        papers.clone(),
    ))]);
    let config = fast_config();
    let pipeline =
        Pipeline::new(registry, config.clone()).with_ranker(Arc::new(MockRanker::failing()));

    let request = SearchRequest::new(query, vec!["openalex".into()]).final_limit(3);
    let result = pipeline.search(&request).await.unwrap();
    assert_eq!(
        result.aggregation_stats.ranking_path,
        Some(RankingPath::HeuristicFallback)
    );

    // The degraded output must match invoking the heuristic ranker directly
    // on the same filtered candidate set, element for element.
    let filtered = scoring::pre_filter(query, papers, config.min_filter_score);
    let expected = ranking::rank_by_composite(query, filtered, 3, &config);

    let titles = |papers: &[Paper]| -> Vec<String> {
        papers.iter().map(|p| p.title.clone()).collect()
    };
    assert_eq!(titles(&result.papers), titles(&expected));
}

#[tokio::test]
async fn failed_ai_citations_mode_equals_direct_citation_ranking() {
    let query = "graph neural networks";
    let mut papers = vec![
        rich_paper("Graph neural networks survey", SourceType::SemanticScholar),
        rich_paper("Graph neural networks in chemistry", SourceType::SemanticScholar),
        rich_paper("Graph neural networks benchmarks", SourceType::SemanticScholar),
    ];
    papers[0].citations = Some(40);
    papers[1].citations = Some(4000);
    papers[2].citations = None;
    papers[2].year = Some(2024);

    let registry = registry_with(vec![Arc::new(MockProvider::returning(
        "semantic_scholar",
        papers.clone(),
    ))]);
    let config = fast_config();
    let pipeline =
        Pipeline::new(registry, config.clone()).with_ranker(Arc::new(MockRanker::failing()));

    let request = SearchRequest::new(query, vec!["semantic_scholar".into()])
        .ranking_mode(RankingMode::Citations);
    let result = pipeline.search(&request).await.unwrap();
    assert_eq!(
        result.aggregation_stats.ranking_path,
        Some(RankingPath::HeuristicFallback)
    );

    let filtered = scoring::pre_filter(query, papers, config.min_filter_score);
    let expected = ranking::rank_by_citations(filtered, 10);

    let keys = |papers: &[Paper]| -> Vec<(String, Option<u32>)> {
        papers.iter().map(|p| (p.title.clone(), p.citations)).collect()
    };
    assert_eq!(keys(&result.papers), keys(&expected));
    // Cited papers lead; the uncited record trails despite being newest.
    assert_eq!(result.papers[0].citations, Some(4000));
    assert_eq!(result.papers.last().unwrap().citations, None);
}

#[tokio::test]
async fn citations_mode_skips_citation_sparse_providers() {
    let arxiv = Arc::new(
        MockProvider::returning(
            "arxiv",
            vec![rich_paper("Graph neural networks preprint", SourceType::Arxiv)],
        )
        .without_citations(),
    );
    let semantic = Arc::new(
        MockProvider::returning(
            "semantic_scholar",
            vec![rich_paper("Graph neural networks indexed", SourceType::SemanticScholar)],
        )
        .with_citation_weight(2.0),
    );
    let providers: Vec<Arc<dyn Provider>> = vec![arxiv.clone(), semantic.clone()];
    let registry = registry_with(providers);
    let pipeline = Pipeline::new(registry, fast_config());

    let request = SearchRequest::new(
        "graph neural networks",
        vec!["arxiv".into(), "semantic_scholar".into()],
    )
    .ranking_mode(RankingMode::Citations);

    let result = pipeline.search(&request).await.unwrap();

    assert!(arxiv.last_limit().is_none(), "arxiv must not be queried");
    assert!(semantic.last_limit().is_some());
    assert!(!result.aggregation_stats.providers.contains_key("arxiv"));
    assert_eq!(result.papers.len(), 1);
}

#[tokio::test]
async fn empty_result_is_an_outcome_not_an_error() {
    let registry = registry_with(vec![
        Arc::new(MockProvider::failing_transient("arxiv")),
        Arc::new(MockProvider::failing_permanent("core")),
    ]);
    let pipeline = Pipeline::new(registry, fast_config());

    let request = SearchRequest::new("anything", vec!["arxiv".into(), "core".into()])
        .ranking_mode(RankingMode::Default);
    let result = pipeline.search(&request).await.unwrap();

    assert!(result.papers.is_empty());
    assert!(result.aggregation_stats.all_providers_failed());
    assert_eq!(result.query, "anything");
}

#[tokio::test]
async fn malformed_requests_are_rejected_before_any_provider_call() {
    let provider = Arc::new(MockProvider::returning("arxiv", Vec::new()));
    let providers: Vec<Arc<dyn Provider>> = vec![provider.clone()];
    let registry = registry_with(providers);
    let pipeline = Pipeline::new(registry, fast_config());

    let request = SearchRequest::new("", vec!["arxiv".into()]);
    let err = pipeline.search(&request).await.unwrap_err();

    assert!(matches!(err, PipelineError::Validation(_)));
    assert!(provider.last_limit().is_none());
}

#[tokio::test]
async fn result_serializes_with_stats_for_api_consumers() {
    let registry = registry_with(vec![Arc::new(MockProvider::returning(
        "crossref",
        vec![rich_paper("Graph neural networks survey", SourceType::CrossRef)],
    ))]);
    let pipeline = Pipeline::new(registry, fast_config());

    let request = SearchRequest::new("graph neural networks", vec!["crossref".into()])
        .ranking_mode(RankingMode::Default);
    let result = pipeline.search(&request).await.unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["query"], "graph neural networks");
    assert_eq!(json["ranking_mode"], "default");
    assert_eq!(json["aggregation_stats"]["total_collected"], 1);
    assert_eq!(
        json["aggregation_stats"]["ranking_path"],
        "heuristic-fallback"
    );
    assert_eq!(
        json["aggregation_stats"]["providers"]["crossref"]["raw_count"],
        1
    );
}
