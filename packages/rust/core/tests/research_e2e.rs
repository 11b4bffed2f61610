//! End-to-end research runs with stub capabilities and a wiremock-backed
//! content collector.

use std::sync::Arc;

use async_trait::async_trait;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use deepbrief_core::{
    Capabilities, ProgressEventKind, QueryRefiner, QuickSummarizer, Research, SearchProvider,
    Summarizer,
};
use deepbrief_fetch::ContentCollector;
use deepbrief_shared::{
    DeepBriefError, FetchConfig, ResearchReport, Result, SearchHit, SearchResponse,
};

// ---------------------------------------------------------------------------
// Stub capabilities
// ---------------------------------------------------------------------------

struct StubRefiner;

#[async_trait]
impl QueryRefiner for StubRefiner {
    async fn refine(&self, topic: &str) -> Result<String> {
        Ok(format!("{topic} overview"))
    }
}

struct StubSearch {
    hits: Vec<SearchHit>,
}

#[async_trait]
impl SearchProvider for StubSearch {
    async fn search(&self, query: &str, _count: usize) -> Result<SearchResponse> {
        Ok(SearchResponse {
            query: query.to_string(),
            results: self.hits.clone(),
            suggestions: vec![],
        })
    }
}

struct FailingSearch;

#[async_trait]
impl SearchProvider for FailingSearch {
    async fn search(&self, _query: &str, _count: usize) -> Result<SearchResponse> {
        Err(DeepBriefError::Capability(
            "search backend unreachable".into(),
        ))
    }
}

struct StubQuickSummarizer;

#[async_trait]
impl QuickSummarizer for StubQuickSummarizer {
    async fn summarize(&self, topic: &str, snippets: &[String]) -> Result<String> {
        Ok(format!(
            "Preliminary answer on {topic} from {} snippets.",
            snippets.len()
        ))
    }
}

struct StubSummarizer;

#[async_trait]
impl Summarizer for StubSummarizer {
    async fn summarize(
        &self,
        topic: &str,
        documents: &[String],
        _source_urls: &[String],
    ) -> Result<String> {
        Ok(format!(
            "Comprehensive summary of {topic} from {} sources.",
            documents.len()
        ))
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn article_html(index: usize) -> String {
    format!(
        r#"<html><head><title>Source {index}</title></head><body>
        <article>
            <h2>Background</h2>
            <p>Background paragraph for source {index}, with enough words to comfortably pass the section minimum.</p>
            <h2>Findings</h2>
            <p>Findings paragraph for source {index}, also long enough that the document clears one hundred fifty characters overall.</p>
        </article>
        </body></html>"#
    )
}

async fn serve_articles(server: &MockServer, count: usize, broken: bool) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    for i in 0..count {
        let template = if broken {
            ResponseTemplate::new(500)
        } else {
            ResponseTemplate::new(200).set_body_string(article_html(i))
        };
        Mock::given(method("GET"))
            .and(path(format!("/page{i}")))
            .respond_with(template)
            .mount(server)
            .await;

        hits.push(SearchHit {
            url: format!("{}/page{i}", server.uri()),
            title: format!("Source {i}"),
            snippet: Some(format!("Snippet text for source {i}.")),
            engine: Some("duckduckgo".into()),
            score: Some(5.0 - i as f64 * 0.5),
        });
    }
    hits
}

fn research_with(search: Arc<dyn SearchProvider>) -> Research {
    let capabilities = Capabilities {
        refiner: Arc::new(StubRefiner),
        search,
        quick: Arc::new(StubQuickSummarizer),
        summarizer: Arc::new(StubSummarizer),
    };
    let collector = Arc::new(
        ContentCollector::new(&FetchConfig {
            concurrency: 4,
            timeout_secs: 5,
        })
        .unwrap(),
    );
    Research::new(capabilities, collector).unwrap()
}

// ---------------------------------------------------------------------------
// Synchronous runs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_run_produces_documents_and_both_summaries() {
    let server = MockServer::start().await;
    let hits = serve_articles(&server, 5, false).await;
    let research = research_with(Arc::new(StubSearch { hits }));

    let report = research.run("quantum computing", 3, false).await.unwrap();

    assert_eq!(report.topic, "quantum computing");
    assert_eq!(
        report.optimized_query.as_deref(),
        Some("quantum computing overview")
    );
    assert_eq!(report.search_results.len(), 5);
    assert_eq!(report.documents.len(), 3);
    for doc in &report.documents {
        assert!(!doc.sections.is_empty());
        assert_eq!(doc.engine.as_deref(), Some("duckduckgo"));
    }
    // The detached quick summary is joined before the report is assembled.
    assert!(
        report
            .quick_summary
            .as_deref()
            .is_some_and(|s| s.contains("5 snippets"))
    );
    assert_eq!(
        report.final_summary.as_deref(),
        Some("Comprehensive summary of quantum computing from 3 sources.")
    );
}

#[tokio::test]
async fn quick_mode_skips_fetch_and_comprehensive_summary() {
    let server = MockServer::start().await;
    let hits = serve_articles(&server, 3, false).await;
    let research = research_with(Arc::new(StubSearch { hits }));

    let report = research.run("rust traits", 3, true).await.unwrap();

    assert!(report.documents.is_empty());
    assert!(report.final_summary.is_none());
    assert!(report.quick_summary.is_some());
    assert_eq!(report.search_results.len(), 3);
}

#[tokio::test]
async fn summary_degrades_when_no_documents_survive() {
    let server = MockServer::start().await;
    let hits = serve_articles(&server, 4, true).await;
    let research = research_with(Arc::new(StubSearch { hits }));

    let report = research.run("obscure topic", 2, false).await.unwrap();

    assert!(report.documents.is_empty());
    let summary = report.final_summary.expect("fallback summary present");
    assert!(summary.contains("insufficient data"));
}

#[tokio::test]
async fn search_failure_surfaces_as_typed_stage_error() {
    let research = research_with(Arc::new(FailingSearch));

    let err = research.run("anything", 2, false).await.unwrap_err();
    match err {
        DeepBriefError::Stage { stage, message } => {
            assert_eq!(stage, "searching");
            assert!(message.contains("unreachable"));
        }
        other => panic!("expected stage error, got: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Streaming runs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn streaming_run_ends_with_complete_event() {
    let server = MockServer::start().await;
    let hits = serve_articles(&server, 4, false).await;
    let research = research_with(Arc::new(StubSearch { hits }));

    let mut rx = research.run_streaming("quantum computing", 2, false);
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    let kinds: Vec<ProgressEventKind> = events.iter().map(|e| e.kind).collect();
    assert!(kinds.contains(&ProgressEventKind::OptimizingQuery));
    assert!(kinds.contains(&ProgressEventKind::Searching));
    assert!(kinds.contains(&ProgressEventKind::FetchingContent));
    assert!(kinds.contains(&ProgressEventKind::ComprehensiveSummary));

    // The stream terminates with exactly one complete event.
    let last = events.last().unwrap();
    assert_eq!(last.kind, ProgressEventKind::Complete);
    assert_eq!(
        kinds
            .iter()
            .filter(|k| **k == ProgressEventKind::Complete)
            .count(),
        1
    );

    // The quick summary arrived (with payload) before the terminal event.
    let quick_with_payload = events
        .iter()
        .position(|e| e.kind == ProgressEventKind::QuickSummary && e.payload.is_some());
    assert!(quick_with_payload.is_some());
    assert!(quick_with_payload.unwrap() < events.len() - 1);

    // The terminal payload is the serialized report.
    let report: ResearchReport =
        serde_json::from_str(last.payload.as_deref().unwrap()).expect("report payload");
    assert_eq!(report.documents.len(), 2);
    assert!(report.final_summary.is_some());
}

#[tokio::test]
async fn streaming_search_failure_ends_with_error_event() {
    let research = research_with(Arc::new(FailingSearch));

    let mut rx = research.run_streaming("anything", 2, false);
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    let last = events.last().expect("stream not empty");
    assert_eq!(last.kind, ProgressEventKind::Error);
    assert!(last.payload.as_deref().unwrap().contains("searching"));
}
