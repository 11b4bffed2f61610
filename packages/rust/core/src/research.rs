//! End-to-end research runs: graph assembly, synchronous execution, and
//! the streaming variant.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, instrument, warn};

use deepbrief_fetch::ContentCollector;
use deepbrief_shared::{DeepBriefError, ResearchReport, Result, RunId};

use crate::capabilities::Capabilities;
use crate::engine::{StageGraph, StageGraphBuilder};
use crate::progress::{ProgressEvent, ProgressEventKind, ProgressSink};
use crate::stage::StageId;
use crate::stages::{
    FetchContentStage, OptimizeQueryStage, QuickSummaryStage, SearchStage, SummarizeStage,
};
use crate::state::PipelineState;

/// The assembled research workflow.
///
/// Built once and reused across runs; every run gets a fresh
/// [`PipelineState`].
pub struct Research {
    graph: Arc<StageGraph>,
}

impl Research {
    /// Assemble the default research graph:
    ///
    /// ```text
    /// optimize_query -> search -> quick_summary   (terminal, detached)
    ///                        \-> fetch_content -> summarize (terminal)
    /// ```
    pub fn new(capabilities: Capabilities, collector: Arc<ContentCollector>) -> Result<Self> {
        let graph = StageGraphBuilder::new(StageId::OptimizeQuery)
            .stage(Arc::new(OptimizeQueryStage::new(capabilities.refiner)))
            .stage(Arc::new(SearchStage::new(capabilities.search)))
            .stage(Arc::new(QuickSummaryStage::new(capabilities.quick)))
            .stage(Arc::new(FetchContentStage::new(collector)))
            .stage(Arc::new(SummarizeStage::new(capabilities.summarizer)))
            .edge(StageId::OptimizeQuery, StageId::Search)
            .edge(StageId::Search, StageId::QuickSummary)
            .edge(StageId::Search, StageId::FetchContent)
            .edge(StageId::FetchContent, StageId::Summarize)
            .build()?;

        Ok(Self {
            graph: Arc::new(graph),
        })
    }

    /// Run the workflow synchronously and return the final report.
    ///
    /// The detached quick summary is awaited before the report is
    /// assembled, so it is present here whenever its capability succeeded.
    #[instrument(skip(self))]
    pub async fn run(
        &self,
        topic: &str,
        result_count: usize,
        skip_content_fetch: bool,
    ) -> Result<ResearchReport> {
        let state = PipelineState::new(topic, result_count, skip_content_fetch);
        let final_state = self.graph.execute(state).await;
        finish(final_state).await
    }

    /// Run the workflow on a background task, streaming progress events.
    ///
    /// The stream is always terminated by exactly one `complete` event
    /// (payload: the serialized report) or one `error` event.
    pub fn run_streaming(
        &self,
        topic: &str,
        result_count: usize,
        skip_content_fetch: bool,
    ) -> UnboundedReceiver<ProgressEvent> {
        let (sink, rx) = ProgressSink::channel();
        let graph = self.graph.clone();
        let topic = topic.to_string();

        info!(%topic, result_count, skip_content_fetch, "starting streaming research run");

        tokio::spawn(async move {
            let state = PipelineState::new(&topic, result_count, skip_content_fetch)
                .with_progress_sink(sink.clone());
            let final_state = graph.execute(state).await;

            match finish(final_state).await {
                Ok(report) => {
                    let payload = serde_json::to_string(&report).ok();
                    sink.emit(ProgressEvent {
                        kind: ProgressEventKind::Complete,
                        payload,
                    });
                }
                Err(e) => {
                    sink.emit(ProgressEvent::with_payload(
                        ProgressEventKind::Error,
                        e.to_string(),
                    ));
                }
            }
        });

        rx
    }
}

/// Join the detached quick summary, classify unrecoverable failures, and
/// assemble the report.
async fn finish(state: PipelineState) -> Result<ResearchReport> {
    if let Some(handle) = state.take_quick_summary_task() {
        if let Err(e) = handle.await {
            warn!(error = %e, "detached quick summary task aborted");
        }
    }

    // Without search results nothing downstream had data to degrade onto;
    // surface this as a typed failure naming the originating stage.
    if state.search_results().is_none() {
        let message = state
            .stage_errors()
            .get(&StageId::Search)
            .cloned()
            .unwrap_or_else(|| "no search results produced".to_string());
        return Err(DeepBriefError::stage(StageId::Search.as_str(), message));
    }

    let report = ResearchReport {
        run_id: RunId::new(),
        topic: state.topic().to_string(),
        optimized_query: state.optimized_query().map(str::to_string),
        search_results: state
            .search_results()
            .map(|r| r.results.clone())
            .unwrap_or_default(),
        quick_summary: state.quick_summary(),
        documents: state.documents().to_vec(),
        final_summary: state.final_summary().map(str::to_string),
        completed_at: chrono::Utc::now(),
    };

    info!(
        run_id = %report.run_id,
        documents = report.documents.len(),
        has_final_summary = report.final_summary.is_some(),
        elapsed_ms = state.elapsed().as_millis() as u64,
        "research run finished"
    );

    Ok(report)
}
