//! Detached quick-summary stage.
//!
//! The fast preview is deliberately not awaited by the engine: `execute`
//! dispatches the summarizer call onto a background task and returns
//! immediately, so the expensive branch proceeds in parallel. The task
//! writes the shared write-once slot and pushes a `quick_summary` event;
//! the run layer awaits the stored handle before producing the final
//! report.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use deepbrief_shared::Result;

use crate::capabilities::QuickSummarizer;
use crate::progress::{ProgressEvent, ProgressEventKind};
use crate::stage::{Stage, StageId};
use crate::state::PipelineState;

/// Generates a preliminary summary from search snippets on a detached task.
pub struct QuickSummaryStage {
    summarizer: Arc<dyn QuickSummarizer>,
}

impl QuickSummaryStage {
    pub fn new(summarizer: Arc<dyn QuickSummarizer>) -> Self {
        Self { summarizer }
    }
}

#[async_trait]
impl Stage for QuickSummaryStage {
    fn id(&self) -> StageId {
        StageId::QuickSummary
    }

    async fn execute(&self, state: PipelineState) -> Result<PipelineState> {
        let snippets = state.search_snippets();
        let topic = state.topic().to_string();
        let summarizer = self.summarizer.clone();
        let slot = state.quick_summary_slot();
        let sink = state.progress_sink().cloned();

        info!(snippets = snippets.len(), "dispatching detached quick summary");

        let handle = tokio::spawn(async move {
            match summarizer.summarize(&topic, &snippets).await {
                Ok(summary) => {
                    slot.set(summary.clone());
                    if let Some(sink) = sink {
                        sink.emit(ProgressEvent::with_payload(
                            ProgressEventKind::QuickSummary,
                            summary,
                        ));
                    }
                }
                Err(e) => warn!(error = %e, "quick summary failed"),
            }
        });
        state.store_quick_summary_task(handle);

        Ok(state)
    }

    /// Terminal: the preview branch never routes further.
    fn next_stages(&self, _state: &PipelineState, _declared: &[StageId]) -> Vec<StageId> {
        Vec::new()
    }

    fn progress_payload(&self, state: &PipelineState) -> Option<String> {
        // Usually still empty at dispatch time; the detached task emits
        // the populated event itself.
        state.quick_summary()
    }
}

/// Prompt for the quick summarizer, built from raw snippets.
///
/// Owned by this stage rather than the capability so the template stays
/// ordinary, testable string formatting.
pub fn build_snippet_prompt(topic: &str, snippets: &[String]) -> String {
    let mut prompt = String::new();
    prompt.push_str(&format!("Topic: {topic}\n\n"));
    prompt.push_str(&format!(
        "Create a quick preliminary summary from these {} search snippets:\n\n",
        snippets.len()
    ));

    for (i, snippet) in snippets.iter().enumerate() {
        prompt.push_str(&format!("- Snippet {}: {snippet}\n", i + 1));
    }

    prompt.push_str(
        "\nProvide a brief preliminary summary using proper Markdown \
         (## for headings, blank lines before lists).\n\
         Note that this is based on snippets only.",
    );
    prompt
}
