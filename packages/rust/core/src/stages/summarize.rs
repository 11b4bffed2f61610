//! Comprehensive summary stage.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use deepbrief_extract::format_document;
use deepbrief_shared::Result;

use crate::capabilities::Summarizer;
use crate::stage::{Stage, StageId};
use crate::state::PipelineState;

/// Synthesizes the final summary from the collected documents.
///
/// When no documents survived collection the stage degrades to a clearly
/// labeled fallback built from whatever partial data exists, rather than
/// failing the run.
pub struct SummarizeStage {
    summarizer: Arc<dyn Summarizer>,
}

impl SummarizeStage {
    pub fn new(summarizer: Arc<dyn Summarizer>) -> Self {
        Self { summarizer }
    }
}

#[async_trait]
impl Stage for SummarizeStage {
    fn id(&self) -> StageId {
        StageId::Summarize
    }

    async fn execute(&self, state: PipelineState) -> Result<PipelineState> {
        let documents = state.documents();

        if documents.is_empty() {
            warn!("no documents available, emitting insufficient-data fallback");
            let mut fallback = String::from(
                "Unable to generate a comprehensive summary - insufficient data: \
                 no source documents could be fetched.",
            );
            if let Some(quick) = state.quick_summary() {
                fallback.push_str("\n\nQuick summary: ");
                fallback.push_str(&quick);
            }
            return Ok(state.with_final_summary(fallback));
        }

        let formatted: Vec<String> = documents.iter().map(format_document).collect();
        let source_urls: Vec<String> = documents.iter().map(|d| d.url.clone()).collect();

        info!(sources = documents.len(), "summarizing collected documents");
        let summary = self
            .summarizer
            .summarize(state.topic(), &formatted, &source_urls)
            .await?;

        Ok(state.with_final_summary(summary))
    }

    /// Terminal: the comprehensive summary ends the expensive branch.
    fn next_stages(&self, _state: &PipelineState, _declared: &[StageId]) -> Vec<StageId> {
        Vec::new()
    }

    fn progress_payload(&self, state: &PipelineState) -> Option<String> {
        state.final_summary().map(str::to_string)
    }
}

/// Prompt for the comprehensive summarizer over formatted documents.
pub fn build_research_prompt(topic: &str, documents: &[String], source_urls: &[String]) -> String {
    let mut prompt = String::new();
    prompt.push_str(&format!("Topic: {topic}\n\n"));
    prompt.push_str(&format!(
        "Please summarize the following {} sources about this topic:\n\n",
        documents.len()
    ));

    for (i, content) in documents.iter().enumerate() {
        prompt.push_str(&format!("--- Source {} ---\n", i + 1));
        prompt.push_str(content);
        prompt.push_str("\n\n");
    }

    if !source_urls.is_empty() {
        prompt.push_str("Sources:\n");
        for url in source_urls {
            prompt.push_str(&format!("- {url}\n"));
        }
        prompt.push('\n');
    }

    prompt.push_str("Based on these sources, provide a comprehensive summary of the topic.");
    prompt
}
