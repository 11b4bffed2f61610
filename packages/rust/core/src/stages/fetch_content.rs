//! Content fetch stage.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use deepbrief_fetch::ContentCollector;
use deepbrief_shared::Result;

use crate::stage::{Stage, StageId};
use crate::state::PipelineState;

/// Collects structured documents for the search hits via the batch
/// coordinator. Fan-out happens inside the collector; the engine only
/// sees the joined result.
pub struct FetchContentStage {
    collector: Arc<ContentCollector>,
}

impl FetchContentStage {
    pub fn new(collector: Arc<ContentCollector>) -> Self {
        Self { collector }
    }
}

#[async_trait]
impl Stage for FetchContentStage {
    fn id(&self) -> StageId {
        StageId::FetchContent
    }

    async fn execute(&self, state: PipelineState) -> Result<PipelineState> {
        let Some(results) = state.search_results() else {
            warn!("no search results available, nothing to fetch");
            return Ok(state);
        };

        let target = state.result_count();
        let documents = self.collector.collect(&results.results, target).await;
        info!(
            documents = documents.len(),
            target,
            "content collection done"
        );

        Ok(state.with_documents(documents))
    }

    fn progress_payload(&self, state: &PipelineState) -> Option<String> {
        serde_json::to_string(state.documents()).ok()
    }
}
