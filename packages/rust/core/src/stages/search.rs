//! Web search stage.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use deepbrief_shared::Result;

use crate::capabilities::SearchProvider;
use crate::stage::{Stage, StageId};
use crate::state::PipelineState;

/// Runs the search capability with the refined query, falling back to the
/// raw topic when refinement failed upstream.
///
/// Also the routing point for quick mode: with `skip_content_fetch` set,
/// only the quick-summary branch is followed and the expensive
/// fetch/summarize branch never runs.
pub struct SearchStage {
    provider: Arc<dyn SearchProvider>,
}

impl SearchStage {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Stage for SearchStage {
    fn id(&self) -> StageId {
        StageId::Search
    }

    async fn execute(&self, state: PipelineState) -> Result<PipelineState> {
        let query = match state.optimized_query() {
            Some(q) => q.to_string(),
            None => {
                warn!("no refined query available, searching with the raw topic");
                state.topic().to_string()
            }
        };

        let response = self.provider.search(&query, state.result_count()).await?;
        info!(query = %query, results = response.results.len(), "search completed");

        Ok(state.with_search_results(response))
    }

    fn next_stages(&self, state: &PipelineState, declared: &[StageId]) -> Vec<StageId> {
        if state.skip_content_fetch() {
            info!("skip_content_fetch set, routing to quick summary only");
            return declared
                .iter()
                .copied()
                .filter(|id| *id == StageId::QuickSummary)
                .collect();
        }
        declared.to_vec()
    }

    fn progress_payload(&self, state: &PipelineState) -> Option<String> {
        state
            .search_results()
            .and_then(|results| serde_json::to_string(results).ok())
    }
}
