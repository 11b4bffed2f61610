//! Query refinement stage.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use deepbrief_shared::Result;

use crate::capabilities::QueryRefiner;
use crate::stage::{Stage, StageId};
use crate::state::PipelineState;

/// Rewrites the user topic into a sharper search query via the injected
/// refiner capability.
pub struct OptimizeQueryStage {
    refiner: Arc<dyn QueryRefiner>,
}

impl OptimizeQueryStage {
    pub fn new(refiner: Arc<dyn QueryRefiner>) -> Self {
        Self { refiner }
    }
}

#[async_trait]
impl Stage for OptimizeQueryStage {
    fn id(&self) -> StageId {
        StageId::OptimizeQuery
    }

    async fn execute(&self, state: PipelineState) -> Result<PipelineState> {
        let optimized = self.refiner.refine(state.topic()).await?;
        info!(topic = state.topic(), query = %optimized, "query refined");
        Ok(state.with_optimized_query(optimized))
    }

    fn progress_payload(&self, state: &PipelineState) -> Option<String> {
        state.optimized_query().map(str::to_string)
    }
}
