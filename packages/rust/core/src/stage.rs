//! Stage identity and the stage contract.

use async_trait::async_trait;

use deepbrief_shared::Result;

use crate::progress::ProgressEventKind;
use crate::state::PipelineState;

/// Identities of the research workflow stages.
///
/// The string id doubles as the progress event name for the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    OptimizeQuery,
    Search,
    QuickSummary,
    FetchContent,
    Summarize,
}

impl StageId {
    /// Stable string id, also used in error messages and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OptimizeQuery => "optimizing_query",
            Self::Search => "searching",
            Self::QuickSummary => "quick_summary",
            Self::FetchContent => "fetching_content",
            Self::Summarize => "comprehensive_summary",
        }
    }

    /// Progress event kind emitted when this stage completes.
    pub fn event_kind(&self) -> ProgressEventKind {
        match self {
            Self::OptimizeQuery => ProgressEventKind::OptimizingQuery,
            Self::Search => ProgressEventKind::Searching,
            Self::QuickSummary => ProgressEventKind::QuickSummary,
            Self::FetchContent => ProgressEventKind::FetchingContent,
            Self::Summarize => ProgressEventKind::ComprehensiveSummary,
        }
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of the workflow graph.
///
/// `execute` is the business transformation only: the engine wraps every
/// call in a timed, error-capturing envelope, so implementations are free
/// to return errors without aborting the run. `next_stages` enables
/// conditional routing; returning an empty list makes the stage terminal
/// regardless of declared edges.
#[async_trait]
pub trait Stage: Send + Sync {
    /// This stage's identity.
    fn id(&self) -> StageId;

    /// Transform the state. Receives a complete snapshot, returns a
    /// complete snapshot.
    async fn execute(&self, state: PipelineState) -> Result<PipelineState>;

    /// Choose which of the statically declared edges to follow given the
    /// (possibly error-annotated) resulting state.
    fn next_stages(&self, _state: &PipelineState, declared: &[StageId]) -> Vec<StageId> {
        declared.to_vec()
    }

    /// Optional serialized payload for this stage's completion event.
    fn progress_payload(&self, _state: &PipelineState) -> Option<String> {
        None
    }
}
