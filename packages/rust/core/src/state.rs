//! Immutable pipeline state.
//!
//! Every transition produces a new value through a `with_*` method; no
//! stage ever observes a partially-updated snapshot. The two shared
//! handles inside the state (the quick-summary slot and its task handle)
//! are write-once/take-once cells, not general mutable state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;

use deepbrief_shared::{SearchResponse, StructuredDocument};

use crate::progress::ProgressSink;
use crate::stage::StageId;

// ---------------------------------------------------------------------------
// Shared cells for the detached quick summary
// ---------------------------------------------------------------------------

/// Write-once slot the detached quick-summary task fills.
///
/// Cloning shares the underlying cell, so every state snapshot in a run
/// observes the same (eventual) value.
#[derive(Debug, Clone, Default)]
pub struct QuickSummarySlot(Arc<OnceLock<String>>);

impl QuickSummarySlot {
    /// Store the summary. A second write is ignored.
    pub fn set(&self, value: String) {
        let _ = self.0.set(value);
    }

    /// Read the summary if the detached task has finished.
    pub fn get(&self) -> Option<String> {
        self.0.get().cloned()
    }
}

/// Holder for the detached task's JoinHandle, taken once by the run layer.
#[derive(Debug, Clone, Default)]
pub(crate) struct DetachedTask(Arc<Mutex<Option<JoinHandle<()>>>>);

impl DetachedTask {
    fn store(&self, handle: JoinHandle<()>) {
        *self.0.lock().expect("detached task lock poisoned") = Some(handle);
    }

    fn take(&self) -> Option<JoinHandle<()>> {
        self.0.lock().expect("detached task lock poisoned").take()
    }
}

// ---------------------------------------------------------------------------
// PipelineState
// ---------------------------------------------------------------------------

/// Immutable snapshot of everything produced so far in one run.
#[derive(Debug, Clone)]
pub struct PipelineState {
    // Input
    topic: String,
    result_count: usize,
    skip_content_fetch: bool,

    // Derived
    optimized_query: Option<String>,
    search_results: Option<SearchResponse>,
    quick_summary: QuickSummarySlot,
    documents: Vec<StructuredDocument>,
    final_summary: Option<String>,

    // Bookkeeping
    stage_durations: HashMap<StageId, Duration>,
    stage_errors: HashMap<StageId, String>,
    started_at: Instant,
    current_stage: Option<StageId>,
    progress: Option<ProgressSink>,
    quick_summary_task: DetachedTask,
}

impl PipelineState {
    /// Initial state for a run. `result_count` is clamped to at least 1.
    pub fn new(topic: impl Into<String>, result_count: usize, skip_content_fetch: bool) -> Self {
        Self {
            topic: topic.into(),
            result_count: result_count.max(1),
            skip_content_fetch,
            optimized_query: None,
            search_results: None,
            quick_summary: QuickSummarySlot::default(),
            documents: Vec::new(),
            final_summary: None,
            stage_durations: HashMap::new(),
            stage_errors: HashMap::new(),
            started_at: Instant::now(),
            current_stage: None,
            progress: None,
            quick_summary_task: DetachedTask::default(),
        }
    }

    // --- accessors -------------------------------------------------------

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn result_count(&self) -> usize {
        self.result_count
    }

    pub fn skip_content_fetch(&self) -> bool {
        self.skip_content_fetch
    }

    pub fn optimized_query(&self) -> Option<&str> {
        self.optimized_query.as_deref()
    }

    pub fn search_results(&self) -> Option<&SearchResponse> {
        self.search_results.as_ref()
    }

    /// The quick summary, if the detached task has finished.
    pub fn quick_summary(&self) -> Option<String> {
        self.quick_summary.get()
    }

    pub fn documents(&self) -> &[StructuredDocument] {
        &self.documents
    }

    pub fn final_summary(&self) -> Option<&str> {
        self.final_summary.as_deref()
    }

    pub fn stage_durations(&self) -> &HashMap<StageId, Duration> {
        &self.stage_durations
    }

    pub fn stage_errors(&self) -> &HashMap<StageId, String> {
        &self.stage_errors
    }

    pub fn current_stage(&self) -> Option<StageId> {
        self.current_stage
    }

    /// Total elapsed time since the run started.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Whether a stage ran and finished without recording an error.
    pub fn has_completed(&self, id: StageId) -> bool {
        self.stage_durations.contains_key(&id) && !self.stage_errors.contains_key(&id)
    }

    pub fn progress_sink(&self) -> Option<&ProgressSink> {
        self.progress.as_ref()
    }

    /// Non-empty snippets from the search results, in hit order.
    pub fn search_snippets(&self) -> Vec<String> {
        self.search_results
            .as_ref()
            .map(|r| {
                r.results
                    .iter()
                    .filter_map(|hit| hit.snippet.as_deref())
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Clone of the shared quick-summary slot, for the detached task.
    pub fn quick_summary_slot(&self) -> QuickSummarySlot {
        self.quick_summary.clone()
    }

    pub(crate) fn store_quick_summary_task(&self, handle: JoinHandle<()>) {
        self.quick_summary_task.store(handle);
    }

    pub(crate) fn take_quick_summary_task(&self) -> Option<JoinHandle<()>> {
        self.quick_summary_task.take()
    }

    // --- copy-with-update transitions ------------------------------------

    pub fn with_progress_sink(mut self, sink: ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    pub fn with_optimized_query(mut self, query: impl Into<String>) -> Self {
        self.optimized_query = Some(query.into());
        self
    }

    pub fn with_search_results(mut self, results: SearchResponse) -> Self {
        self.search_results = Some(results);
        self
    }

    /// Set the collected documents, truncated to the requested count.
    pub fn with_documents(mut self, mut documents: Vec<StructuredDocument>) -> Self {
        documents.truncate(self.result_count);
        self.documents = documents;
        self
    }

    pub fn with_final_summary(mut self, summary: impl Into<String>) -> Self {
        self.final_summary = Some(summary.into());
        self
    }

    pub fn with_current_stage(mut self, id: StageId) -> Self {
        self.current_stage = Some(id);
        self
    }

    pub fn with_stage_duration(mut self, id: StageId, duration: Duration) -> Self {
        self.stage_durations.insert(id, duration);
        self
    }

    pub fn with_stage_error(mut self, id: StageId, message: impl Into<String>) -> Self {
        self.stage_errors.insert(id, message.into());
        self
    }
}
