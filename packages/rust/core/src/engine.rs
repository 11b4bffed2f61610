//! Stage graph and its execution engine.
//!
//! The engine traverses the graph with a FIFO queue and a visited set:
//! cycles in the static edge set are tolerated (each stage id runs at most
//! once per run), a missing stage implementation is a warning rather than
//! a failure, and every `execute` call runs inside a timed,
//! error-capturing envelope. A failing stage annotates the state and the
//! run continues; downstream stages see the missing data and degrade.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use deepbrief_shared::{DeepBriefError, Result};

use crate::progress::ProgressEvent;
use crate::stage::{Stage, StageId};
use crate::state::PipelineState;

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Assembles a [`StageGraph`] from stages and directed edges.
pub struct StageGraphBuilder {
    entry: StageId,
    stages: HashMap<StageId, Arc<dyn Stage>>,
    edges: HashMap<StageId, Vec<StageId>>,
}

impl StageGraphBuilder {
    /// Start a graph with the given entry stage.
    pub fn new(entry: StageId) -> Self {
        Self {
            entry,
            stages: HashMap::new(),
            edges: HashMap::new(),
        }
    }

    /// Register a stage under its own id.
    pub fn stage(mut self, stage: Arc<dyn Stage>) -> Self {
        self.stages.insert(stage.id(), stage);
        self
    }

    /// Declare a directed edge.
    pub fn edge(mut self, from: StageId, to: StageId) -> Self {
        self.edges.entry(from).or_default().push(to);
        self
    }

    /// Validate and build the graph.
    ///
    /// The entry stage must be registered. Stages unreachable from the
    /// entry are warned about but allowed (routing may never reach them by
    /// design).
    pub fn build(self) -> Result<StageGraph> {
        if !self.stages.contains_key(&self.entry) {
            return Err(DeepBriefError::validation(format!(
                "entry stage '{}' is not registered",
                self.entry
            )));
        }

        // Reachability walk over the static edge set.
        let mut reachable: HashSet<StageId> = HashSet::new();
        let mut queue = VecDeque::from([self.entry]);
        while let Some(id) = queue.pop_front() {
            if !reachable.insert(id) {
                continue;
            }
            if let Some(next) = self.edges.get(&id) {
                queue.extend(next.iter().copied());
            }
        }
        for id in self.stages.keys() {
            if !reachable.contains(id) {
                warn!(stage = %id, "stage is not reachable from the entry stage");
            }
        }

        let edge_count: usize = self.edges.values().map(Vec::len).sum();
        info!(
            stages = self.stages.len(),
            edges = edge_count,
            reachable = reachable.len(),
            "stage graph built"
        );

        Ok(StageGraph {
            entry: self.entry,
            stages: self.stages,
            edges: self.edges,
        })
    }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// A conditional workflow graph over [`Stage`] implementations.
pub struct StageGraph {
    entry: StageId,
    stages: HashMap<StageId, Arc<dyn Stage>>,
    edges: HashMap<StageId, Vec<StageId>>,
}

impl StageGraph {
    /// The designated entry stage.
    pub fn entry(&self) -> StageId {
        self.entry
    }

    /// Statically declared outgoing edges of a stage.
    pub fn edges_of(&self, id: StageId) -> &[StageId] {
        self.edges.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Execute the graph to completion and return the final state.
    ///
    /// Single-threaded and deterministic given deterministic stage
    /// outputs: one stage at a time, strictly in queue order.
    #[instrument(skip_all, fields(topic = %initial.topic()))]
    pub async fn execute(&self, initial: PipelineState) -> PipelineState {
        let mut state = initial;
        let mut visited: HashSet<StageId> = HashSet::new();
        let mut queue: VecDeque<StageId> = VecDeque::from([self.entry]);

        while let Some(id) = queue.pop_front() {
            if visited.contains(&id) {
                debug!(stage = %id, "already executed in this run, skipping");
                continue;
            }

            let Some(stage) = self.stages.get(&id) else {
                warn!(stage = %id, "no implementation registered, skipping");
                visited.insert(id);
                continue;
            };

            info!(stage = %id, "executing stage");
            let input = state.clone();
            let start = Instant::now();

            state = match stage.execute(state).await {
                Ok(next) => {
                    let elapsed = start.elapsed();
                    info!(stage = %id, elapsed_ms = elapsed.as_millis() as u64, "stage completed");
                    next.with_current_stage(id).with_stage_duration(id, elapsed)
                }
                Err(e) => {
                    let elapsed = start.elapsed();
                    warn!(
                        stage = %id,
                        elapsed_ms = elapsed.as_millis() as u64,
                        error = %e,
                        "stage failed, continuing with prior state"
                    );
                    input
                        .with_current_stage(id)
                        .with_stage_duration(id, elapsed)
                        .with_stage_error(id, e.to_string())
                }
            };
            visited.insert(id);

            // Best-effort progress push after every completion, success or error.
            if let Some(sink) = state.progress_sink() {
                sink.emit(ProgressEvent {
                    kind: id.event_kind(),
                    payload: stage.progress_payload(&state),
                });
            }

            let chosen = stage.next_stages(&state, self.edges_of(id));
            if chosen.is_empty() {
                debug!(stage = %id, "terminal stage");
            } else {
                debug!(stage = %id, next = ?chosen, "routing");
                queue.extend(chosen);
            }
        }

        info!(
            stages_run = visited.len(),
            elapsed_ms = state.elapsed().as_millis() as u64,
            errors = state.stage_errors().len(),
            "graph execution complete"
        );
        for (id, duration) in state.stage_durations() {
            debug!(stage = %id, elapsed_ms = duration.as_millis() as u64, "stage timing");
        }
        for (id, error) in state.stage_errors() {
            warn!(stage = %id, error = %error, "stage error recorded");
        }

        state
    }
}
