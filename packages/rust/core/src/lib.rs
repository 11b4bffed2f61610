//! Workflow execution engine and research stages for DeepBrief.
//!
//! This crate ties the pieces together: the immutable [`PipelineState`],
//! the [`Stage`] contract, the cycle-tolerant [`StageGraph`] engine with
//! progress streaming, the five research stages, and the public
//! [`Research`] entry points (`run` / `run_streaming`). Language-model
//! calls and the search transport are injected through [`Capabilities`].

pub mod capabilities;
pub mod engine;
pub mod progress;
pub mod research;
pub mod stage;
pub mod stages;
pub mod state;

pub use capabilities::{Capabilities, QueryRefiner, QuickSummarizer, SearchProvider, Summarizer};
pub use engine::{StageGraph, StageGraphBuilder};
pub use progress::{ProgressEvent, ProgressEventKind, ProgressSink};
pub use research::Research;
pub use stage::{Stage, StageId};
pub use state::{PipelineState, QuickSummarySlot};
