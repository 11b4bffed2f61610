//! Progress events and the best-effort sink that carries them.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::warn;

/// Event type names exposed to stream consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEventKind {
    OptimizingQuery,
    Searching,
    QuickSummary,
    FetchingContent,
    ComprehensiveSummary,
    Complete,
    Error,
}

impl ProgressEventKind {
    /// Stable wire name of the event.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OptimizingQuery => "optimizing_query",
            Self::Searching => "searching",
            Self::QuickSummary => "quick_summary",
            Self::FetchingContent => "fetching_content",
            Self::ComprehensiveSummary => "comprehensive_summary",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for ProgressEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One progress push, optionally carrying a serialized payload.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub kind: ProgressEventKind,
    pub payload: Option<String>,
}

impl ProgressEvent {
    pub fn new(kind: ProgressEventKind) -> Self {
        Self {
            kind,
            payload: None,
        }
    }

    pub fn with_payload(kind: ProgressEventKind, payload: impl Into<String>) -> Self {
        Self {
            kind,
            payload: Some(payload.into()),
        }
    }
}

/// Best-effort sender for progress events.
///
/// Delivery failures (receiver gone) are logged and swallowed; they never
/// fail the run.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    tx: UnboundedSender<ProgressEvent>,
}

impl ProgressSink {
    /// Create a sink and the receiver a caller selects on.
    pub fn channel() -> (Self, UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Push one event, best-effort.
    pub fn emit(&self, event: ProgressEvent) {
        let kind = event.kind;
        if self.tx.send(event).is_err() {
            warn!(event = %kind, "progress receiver dropped, event discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_are_stable() {
        assert_eq!(ProgressEventKind::OptimizingQuery.as_str(), "optimizing_query");
        assert_eq!(ProgressEventKind::Searching.as_str(), "searching");
        assert_eq!(ProgressEventKind::QuickSummary.as_str(), "quick_summary");
        assert_eq!(ProgressEventKind::FetchingContent.as_str(), "fetching_content");
        assert_eq!(
            ProgressEventKind::ComprehensiveSummary.as_str(),
            "comprehensive_summary"
        );
        assert_eq!(ProgressEventKind::Complete.as_str(), "complete");
        assert_eq!(ProgressEventKind::Error.as_str(), "error");
    }

    #[tokio::test]
    async fn emit_after_receiver_drop_is_swallowed() {
        let (sink, rx) = ProgressSink::channel();
        drop(rx);
        // Must not panic or error.
        sink.emit(ProgressEvent::new(ProgressEventKind::Searching));
    }
}
