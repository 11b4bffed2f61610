//! Capability interfaces consumed by the pipeline stages.
//!
//! The core treats language-model calls and the search transport as
//! opaque text-in/text-out collaborators: implementations live outside
//! this workspace and are injected at graph construction time. Stages own
//! their prompt templates (see the stage modules); implementations only
//! see the final signatures below.

use std::sync::Arc;

use async_trait::async_trait;

use deepbrief_shared::{Result, SearchResponse};

/// Rewrites a user topic into a sharper search query.
#[async_trait]
pub trait QueryRefiner: Send + Sync {
    async fn refine(&self, topic: &str) -> Result<String>;
}

/// Executes a web search, returning up to `count` ordered hits.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, count: usize) -> Result<SearchResponse>;
}

/// Produces a fast preliminary summary from search snippets alone.
#[async_trait]
pub trait QuickSummarizer: Send + Sync {
    async fn summarize(&self, topic: &str, snippets: &[String]) -> Result<String>;
}

/// Produces the comprehensive summary from formatted document texts.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        topic: &str,
        documents: &[String],
        source_urls: &[String],
    ) -> Result<String>;
}

/// The full set of capabilities a research graph needs.
#[derive(Clone)]
pub struct Capabilities {
    pub refiner: Arc<dyn QueryRefiner>,
    pub search: Arc<dyn SearchProvider>,
    pub quick: Arc<dyn QuickSummarizer>,
    pub summarizer: Arc<dyn Summarizer>,
}
