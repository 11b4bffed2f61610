//! The research workflow stages.

mod fetch_content;
mod optimize_query;
mod quick_summary;
mod search;
mod summarize;

pub use fetch_content::FetchContentStage;
pub use optimize_query::OptimizeQueryStage;
pub use quick_summary::{QuickSummaryStage, build_snippet_prompt};
pub use search::SearchStage;
pub use summarize::{SummarizeStage, build_research_prompt};
