//! Core domain types for DeepBrief research runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for research run identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Search results
// ---------------------------------------------------------------------------

/// One search engine hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Result URL.
    pub url: String,
    /// Result title.
    pub title: String,
    /// Snippet / abstract text shown by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// Name of the engine that produced this hit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    /// Relevance score assigned by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// An ordered page of search results for one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The query that was executed.
    pub query: String,
    /// Ordered hits, best first.
    pub results: Vec<SearchHit>,
    /// Engine-suggested alternative queries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

// ---------------------------------------------------------------------------
// Structured documents
// ---------------------------------------------------------------------------

/// A subsection nested under a [`Section`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subsection {
    /// Subsection heading text.
    pub heading: String,
    /// Rich-text (Markdown) content.
    pub content: String,
}

/// One section of a structured document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Section heading text.
    pub heading: String,
    /// Rich-text (Markdown) content appearing before any subsection.
    pub content: String,
    /// Nested subsections in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subsections: Vec<Subsection>,
}

impl Section {
    /// Character count of this section including nested subsections.
    pub fn total_chars(&self) -> usize {
        self.content.chars().count()
            + self
                .subsections
                .iter()
                .map(|s| s.content.chars().count())
                .sum::<usize>()
    }
}

/// Hierarchical, quality-filtered representation of one fetched page.
///
/// Created once by the structurer, optionally enriched with search
/// metadata by URL match, immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredDocument {
    /// Original page URL (before any mirror rewriting).
    pub url: String,
    /// Page title from document metadata.
    pub title: String,
    /// Single top-level heading, extracted once and removed from the body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_heading: Option<String>,
    /// Surviving sections in document order.
    pub sections: Vec<Section>,
    /// Aggregate character count across sections and subsections.
    pub total_chars: usize,
    /// Whether heading structure was found (false = unstructured fallback).
    pub has_structure: bool,
    /// Engine name, filled in from search metadata after extraction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    /// Engine score, filled in from search metadata after extraction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl StructuredDocument {
    /// Return a copy enriched with search-ranking metadata.
    pub fn with_search_meta(mut self, engine: Option<String>, score: Option<f64>) -> Self {
        self.engine = engine;
        self.score = score;
        self
    }
}

// ---------------------------------------------------------------------------
// Final report
// ---------------------------------------------------------------------------

/// The externally observed result of one research run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchReport {
    /// Unique identifier for this run.
    pub run_id: RunId,
    /// The user's original topic.
    pub topic: String,
    /// Refined search query, if refinement succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimized_query: Option<String>,
    /// Search hits in engine order.
    pub search_results: Vec<SearchHit>,
    /// Fast preview summary built from snippets only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_summary: Option<String>,
    /// Structured documents accepted by the fetch coordinator.
    pub documents: Vec<StructuredDocument>,
    /// Comprehensive summary synthesized from the documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_summary: Option<String>,
    /// When the run finished.
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_roundtrip() {
        let id = RunId::new();
        let s = id.to_string();
        let parsed: RunId = s.parse().expect("parse RunId");
        assert_eq!(id, parsed);
    }

    #[test]
    fn section_total_chars_includes_subsections() {
        let section = Section {
            heading: "Overview".into(),
            content: "abcde".into(),
            subsections: vec![Subsection {
                heading: "Details".into(),
                content: "fghij".into(),
            }],
        };
        assert_eq!(section.total_chars(), 10);
    }

    #[test]
    fn document_serialization_roundtrip() {
        let doc = StructuredDocument {
            url: "https://example.com/article".into(),
            title: "Example Article".into(),
            main_heading: Some("Example".into()),
            sections: vec![Section {
                heading: "Introduction".into(),
                content: "Some intro text that is long enough to matter.".into(),
                subsections: vec![],
            }],
            total_chars: 46,
            has_structure: true,
            engine: Some("duckduckgo".into()),
            score: Some(1.5),
        };

        let json = serde_json::to_string(&doc).expect("serialize");
        let parsed: StructuredDocument = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, doc);
    }

    #[test]
    fn search_hit_optional_fields_default() {
        let json = r#"{"url":"https://example.com","title":"Example"}"#;
        let hit: SearchHit = serde_json::from_str(json).expect("deserialize");
        assert!(hit.snippet.is_none());
        assert!(hit.engine.is_none());
        assert!(hit.score.is_none());
    }
}
