//! Document structurer: raw HTML → hierarchical, quality-filtered sections.
//!
//! The extraction pipeline is a pure function over one page:
//!
//! 1. Select the primary content container (semantic containers → known
//!    content classes → largest text block → body), skipping site chrome.
//! 2. Pick the heading level that demarcates sections (h2 vs h3
//!    heuristic), or fall back to a single unstructured section.
//! 3. Assign content per section via sibling walk or document-order
//!    fallback, converting elements to Markdown along the way.
//! 4. Drop sections below the minimum length and total up what survives.
//!
//! URL pre-filtering and mirror rewriting live in [`prefilter`] and are
//! applied by the fetch coordinator before any HTTP work.

mod content;
pub mod formatter;
mod markdown;
mod noise;
pub mod prefilter;
mod sections;

use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use deepbrief_shared::StructuredDocument;

use crate::markdown::{MarkdownConverter, collapse_ws};
use crate::sections::{
    extract_sections, filter_quality, headings_at, select_heading_level, unstructured_section,
};

pub use crate::formatter::format_document;

/// Structure one fetched page.
///
/// Returns `None` only when the page yields nothing workable; a document
/// with zero surviving sections is still returned and must be discarded
/// by the caller (the fetch coordinator checks both sections and total
/// length).
pub fn structure(html: &str, url: &str) -> Option<StructuredDocument> {
    if html.trim().is_empty() {
        return None;
    }

    let doc = Html::parse_document(html);
    let parsed_url = Url::parse(url).ok();
    let host = parsed_url.as_ref().and_then(|u| u.host_str());

    let title = extract_title(&doc);
    let (main_heading, excluded) = extract_main_heading(&doc);
    let conv = MarkdownConverter::new(excluded);

    let mut container = content::find_main_content(&doc, host);
    let mut h2 = headings_at(container, "h2");
    let mut h3 = headings_at(container, "h3");

    // Some sites spread content across divs outside the chosen container;
    // if it has no headings at all, retry against the whole body.
    if h2.is_empty() && h3.is_empty() {
        let body = content::body_or_root(&doc);
        if body.id() != container.id() {
            let body_h2 = headings_at(body, "h2");
            let body_h3 = headings_at(body, "h3");
            if !body_h2.is_empty() || !body_h3.is_empty() {
                debug!(
                    url,
                    h2 = body_h2.len(),
                    h3 = body_h3.len(),
                    "no headings in container, widening to body"
                );
                container = body;
                h2 = body_h2;
                h3 = body_h3;
            }
        }
    }

    let (sections, has_structure) = match select_heading_level(&h2, &h3) {
        Some(level) => {
            let headings = match level {
                sections::HeadingLevel::H2 => &h2,
                sections::HeadingLevel::H3 => &h3,
            };
            (extract_sections(container, headings, level, &conv), true)
        }
        None => (vec![unstructured_section(container, &conv)], false),
    };

    let sections = filter_quality(sections);
    let total_chars: usize = sections.iter().map(|s| s.total_chars()).sum();

    debug!(
        url,
        sections = sections.len(),
        total_chars,
        has_structure,
        "structured page"
    );

    Some(StructuredDocument {
        url: url.to_string(),
        title,
        main_heading,
        sections,
        total_chars,
        has_structure,
        engine: None,
        score: None,
    })
}

/// Page title from `<title>`, defaulting to "Untitled".
fn extract_title(doc: &Html) -> String {
    let title_sel = Selector::parse("title").unwrap();
    doc.select(&title_sel)
        .next()
        .map(|t| collapse_ws(&t.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Untitled".to_string())
}

/// First h1 outside site chrome, extracted once so the body emission never
/// repeats it.
fn extract_main_heading(doc: &Html) -> (Option<String>, Option<ego_tree::NodeId>) {
    let h1_sel = Selector::parse("h1").unwrap();
    doc.select(&h1_sel)
        .find(|h| !noise::has_noise_ancestor(h))
        .map(|h| {
            (
                Some(collapse_ws(&h.text().collect::<String>())),
                Some(h.id()),
            )
        })
        .unwrap_or((None, None))
}
