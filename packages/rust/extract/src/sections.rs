//! Section and subsection assembly.
//!
//! Given the chosen content container, this module decides which heading
//! level demarcates sections, emits one section per heading (plus an
//! "Introduction" pseudo-section for content before the first heading),
//! assigns content either by sibling walk or by document-order fallback,
//! and applies the minimum-length quality filter.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use ego_tree::NodeId;
use regex::Regex;
use scraper::{ElementRef, Selector};

use deepbrief_shared::{Section, Subsection};

use crate::markdown::{
    MAX_CONTENT_LENGTH, MAX_SECTION_LENGTH, MarkdownConverter, collapse_ws, truncate_chars,
};
use crate::noise;

/// Minimum character count for a section or subsection to survive.
pub(crate) const MIN_SECTION_CHARS: usize = 50;

// ---------------------------------------------------------------------------
// Heading level selection
// ---------------------------------------------------------------------------

/// The heading level chosen to demarcate article sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeadingLevel {
    H2,
    H3,
}

impl HeadingLevel {
    /// Headings that end the current section during a sibling walk
    /// (the same level and anything shallower).
    fn boundary_tags(self) -> &'static [&'static str] {
        match self {
            Self::H2 => &["h1", "h2"],
            Self::H3 => &["h1", "h2", "h3"],
        }
    }

    /// Headings that open a nested subsection during a sibling walk.
    fn subheading_tags(self) -> &'static [&'static str] {
        match self {
            Self::H2 => &["h3", "h4"],
            Self::H3 => &["h4", "h5"],
        }
    }
}

/// Collect headings of one tag inside the container, in document order,
/// skipping headings buried in site chrome.
pub(crate) fn headings_at<'a>(container: ElementRef<'a>, tag: &str) -> Vec<ElementRef<'a>> {
    let sel = Selector::parse(tag).unwrap();
    container
        .select(&sel)
        .filter(|h| !noise::has_noise_ancestor(h))
        .collect()
}

/// Choose which heading level demarcates sections.
///
/// When both levels exist, prefer h3 when h3s outnumber h2s by 3x, or when
/// fewer than 70% of h2 texts are unique (repeated h2s signal navigation
/// or form chrome rather than article structure).
pub(crate) fn select_heading_level(
    h2: &[ElementRef<'_>],
    h3: &[ElementRef<'_>],
) -> Option<HeadingLevel> {
    match (h2.is_empty(), h3.is_empty()) {
        (true, true) => None,
        (false, true) => Some(HeadingLevel::H2),
        (true, false) => Some(HeadingLevel::H3),
        (false, false) => {
            let unique: HashSet<String> = h2
                .iter()
                .map(|h| collapse_ws(&h.text().collect::<String>()))
                .collect();
            let repetitive = (unique.len() as f64) < (h2.len() as f64) * 0.7;

            if h3.len() >= h2.len() * 3 || repetitive {
                tracing::debug!(
                    h2 = h2.len(),
                    h3 = h3.len(),
                    unique_h2 = unique.len(),
                    "selected h3 headings"
                );
                Some(HeadingLevel::H3)
            } else {
                Some(HeadingLevel::H2)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Structured extraction
// ---------------------------------------------------------------------------

/// Emit one section per heading, preceded by an optional introduction
/// pseudo-section for content before the first heading.
pub(crate) fn extract_sections(
    container: ElementRef<'_>,
    headings: &[ElementRef<'_>],
    level: HeadingLevel,
    conv: &MarkdownConverter,
) -> Vec<Section> {
    let mut sections = Vec::new();

    if let Some(first) = headings.first() {
        if let Some(intro) = intro_section(container, *first, conv) {
            sections.push(intro);
        }
    }

    for (idx, heading) in headings.iter().enumerate() {
        sections.push(extract_single_section(
            *heading, idx, container, headings, level, conv,
        ));
    }

    sections
}

/// Content appearing before the first heading, as an "Introduction"
/// pseudo-section. Kept only when it meets the minimum length after
/// encyclopedia intro cleanup.
fn intro_section(
    container: ElementRef<'_>,
    first_heading: ElementRef<'_>,
    conv: &MarkdownConverter,
) -> Option<Section> {
    let mut intro = String::new();

    for child in container.children().filter_map(ElementRef::wrap) {
        // Stop at the child that is (or contains) the first heading.
        if child.id() == first_heading.id()
            || first_heading.ancestors().any(|a| a.id() == child.id())
        {
            break;
        }
        if matches!(
            child.value().name(),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
        ) {
            continue;
        }
        let md = conv.element_to_markdown(child);
        if !md.is_empty() {
            intro.push_str(&md);
            intro.push_str("\n\n");
        }
    }

    let text = clean_encyclopedia_intro(intro.trim());
    if text.chars().count() >= MIN_SECTION_CHARS {
        Some(Section {
            heading: "Introduction".to_string(),
            content: truncate_chars(&text, MAX_SECTION_LENGTH),
            subsections: Vec::new(),
        })
    } else {
        None
    }
}

/// Build one section for a heading, choosing between the sibling walk and
/// the document-order fallback.
fn extract_single_section(
    heading: ElementRef<'_>,
    idx: usize,
    container: ElementRef<'_>,
    headings: &[ElementRef<'_>],
    level: HeadingLevel,
    conv: &MarkdownConverter,
) -> Section {
    if !has_usable_siblings(heading, level) {
        // Deeply nested layout: headings have no content siblings.
        return extract_section_by_position(heading, idx, container, headings, conv);
    }

    let heading_text = collapse_ws(&heading.text().collect::<String>());
    let mut content = String::new();
    let mut subsections: Vec<Subsection> = Vec::new();
    let mut current_sub: Option<(String, String)> = None;

    for node in heading.next_siblings() {
        let Some(el) = ElementRef::wrap(node) else {
            continue;
        };
        let tag = el.value().name();

        if level.boundary_tags().contains(&tag) {
            break;
        }

        if level.subheading_tags().contains(&tag) {
            if let Some((sub_heading, sub_content)) = current_sub.take() {
                push_subsection(&mut subsections, sub_heading, sub_content);
            }
            current_sub = Some((collapse_ws(&el.text().collect::<String>()), String::new()));
            continue;
        }

        let md = conv.element_to_markdown(el);
        if md.is_empty() {
            continue;
        }
        match &mut current_sub {
            Some((_, sub_content)) => {
                sub_content.push_str(&md);
                sub_content.push_str("\n\n");
            }
            None => {
                content.push_str(&md);
                content.push_str("\n\n");
            }
        }
    }

    if let Some((sub_heading, sub_content)) = current_sub.take() {
        push_subsection(&mut subsections, sub_heading, sub_content);
    }

    Section {
        heading: heading_text,
        content: truncate_chars(content.trim(), MAX_SECTION_LENGTH),
        subsections,
    }
}

fn push_subsection(subsections: &mut Vec<Subsection>, heading: String, content: String) {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return;
    }
    subsections.push(Subsection {
        heading,
        content: truncate_chars(trimmed, MAX_SECTION_LENGTH),
    });
}

/// Whether the heading has any non-empty following sibling before the next
/// section boundary.
fn has_usable_siblings(heading: ElementRef<'_>, level: HeadingLevel) -> bool {
    for node in heading.next_siblings() {
        let Some(el) = ElementRef::wrap(node) else {
            continue;
        };
        if level.boundary_tags().contains(&el.value().name()) {
            return false;
        }
        if noise::is_noise(&el) {
            continue;
        }
        if !el.text().collect::<String>().trim().is_empty() {
            return true;
        }
    }
    false
}

/// Document-order fallback for deeply nested layouts: collect all
/// content-bearing elements under the container and keep those positioned
/// between this heading and the next one.
///
/// Ordering uses a pre-order position index over the container's subtree,
/// not serialized-markup search, so duplicate fragments cannot collide.
fn extract_section_by_position(
    heading: ElementRef<'_>,
    idx: usize,
    container: ElementRef<'_>,
    headings: &[ElementRef<'_>],
    conv: &MarkdownConverter,
) -> Section {
    let heading_text = collapse_ws(&heading.text().collect::<String>());

    let positions: HashMap<NodeId, usize> = container
        .descendants()
        .enumerate()
        .map(|(i, node)| (node.id(), i))
        .collect();

    let Some(&here) = positions.get(&heading.id()) else {
        return Section {
            heading: heading_text,
            content: String::new(),
            subsections: Vec::new(),
        };
    };
    let next = headings
        .get(idx + 1)
        .and_then(|h| positions.get(&h.id()).copied());

    let content_sel = Selector::parse("p, ul, ol, blockquote, pre, table").unwrap();
    let mut content = String::new();

    for el in container.select(&content_sel) {
        if noise::has_noise_ancestor(&el) {
            continue;
        }
        let Some(&pos) = positions.get(&el.id()) else {
            continue;
        };
        if pos > here && next.is_none_or(|n| pos < n) {
            let md = conv.element_to_markdown(el);
            if !md.is_empty() {
                content.push_str(&md);
                content.push_str("\n\n");
            }
        }
    }

    Section {
        heading: heading_text,
        content: truncate_chars(content.trim(), MAX_SECTION_LENGTH),
        subsections: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Unstructured fallback
// ---------------------------------------------------------------------------

/// Emit one section holding the whole container when no usable heading
/// level exists, trimmed of leading/trailing boilerplate lines.
pub(crate) fn unstructured_section(
    container: ElementRef<'_>,
    conv: &MarkdownConverter,
) -> Section {
    let mut md = String::new();
    for child in container.children().filter_map(ElementRef::wrap) {
        let part = conv.element_to_markdown(child);
        if !part.is_empty() {
            md.push_str(&part);
            md.push_str("\n\n");
        }
    }

    let text = strip_junk_from_ends(md.trim());
    Section {
        heading: "Main Content".to_string(),
        content: truncate_chars(&text, MAX_CONTENT_LENGTH),
        subsections: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Quality filter
// ---------------------------------------------------------------------------

/// Drop sections and subsections under the minimum content length.
///
/// The section-level check includes nested subsection content, so a short
/// lead-in with substantial subsections survives.
pub(crate) fn filter_quality(sections: Vec<Section>) -> Vec<Section> {
    sections
        .into_iter()
        .filter(|s| s.total_chars() >= MIN_SECTION_CHARS)
        .map(|mut s| {
            s.subsections
                .retain(|sub| sub.content.chars().count() >= MIN_SECTION_CHARS);
            s
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Textual boilerplate trimming
// ---------------------------------------------------------------------------

static LEADING_WIKI_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\]\(/wiki/[^)]+\)\s*").expect("valid regex"));
static ABOUT_NOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^This article is about .+?\. For .+?\s").expect("valid regex"));
static CONFUSED_NOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Not to be confused with [^\n]+\s*").expect("valid regex"));
static EDIT_MARK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[edit\]\s*").expect("valid regex"));

static LAST_UPDATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Last Updated.*$").expect("valid regex"));
static MIN_READ: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s+min\s+read$").expect("valid regex"));
static DATE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{1,2}\s+(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec).*\d{4}.*$")
        .expect("valid regex")
});
static AUTHOR_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[.*\]\(/@.*\)$").expect("valid regex"));
static SINGLE_LETTER_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[.\]\(https://.*\)$").expect("valid regex"));
static TAXONOMY_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[.*\]\(https://www\.geeksforgeeks\.org/(user|category|tag)/.*\)$")
        .expect("valid regex")
});

const FROM_ENCYCLOPEDIA: &str = "From Wikipedia, the free encyclopedia";

/// Remove encyclopedia-specific boilerplate from an introduction.
fn clean_encyclopedia_intro(text: &str) -> String {
    let mut text = text.to_string();
    for re in [&LEADING_WIKI_LINK, &ABOUT_NOTE, &CONFUSED_NOTE, &EDIT_MARK] {
        text = re.replace(&text, "").into_owned();
    }
    if let Some(rest) = text.strip_prefix(FROM_ENCYCLOPEDIA) {
        text = rest.trim_start().to_string();
    }

    let kept: Vec<&str> = text
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            if trimmed.starts_with("[](/wiki/") && trimmed.len() < 100 {
                return false;
            }
            trimmed != FROM_ENCYCLOPEDIA
        })
        .collect();

    kept.join("\n").trim().to_string()
}

fn is_leading_junk(line: &str) -> bool {
    matches!(
        line,
        "Comments" | "Improve" | "Suggest changes" | "Like Article" | "Like" | "Report"
            | "Listen" | "Share"
    ) || LAST_UPDATED.is_match(line)
        || MIN_READ.is_match(line)
        || DATE_LINE.is_match(line)
        || AUTHOR_LINK.is_match(line)
}

fn is_trailing_junk(line: &str) -> bool {
    matches!(line, "Follow" | "Improve")
        || line.starts_with("Article Tags")
        || line.starts_with("- [")
        || SINGLE_LETTER_LINK.is_match(line)
        || TAXONOMY_LINK.is_match(line)
}

/// Strip boilerplate lines from the very beginning and end of the text.
/// Conservative: stops at the first real content line on either side.
fn strip_junk_from_ends(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();

    let mut start = 0;
    for (i, line) in lines.iter().enumerate().take(20) {
        let trimmed = line.trim();
        if trimmed.is_empty() || is_leading_junk(trimmed) {
            start = i + 1;
        } else {
            break;
        }
    }

    let mut end = lines.len();
    let floor = lines.len().saturating_sub(30);
    for i in (floor..lines.len()).rev() {
        let trimmed = lines[i].trim();
        if trimmed.is_empty() || is_trailing_junk(trimmed) {
            end = i;
        } else {
            break;
        }
    }

    if start < end {
        lines[start..end].join("\n").trim().to_string()
    } else {
        text.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn container(doc: &Html) -> ElementRef<'_> {
        crate::content::body_or_root(doc)
    }

    #[test]
    fn three_times_rule_selects_h3() {
        let h3s: String = (1..=9)
            .map(|i| format!("<h3>Topic {i}</h3><p>text</p>"))
            .collect();
        let html = format!(
            "<html><body><h2>Alpha</h2><h2>Beta</h2><h2>Gamma</h2>{h3s}</body></html>"
        );
        let doc = Html::parse_document(&html);
        let c = container(&doc);
        let h2 = headings_at(c, "h2");
        let h3 = headings_at(c, "h3");
        assert_eq!(h2.len(), 3);
        assert_eq!(h3.len(), 9);
        // 9 >= 3*3, all h2 texts unique: only the 3x rule fires.
        assert_eq!(select_heading_level(&h2, &h3), Some(HeadingLevel::H3));
    }

    #[test]
    fn repetitive_h2_rule_selects_h3() {
        let html = r#"<html><body>
            <h2>Subscribe</h2><h2>Subscribe</h2><h2>Subscribe</h2><h2>About</h2>
            <h3>Real section</h3><p>text</p>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let c = container(&doc);
        let h2 = headings_at(c, "h2");
        let h3 = headings_at(c, "h3");
        // 2 unique of 4 h2s (50% < 70%); 1 h3 < 3*4: only the uniqueness rule fires.
        assert_eq!(select_heading_level(&h2, &h3), Some(HeadingLevel::H3));
    }

    #[test]
    fn balanced_headings_select_h2() {
        let html = r#"<html><body>
            <h2>One</h2><h2>Two</h2><h2>Three</h2>
            <h3>Nested A</h3><h3>Nested B</h3>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let c = container(&doc);
        let h2 = headings_at(c, "h2");
        let h3 = headings_at(c, "h3");
        assert_eq!(select_heading_level(&h2, &h3), Some(HeadingLevel::H2));
    }

    #[test]
    fn no_headings_selects_nothing() {
        let doc = Html::parse_document("<html><body><p>Just text.</p></body></html>");
        let c = container(&doc);
        assert_eq!(
            select_heading_level(&headings_at(c, "h2"), &headings_at(c, "h3")),
            None
        );
    }

    #[test]
    fn headings_in_chrome_are_not_counted() {
        let html = r#"<html><body>
            <nav><h2>Menu</h2><h2>Links</h2></nav>
            <h2>Actual Section</h2><p>text</p>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let c = container(&doc);
        assert_eq!(headings_at(c, "h2").len(), 1);
    }

    #[test]
    fn sibling_walk_builds_subsections() {
        let html = r#"<html><body>
            <h2>Hardware</h2>
            <p>Overview paragraph with enough text to count for the section body.</p>
            <h3>Superconducting</h3>
            <p>Subsection text long enough to survive the quality filter easily here.</p>
            <h2>Software</h2>
            <p>Second section body text, also comfortably past fifty characters.</p>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let c = container(&doc);
        let h2 = headings_at(c, "h2");
        let conv = MarkdownConverter::new(None);
        let sections = extract_sections(c, &h2, HeadingLevel::H2, &conv);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].heading, "Hardware");
        assert!(sections[0].content.contains("Overview paragraph"));
        assert_eq!(sections[0].subsections.len(), 1);
        assert_eq!(sections[0].subsections[0].heading, "Superconducting");
        assert_eq!(sections[1].heading, "Software");
        assert!(sections[1].subsections.is_empty());
    }

    #[test]
    fn intro_section_captures_content_before_first_heading() {
        let html = r#"<html><body>
            <p>Lead paragraph before any heading, long enough to pass the minimum length check.</p>
            <h2>First Section</h2>
            <p>Section body text that is long enough to pass the filter as well.</p>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let c = container(&doc);
        let h2 = headings_at(c, "h2");
        let conv = MarkdownConverter::new(None);
        let sections = extract_sections(c, &h2, HeadingLevel::H2, &conv);

        assert_eq!(sections[0].heading, "Introduction");
        assert!(sections[0].content.contains("Lead paragraph"));
    }

    #[test]
    fn nested_layout_uses_position_fallback() {
        // Headings wrapped in their own divs have no content siblings.
        let html = r#"<html><body><div class="page-content">
            <div><h2>First Part</h2></div>
            <div><p>Text belonging to the first part, padded to pass the length filter.</p></div>
            <div><h2>Second Part</h2></div>
            <div><p>Text belonging to the second part, also padded well past fifty.</p></div>
        </div></body></html>"#;
        let doc = Html::parse_document(html);
        let c = container(&doc);
        let h2 = headings_at(c, "h2");
        let conv = MarkdownConverter::new(None);
        let sections = extract_sections(c, &h2, HeadingLevel::H2, &conv);

        let by_heading: Vec<(&str, &str)> = sections
            .iter()
            .map(|s| (s.heading.as_str(), s.content.as_str()))
            .collect();
        assert_eq!(by_heading.len(), 2);
        assert!(by_heading[0].1.contains("first part"));
        assert!(!by_heading[0].1.contains("second part"));
        assert!(by_heading[1].1.contains("second part"));
    }

    #[test]
    fn quality_filter_drops_short_sections_and_subsections() {
        let sections = vec![
            Section {
                heading: "Too short".into(),
                content: "Only forty characters of content here..".into(),
                subsections: vec![],
            },
            Section {
                heading: "Long enough".into(),
                content: "This section has more than fifty characters of content in it."
                    .into(),
                subsections: vec![Subsection {
                    heading: "Short sub".into(),
                    content: "tiny".into(),
                }],
            },
            Section {
                heading: "Carried by subsection".into(),
                content: "short".into(),
                subsections: vec![Subsection {
                    heading: "Substantial".into(),
                    content: "A subsection with comfortably more than fifty characters inside."
                        .into(),
                }],
            },
        ];

        let kept = filter_quality(sections);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].heading, "Long enough");
        assert!(kept[0].subsections.is_empty());
        assert_eq!(kept[1].heading, "Carried by subsection");
        assert_eq!(kept[1].subsections.len(), 1);
    }

    #[test]
    fn encyclopedia_intro_cleanup() {
        let text = "From Wikipedia, the free encyclopedia\n[](/wiki/Quantum)\nQuantum computing is a type of computation.";
        let cleaned = clean_encyclopedia_intro(text);
        assert_eq!(cleaned, "Quantum computing is a type of computation.");
    }

    #[test]
    fn strip_junk_trims_both_ends() {
        let text = "3 min read\nShare\nReal opening line of the article.\nMore body text.\nFollow\nArticle Tags: rust";
        let cleaned = strip_junk_from_ends(text);
        assert_eq!(
            cleaned,
            "Real opening line of the article.\nMore body text."
        );
    }
}
