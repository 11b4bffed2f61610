//! Element-to-rich-text conversion.
//!
//! Maps block and inline HTML elements to portable Markdown. Unknown
//! containers recurse into their children and join the results. The
//! converter never sees removed nodes: noise subtrees and the
//! already-extracted main heading are skipped during the walk.

use ego_tree::NodeId;
use scraper::node::Node;
use scraper::ElementRef;

use crate::noise;

/// Per-section content cap (characters).
pub(crate) const MAX_SECTION_LENGTH: usize = 3_000;

/// Overall cap for unstructured single-section content (characters).
pub(crate) const MAX_CONTENT_LENGTH: usize = 15_000;

/// Marker appended when content is truncated at a cap.
const TRUNCATION_MARKER: &str = "...";

/// Converts DOM elements to Markdown, skipping one optional excluded node
/// (the document's main heading, emitted separately).
pub(crate) struct MarkdownConverter {
    excluded: Option<NodeId>,
}

impl MarkdownConverter {
    pub(crate) fn new(excluded: Option<NodeId>) -> Self {
        Self { excluded }
    }

    /// Convert a single block-level element (and its subtree) to Markdown.
    pub(crate) fn element_to_markdown(&self, el: ElementRef) -> String {
        if self.excluded == Some(el.id()) || noise::is_noise(&el) {
            return String::new();
        }

        match el.value().name() {
            "p" => self.inline_text(el),

            "h1" => heading_line("#", el),
            "h2" => heading_line("##", el),
            "h3" => heading_line("###", el),
            "h4" => heading_line("####", el),
            "h5" => heading_line("#####", el),
            "h6" => heading_line("######", el),

            "ul" => self.list_to_markdown(el, false),
            "ol" => self.list_to_markdown(el, true),

            "blockquote" => {
                let text = collapse_ws(&el.text().collect::<String>());
                text.lines()
                    .map(|line| format!("> {line}"))
                    .collect::<Vec<_>>()
                    .join("\n")
            }

            "pre" => {
                let code_sel = scraper::Selector::parse("code").unwrap();
                let code_text = el
                    .select(&code_sel)
                    .next()
                    .map(|code| code.text().collect::<String>())
                    .unwrap_or_else(|| el.text().collect::<String>());
                format!("```\n{}\n```", code_text.trim_end())
            }

            // Inline code reaching block dispatch (not wrapped in <pre>)
            "code" => {
                let in_pre = el
                    .parent()
                    .and_then(ElementRef::wrap)
                    .is_some_and(|p| p.value().name() == "pre");
                if in_pre {
                    String::new()
                } else {
                    format!("`{}`", el.text().collect::<String>())
                }
            }

            "a" => {
                let text = collapse_ws(&el.text().collect::<String>());
                match el.value().attr("href") {
                    Some(href) if !href.is_empty() => format!("[{text}]({href})"),
                    _ => text,
                }
            }

            "br" => "  \n".to_string(),
            "hr" => "---".to_string(),

            "table" => self.table_to_markdown(el),
            "dl" => self.definition_list_to_markdown(el),

            // Containers (div, span, section, ...): recurse into children.
            _ => {
                let children: Vec<ElementRef> =
                    el.children().filter_map(ElementRef::wrap).collect();
                if children.is_empty() {
                    collapse_ws(&el.text().collect::<String>())
                } else {
                    let parts: Vec<String> = children
                        .into_iter()
                        .map(|child| self.element_to_markdown(child))
                        .filter(|md| !md.is_empty())
                        .collect();
                    parts.join("\n\n")
                }
            }
        }
    }

    /// Render the inline content of an element (paragraph, list item).
    pub(crate) fn inline_text(&self, el: ElementRef) -> String {
        let mut out = String::new();

        for node in el.children() {
            match node.value() {
                Node::Text(text) => out.push_str(&normalize_chunk(text)),
                Node::Element(_) => {
                    let Some(child) = ElementRef::wrap(node) else {
                        continue;
                    };
                    if self.excluded == Some(child.id()) || noise::is_noise(&child) {
                        continue;
                    }
                    match child.value().name() {
                        "strong" | "b" => {
                            let text = collapse_ws(&child.text().collect::<String>());
                            if !text.is_empty() {
                                out.push_str(&format!("**{text}**"));
                            }
                        }
                        "em" | "i" => {
                            let text = collapse_ws(&child.text().collect::<String>());
                            if !text.is_empty() {
                                out.push_str(&format!("*{text}*"));
                            }
                        }
                        "code" => {
                            out.push('`');
                            out.push_str(&child.text().collect::<String>());
                            out.push('`');
                        }
                        "a" => {
                            let text = collapse_ws(&child.text().collect::<String>());
                            match child.value().attr("href") {
                                Some(href) if !href.is_empty() => {
                                    out.push_str(&format!("[{text}]({href})"));
                                }
                                _ => out.push_str(&text),
                            }
                        }
                        "br" => out.push_str("  \n"),
                        _ => out.push_str(&collapse_ws(&child.text().collect::<String>())),
                    }
                }
                _ => {}
            }
        }

        out.trim().to_string()
    }

    fn list_to_markdown(&self, el: ElementRef, ordered: bool) -> String {
        let mut lines = Vec::new();
        let mut index = 1usize;

        for child in el.children().filter_map(ElementRef::wrap) {
            if child.value().name() != "li" {
                continue;
            }
            let content = self.inline_text(child);
            if content.is_empty() {
                continue;
            }
            if ordered {
                lines.push(format!("{index}. {content}"));
                index += 1;
            } else {
                lines.push(format!("- {content}"));
            }
        }

        lines.join("\n")
    }

    fn table_to_markdown(&self, table: ElementRef) -> String {
        let tr_sel = scraper::Selector::parse("tr").unwrap();
        let th_sel = scraper::Selector::parse("th").unwrap();
        let td_sel = scraper::Selector::parse("td").unwrap();

        let rows: Vec<ElementRef> = table.select(&tr_sel).collect();
        let Some(header_row) = rows.first() else {
            return String::new();
        };

        let mut headers: Vec<String> = header_row
            .select(&th_sel)
            .map(|cell| collapse_ws(&cell.text().collect::<String>()))
            .collect();
        if headers.is_empty() {
            headers = header_row
                .select(&td_sel)
                .map(|cell| collapse_ws(&cell.text().collect::<String>()))
                .collect();
        }
        if headers.is_empty() {
            return String::new();
        }

        let mut md = String::new();
        md.push_str("| ");
        md.push_str(&headers.join(" | "));
        md.push_str(" |\n|");
        for _ in &headers {
            md.push_str(" --- |");
        }
        md.push('\n');

        for row in rows.iter().skip(1) {
            let cells: Vec<String> = row
                .select(&td_sel)
                .map(|cell| collapse_ws(&cell.text().collect::<String>()))
                .collect();
            if cells.is_empty() {
                continue;
            }
            md.push_str("| ");
            md.push_str(&cells.join(" | "));
            md.push_str(" |\n");
        }

        md.trim_end().to_string()
    }

    fn definition_list_to_markdown(&self, dl: ElementRef) -> String {
        let dt_sel = scraper::Selector::parse("dt").unwrap();
        let dd_sel = scraper::Selector::parse("dd").unwrap();

        let terms: Vec<String> = dl
            .select(&dt_sel)
            .map(|dt| collapse_ws(&dt.text().collect::<String>()))
            .collect();
        let defs: Vec<String> = dl
            .select(&dd_sel)
            .map(|dd| collapse_ws(&dd.text().collect::<String>()))
            .collect();

        let pairs: Vec<String> = terms
            .iter()
            .zip(defs.iter())
            .map(|(term, def)| format!("**{term}**\n: {def}"))
            .collect();

        pairs.join("\n\n")
    }
}

fn heading_line(hashes: &str, el: ElementRef) -> String {
    format!("{hashes} {}", collapse_ws(&el.text().collect::<String>()))
}

/// Collapse all whitespace runs to single spaces and trim.
pub(crate) fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize one raw text chunk: collapse interior whitespace while keeping
/// a single boundary space where the source had one.
fn normalize_chunk(s: &str) -> String {
    if s.trim().is_empty() {
        return " ".to_string();
    }
    let mut out = String::new();
    if s.starts_with(char::is_whitespace) {
        out.push(' ');
    }
    out.push_str(&collapse_ws(s));
    if s.ends_with(char::is_whitespace) {
        out.push(' ');
    }
    out
}

/// Truncate to at most `max` characters, appending a marker when cut.
/// Always splits on a char boundary.
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}
