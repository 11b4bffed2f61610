//! Primary-content container selection.
//!
//! Tries, in order: the encyclopedia body container (host-gated), semantic
//! containers, known content class patterns, the largest text-bearing
//! block among content-like candidates, and finally `<body>`.

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use crate::noise;

/// Select the element most likely to hold the article body.
pub(crate) fn find_main_content<'a>(doc: &'a Html, host: Option<&str>) -> ElementRef<'a> {
    // Encyclopedia pages keep the article in a well-known container.
    if host.is_some_and(|h| h.contains("wikipedia.org")) {
        let wiki_sel = Selector::parse(".mw-parser-output").unwrap();
        if let Some(el) = doc.select(&wiki_sel).next() {
            return el;
        }
    }

    // Semantic HTML first.
    let semantic_sel = Selector::parse("article, main, [role=\"main\"]").unwrap();
    if let Some(el) = doc.select(&semantic_sel).next() {
        return el;
    }

    // Common content class patterns.
    let class_sel = Selector::parse(
        ".post-content, .entry-content, .article-content, .article-body, .article-wrapper",
    )
    .unwrap();
    if let Some(el) = doc.select(&class_sel).next() {
        return el;
    }

    // Largest text-bearing block among content-like candidates.
    let candidate_sel = Selector::parse(
        "div.text, div[class*=\"content\"], div[class*=\"post\"], div[class*=\"article\"]",
    )
    .unwrap();
    let largest = doc
        .select(&candidate_sel)
        .map(|el| (visible_text_len(el), el))
        .max_by_key(|(len, _)| *len)
        .filter(|(len, _)| *len > 0)
        .map(|(_, el)| el);
    if let Some(el) = largest {
        return el;
    }

    body_or_root(doc)
}

/// The `<body>` element, falling back to the document root.
pub(crate) fn body_or_root(doc: &Html) -> ElementRef<'_> {
    let body_sel = Selector::parse("body").unwrap();
    doc.select(&body_sel)
        .next()
        .unwrap_or_else(|| doc.root_element())
}

/// Character count of the text under `el`, skipping noise subtrees.
pub(crate) fn visible_text_len(el: ElementRef) -> usize {
    let mut total = 0;
    for node in el.children() {
        match node.value() {
            Node::Text(text) => {
                total += text
                    .split_whitespace()
                    .map(|w| w.chars().count() + 1)
                    .sum::<usize>();
            }
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(node) {
                    if !noise::is_noise(&child) {
                        total += visible_text_len(child);
                    }
                }
            }
            _ => {}
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_semantic_container() {
        let doc = Html::parse_document(
            r#"<html><body>
                <div class="content">Short sidebar-ish text</div>
                <article><p>The real article body lives here.</p></article>
            </body></html>"#,
        );
        let el = find_main_content(&doc, Some("example.com"));
        assert_eq!(el.value().name(), "article");
    }

    #[test]
    fn wikipedia_container_wins_on_wikipedia_hosts() {
        let doc = Html::parse_document(
            r#"<html><body>
                <main><p>wrapper</p>
                    <div class="mw-parser-output"><p>Article text.</p></div>
                </main>
            </body></html>"#,
        );
        let el = find_main_content(&doc, Some("en.wikipedia.org"));
        assert!(el.value().classes().any(|c| c == "mw-parser-output"));

        // Same markup on another host goes to the semantic container.
        let el = find_main_content(&doc, Some("example.com"));
        assert_eq!(el.value().name(), "main");
    }

    #[test]
    fn falls_back_to_largest_content_block() {
        let doc = Html::parse_document(
            r#"<html><body>
                <div class="post-sidebar">tiny</div>
                <div class="post-body-content"><p>This block has considerably more text than any of its sibling candidates and should win.</p></div>
            </body></html>"#,
        );
        let el = find_main_content(&doc, None);
        assert!(el.value().classes().any(|c| c == "post-body-content"));
    }

    #[test]
    fn falls_back_to_body_when_nothing_matches() {
        let doc = Html::parse_document("<html><body><p>Bare page.</p></body></html>");
        let el = find_main_content(&doc, None);
        assert_eq!(el.value().name(), "body");
    }

    #[test]
    fn visible_text_len_skips_noise() {
        let doc = Html::parse_document(
            r#"<html><body><div id="wrap">
                <p>ten chars!</p>
                <nav>this nav text is invisible to the counter</nav>
            </div></body></html>"#,
        );
        let sel = Selector::parse("#wrap").unwrap();
        let el = doc.select(&sel).next().unwrap();
        let len = visible_text_len(el);
        assert!(len >= 10 && len < 20, "len={len}");
    }
}
