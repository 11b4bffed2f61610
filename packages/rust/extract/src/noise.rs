//! Boilerplate exclusion predicate.
//!
//! `scraper`'s DOM is read-only, so site chrome is not removed from the
//! tree; instead every walk consults [`is_noise`] and skips matching
//! subtrees. The tag/class/id sets mirror the chrome found on article
//! sites plus encyclopedia-specific furniture (navboxes, infoboxes,
//! reference lists, edit links).

use scraper::ElementRef;

/// Elements skipped by tag name alone.
const NOISE_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "aside", "noscript", "iframe", "header", "svg",
];

/// Elements skipped when any class matches exactly.
const NOISE_CLASSES: &[&str] = &[
    // Generic site chrome
    "footer",
    "navigation",
    "nav",
    "menu",
    "sidebar",
    "advertisement",
    "ad",
    "ads",
    "social-share",
    "share",
    "cookie-banner",
    "cookie-notice",
    "popup",
    "modal",
    "overlay",
    "breadcrumb",
    "related",
    "recommended",
    "dropdown-title",
    "dropdown-item",
    // Article metadata/footer blocks
    "article-meta",
    "author-info",
    "tag-container",
    "article-tags",
    "improve",
    // Encyclopedia chrome
    "navbox",
    "vertical-navbox",
    "sistersitebox",
    "metadata",
    "ambox",
    "mbox-small",
    "infobox",
    "toc",
    "reflist",
    "reference",
    "mw-editsection",
    "noprint",
    "catlinks",
    "printfooter",
    "hatnote",
    "dablink",
    "mw-empty-elt",
    "messagebox",
    "thumb",
    "thumbinner",
    "tright",
];

/// Elements skipped when the id attribute matches exactly.
const NOISE_IDS: &[&str] = &["toc", "mw-navigation", "mw-indicator-pp-default"];

/// Whether an element is site chrome rather than content.
///
/// A `header` class counts as noise unless it is an article header.
pub(crate) fn is_noise(el: &ElementRef) -> bool {
    let tag = el.value().name();
    if NOISE_TAGS.contains(&tag) {
        return true;
    }

    if let Some(id) = el.value().attr("id") {
        if NOISE_IDS.contains(&id) {
            return true;
        }
    }

    let mut classes = el.value().classes();
    classes.any(|c| {
        NOISE_CLASSES.contains(&c)
            || (c == "header" && !el.value().classes().any(|c| c == "article-header"))
    })
}

/// Whether any ancestor of `el` (up to the document root) is noise.
pub(crate) fn has_noise_ancestor(el: &ElementRef) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| is_noise(&a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn first<'a>(doc: &'a Html, sel: &str) -> ElementRef<'a> {
        let selector = Selector::parse(sel).unwrap();
        doc.select(&selector).next().expect("element present")
    }

    #[test]
    fn tags_and_classes_are_noise() {
        let doc = Html::parse_document(
            r#"<html><body>
                <nav>menu</nav>
                <div class="sidebar">links</div>
                <div class="infobox">facts</div>
                <p class="lead">content</p>
            </body></html>"#,
        );

        assert!(is_noise(&first(&doc, "nav")));
        assert!(is_noise(&first(&doc, "div.sidebar")));
        assert!(is_noise(&first(&doc, "div.infobox")));
        assert!(!is_noise(&first(&doc, "p.lead")));
    }

    #[test]
    fn article_header_is_not_noise() {
        let doc = Html::parse_document(
            r#"<html><body>
                <div class="header">site chrome</div>
                <div class="header article-header">article title</div>
            </body></html>"#,
        );

        assert!(is_noise(&first(&doc, "div.header:not(.article-header)")));
        assert!(!is_noise(&first(&doc, "div.article-header")));
    }

    #[test]
    fn noise_ancestors_are_detected() {
        let doc = Html::parse_document(
            r#"<html><body>
                <nav><h2>In nav</h2></nav>
                <article><h2>In article</h2></article>
            </body></html>"#,
        );

        assert!(has_noise_ancestor(&first(&doc, "nav h2")));
        assert!(!has_noise_ancestor(&first(&doc, "article h2")));
    }
}
