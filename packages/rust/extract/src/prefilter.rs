//! URL pre-filtering and mirror rewriting.
//!
//! Runs before any HTTP work: URLs known to be paywalled, JS-rendered,
//! media-only, or non-HTML are rejected outright, and a few hosts are
//! rewritten to mirrors that serve full markup for the same content.

use url::Url;

/// URL substrings that mark a page as unextractable.
const SKIP_SUBSTRINGS: &[&str] = &[
    // Library/doc viewers that require auth or JS rendering
    "oreilly.com/library/view/",
    "ibm.com/docs/",
    // Paywalled news sites
    "nytimes.com/",
    "wsj.com/",
    "ft.com/content/",
    "economist.com/",
    // Video/media platforms with minimal text content
    "youtube.com",
    "youtu.be",
    "vimeo.com",
    "tiktok.com",
    "twitch.tv",
    // Social media
    "twitter.com",
    "x.com",
    "facebook.com",
    "instagram.com",
    "linkedin.com/posts/",
    // Presentation/slide platforms
    "slideshare.net",
    "slides.com",
    "prezi.com",
    "speakerdeck.com",
];

/// File extensions that are never HTML pages.
const SKIP_EXTENSIONS: &[&str] = &[
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".zip", ".rar", ".tar", ".gz",
    ".7z", ".mp3", ".mp4", ".avi", ".mov", ".wmv", ".jpg", ".jpeg", ".png", ".gif", ".bmp",
    ".exe", ".dmg", ".iso",
];

/// Whether a URL should be skipped without fetching.
pub fn should_skip_url(url: &str) -> bool {
    if SKIP_SUBSTRINGS.iter().any(|p| url.contains(p)) {
        return true;
    }

    // Medium member-only posts
    if url.contains("medium.com/") && url.contains("/p/") {
        return true;
    }

    let path = Url::parse(url)
        .map(|u| u.path().to_ascii_lowercase())
        .unwrap_or_else(|_| url.to_ascii_lowercase());

    SKIP_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Rewrite a URL to a lighter-weight mirror when one exists.
///
/// Reddit serves JS-only markup on its main domain; old.reddit.com exposes
/// the full thread as plain HTML.
pub fn rewrite_fetch_url(url: &str) -> String {
    if url.contains("reddit.com") && !url.contains("old.reddit.com") {
        let rewritten = url
            .replace("www.reddit.com", "old.reddit.com")
            .replace("//reddit.com", "//old.reddit.com");
        tracing::debug!(original = url, %rewritten, "rewrote to mirror");
        return rewritten;
    }
    url.to_string()
}
