// src/fetch/html.rs
// =============================================================================
// This module extracts links from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever, which never rejects a document: broken markup is
//   repaired the way a browser would, so extraction is always best-effort
//
// Relative hrefs are resolved against the page's own URL (not the origin),
// and fragments are dropped so `/a#top` and `/a` name the same page.
// =============================================================================

use scraper::{Html, Selector};
use url::Url;

/// Extracts every http(s) link from the `<a href>` elements of a page
///
/// Links come back in document order; duplicates within the page are kept
/// out so the caller sees each target once per page.
///
/// Example:
///   html = "<a href='/docs'>Docs</a>"
///   base_url = "https://example.com/page"
///   result = ["https://example.com/docs"]
pub fn extract_links(html: &str, base_url: &Url) -> Vec<Url> {
    let mut links: Vec<Url> = Vec::new();

    let Ok(selector) = Selector::parse("a[href]") else {
        return links;
    };

    let document = Html::parse_document(html);

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if let Some(url) = resolve_link(base_url, href) {
            if !links.contains(&url) {
                links.push(url);
            }
        }
    }

    links
}

/// Resolves an href against the page URL; None for anything we can't fetch
fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();

    // Skip in-page anchors and special protocols
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
        || href.starts_with("data:")
    {
        return None;
    }

    // join() also handles absolute hrefs, which simply replace the base
    let mut url = base.join(href).ok()?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    url.set_fragment(None);
    Some(url)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does base.join(href) do?
//    - Resolves href the way a browser would
//    - "b.pdf" on https://example.com/docs/ -> https://example.com/docs/b.pdf
//    - "https://other.com" simply replaces the base
//
// 2. Why `let ... else`?
//    - Selector::parse returns a Result
//    - `let Ok(selector) = ... else { return links; }` handles the error
//      without unwrap(), so extraction can never panic
// -----------------------------------------------------------------------------
