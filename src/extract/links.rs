//! Link normalizer: turns raw anchors into the per-page candidate map
//!
//! For each `<a href>` on a page:
//!
//! **Reject:**
//! - empty hrefs and non-navigable ones (`javascript:`, `#…`, `mailto:`, `tel:`, `data:`)
//! - hrefs that do not resolve to an http(s) URL against the base URL
//! - the page's own request URL and the bare origin
//! - URLs already dispatched or already offered by another page
//! - anchors without visible text
//!
//! Accepted anchors are registered as offered by the request URL in the
//! [`SeenRegistry`], so a link shared by many pages is only offered once per
//! run while a retried page still gets its own links back.

use crate::extract::types::LinkCandidates;
use crate::state::SeenRegistry;
use crate::url::{is_non_navigable, registry_key};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Builds the anchor text → absolute URL map for one page
///
/// # Arguments
///
/// * `document` - The parsed page
/// * `base_url` - URL relative hrefs are resolved against
/// * `request_url` - The URL the page was requested with
/// * `seen` - The run's seen-URL registry
pub fn collect_link_candidates(
    document: &Html,
    base_url: &Url,
    request_url: &Url,
    seen: &SeenRegistry,
) -> LinkCandidates {
    let mut candidates = LinkCandidates::new();

    let Ok(selector) = Selector::parse("a[href]") else {
        return candidates;
    };

    let self_keys = [registry_key(request_url.as_str()), registry_key(base_url.as_str())];

    for anchor in document.select(&selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };

        let Some(resolved) = resolve_href(href, base_url) else {
            continue;
        };

        if self_keys.contains(&registry_key(&resolved)) {
            continue;
        }

        let text = anchor_text(&anchor);
        if text.is_empty() {
            continue;
        }

        if !seen.offer(&resolved, request_url.as_str()) {
            continue;
        }

        candidates.insert(text, resolved);
    }

    candidates
}

/// Resolves an href against the base URL, or None if it must be skipped
pub fn resolve_href(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || is_non_navigable(href) {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    if absolute.scheme() == "http" || absolute.scheme() == "https" {
        Some(absolute.to_string())
    } else {
        None
    }
}

/// Visible text of an anchor with whitespace collapsed
pub fn anchor_text(anchor: &ElementRef<'_>) -> String {
    anchor
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
