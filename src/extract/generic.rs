//! Generic extraction strategy for domains without a custom extractor
//!
//! Pulls the visible body text, the link candidate map, and author/date
//! hints out of raw markup. It never decides what to crawl next; the text
//! and candidates go straight to the extraction service.

use crate::extract::dates::normalize_date;
use crate::extract::links::collect_link_candidates;
use crate::extract::types::LinkCandidates;
use crate::state::SeenRegistry;
use crate::url::origin_of;
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Author hints, probed in order
const AUTHOR_SELECTORS: &[&str] = &["div.author", "div.source"];

const DATE_SELECTOR: &str = "div.date";

/// Elements whose text is never visible
const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// What the generic strategy hands to the extraction service
#[derive(Debug, Clone, PartialEq)]
pub struct GenericPage {
    pub text: String,
    pub link_candidates: LinkCandidates,
    /// Bare origin of the page; relative links were resolved against it
    pub base_url: String,
    pub author: Option<String>,
    pub publish_date: Option<NaiveDate>,
}

/// Runs the generic strategy over one fetched page
///
/// # Arguments
///
/// * `html` - The page markup
/// * `request_url` - The URL the page was requested with
/// * `seen` - The run's seen-URL registry (accepted links are registered as offered)
pub fn extract_generic(html: &str, request_url: &Url, seen: &SeenRegistry) -> GenericPage {
    let document = Html::parse_document(html);

    let base_url = origin_of(request_url).unwrap_or_else(|| request_url.to_string());
    let base = Url::parse(&base_url).unwrap_or_else(|_| request_url.clone());

    let link_candidates = collect_link_candidates(&document, &base, request_url, seen);

    let publish_date = first_text(&document, &[DATE_SELECTOR])
        .as_deref()
        .and_then(normalize_date);

    GenericPage {
        text: body_text(&document),
        link_candidates,
        base_url,
        author: first_text(&document, AUTHOR_SELECTORS),
        publish_date,
    }
}

/// Visible text of the document body, one text run per line
pub fn body_text(document: &Html) -> String {
    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .unwrap_or_else(|| document.root_element());
    visible_text(body)
}

/// Visible text below an element, skipping script-like content
pub fn visible_text(element: ElementRef<'_>) -> String {
    let mut lines = Vec::new();

    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map_or(false, |el| INVISIBLE_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !line.is_empty() {
            lines.push(line);
        }
    }

    lines.join("\n")
}

/// Returns the first non-empty text among elements matching the selectors, in order
pub fn first_text(document: &Html, selectors: &[&str]) -> Option<String> {
    selectors
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .find_map(|selector| {
            document
                .select(&selector)
                .map(|el| el.text().collect::<String>().trim().to_string())
                .find(|text| !text.is_empty())
        })
}
