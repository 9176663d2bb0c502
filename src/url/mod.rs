//! URL handling module for Sitesift
//!
//! This module provides URL normalization for the seen-URL registry,
//! network-location extraction for routing, and href screening.

mod domain;
mod normalize;

pub use domain::{network_location, origin_of};
pub use normalize::normalize_url;

/// Href prefixes that never lead to another page
const NON_NAVIGABLE_PREFIXES: &[&str] = &["javascript:", "mailto:", "tel:", "data:", "#"];

/// Returns true if an href is an in-page fragment or a non-navigation action
///
/// Matching is case-insensitive and ignores leading whitespace.
///
/// # Examples
///
/// ```
/// use sitesift::url::is_non_navigable;
///
/// assert!(is_non_navigable("javascript:void(0)"));
/// assert!(is_non_navigable("  #top"));
/// assert!(is_non_navigable("MailTo:someone@example.com"));
/// assert!(!is_non_navigable("/news/1"));
/// ```
pub fn is_non_navigable(href: &str) -> bool {
    let href = href.trim_start().to_ascii_lowercase();
    NON_NAVIGABLE_PREFIXES
        .iter()
        .any(|prefix| href.starts_with(prefix))
}

/// Returns the registry key for a URL string
///
/// Falls back to the trimmed input when the URL cannot be normalized, so
/// odd-but-distinct strings still deduplicate against themselves.
pub fn registry_key(url: &str) -> String {
    match normalize_url(url) {
        Ok(normalized) => normalized.to_string(),
        Err(_) => url.trim().to_string(),
    }
}
