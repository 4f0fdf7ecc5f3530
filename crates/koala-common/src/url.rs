//! URL resolution utilities.
//!
//! [URL Standard](https://url.spec.whatwg.org/)
//!
//! Parsing and joining is delegated to the `url` crate. The helpers here add
//! the inliner's conventions on top: references that must never be rewritten
//! (fragments, `data:` payloads, already absolute URLs) pass through verbatim.

use url::Url;

/// [URL Standard § 4.3](https://url.spec.whatwg.org/#url-parsing)
///
/// "An absolute-URL string is a URL-scheme string, followed by U+003A (:),
/// followed by a scheme-specific part."
#[must_use]
pub fn is_absolute_url(href: &str) -> bool {
    Url::parse(href.trim()).is_ok()
}

/// Resolve a potentially relative URL against a base URL.
///
/// Returns `href` unchanged when there is no base, when the base is not a
/// valid absolute URL, or when `href` is already absolute, a fragment-only
/// reference, or empty.
#[must_use]
pub fn resolve_url(href: &str, base_url: Option<&str>) -> String {
    let Some(base) = base_url.and_then(|b| Url::parse(b).ok()) else {
        return href.to_string();
    };
    resolve_against(href, &base)
}

/// Same as [`resolve_url`] with an already parsed base.
#[must_use]
pub fn resolve_against(href: &str, base: &Url) -> String {
    let trimmed = href.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || is_absolute_url(trimmed) {
        return href.to_string();
    }
    base.join(trimmed)
        .map_or_else(|_| href.to_string(), String::from)
}
