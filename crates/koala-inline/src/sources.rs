//! Stylesheet discovery.
//!
//! [§ 6.1 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
//!
//! "Declarations from style sheets independently linked by the originating
//! document are treated as if they were concatenated in linking order."

use koala_dom::{DomTree, ElementData, NodeId};

/// The origin of one stylesheet in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StylesheetSource {
    /// Embedded stylesheet from a `<style>` element.
    ///
    /// [§ 4.2.6 The style element](https://html.spec.whatwg.org/multipage/semantics.html#the-style-element)
    Style {
        /// The `<style>` element.
        node: NodeId,
        /// Its text content.
        css: String,
    },
    /// External stylesheet from `<link rel="stylesheet">`.
    ///
    /// [§ 4.2.4 The link element](https://html.spec.whatwg.org/multipage/semantics.html#the-link-element)
    Link {
        /// The `<link>` element.
        node: NodeId,
        /// The href as written.
        href: String,
    },
}

impl StylesheetSource {
    /// The element the stylesheet came from.
    #[must_use]
    pub const fn node(&self) -> NodeId {
        match self {
            Self::Style { node, .. } | Self::Link { node, .. } => *node,
        }
    }
}

/// Attribute that opts a `<style>` element out of inlining.
pub const IGNORE_ATTRIBUTE: &str = "data-inline-ignore";

/// Every stylesheet the inliner should apply, in document order.
///
/// `<link>` elements are only collected when `include_links` is set.
#[must_use]
pub fn collect_stylesheet_sources(tree: &DomTree, include_links: bool) -> Vec<StylesheetSource> {
    let mut sources = Vec::new();
    for id in tree.elements() {
        let Some(data) = tree.as_element(id) else {
            continue;
        };
        if data.is("style") && is_css_style(data) {
            sources.push(StylesheetSource::Style {
                node: id,
                css: tree.child_text(id),
            });
        } else if include_links && data.is("link") && is_stylesheet_link(data) {
            // "The href attribute gives the address (a valid non-empty URL
            // potentially surrounded by spaces) of the linked resource."
            if let Some(href) = data.get_attribute("href")
                && !href.trim().is_empty()
            {
                sources.push(StylesheetSource::Link {
                    node: id,
                    href: href.trim().to_string(),
                });
            }
        }
    }
    tracing::debug!(count = sources.len(), "collected stylesheets");
    sources
}

/// Text of the `<style>` elements that were skipped.
///
/// Their rules stay in the document as written, so the classes they refer
/// to are still in use.
#[must_use]
pub fn ignored_style_text(tree: &DomTree) -> String {
    tree.elements()
        .filter(|&id| {
            tree.as_element(id)
                .is_some_and(|data| data.is("style") && !is_css_style(data))
        })
        .map(|id| tree.child_text(id))
        .collect::<Vec<_>>()
        .join("\n")
}

/// [§ 4.2.6 The style element](https://html.spec.whatwg.org/multipage/semantics.html#the-style-element)
///
/// "The type attribute ... If it is present, its value must be an ASCII
/// case-insensitive match for "text/css"."
fn is_css_style(data: &ElementData) -> bool {
    if data.get_attribute(IGNORE_ATTRIBUTE).is_some() {
        return false;
    }
    data.get_attribute("type").is_none_or(|ty| {
        let ty = ty.trim();
        ty.is_empty() || ty.eq_ignore_ascii_case("text/css")
    })
}

/// [§ 4.2.4 The link element](https://html.spec.whatwg.org/multipage/semantics.html#the-link-element)
///
/// "If the rel attribute's value contains the token stylesheet, then the link
/// is a stylesheet link."
///
/// [§ 2.4.7 Space-separated tokens](https://html.spec.whatwg.org/multipage/common-microsyntaxes.html#space-separated-tokens)
/// Token comparison is ASCII case-insensitive.
fn is_stylesheet_link(data: &ElementData) -> bool {
    data.get_attribute("rel").is_some_and(|rel| {
        rel.split_ascii_whitespace()
            .any(|token| token.eq_ignore_ascii_case("stylesheet"))
    })
}
