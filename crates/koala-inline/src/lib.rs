//! Inline CSS into HTML `style` attributes.
//!
//! Email clients and other restricted renderers often ignore `<style>`
//! blocks and linked stylesheets. This crate applies every stylesheet rule
//! that can be resolved statically to the matching elements' `style`
//! attributes, following the CSS cascade, and writes the document back out.
//!
//! ```
//! let html = "<html><head><style>h1 { color: blue }</style></head><body><h1>Big Text</h1></body></html>";
//! let inlined = koala_inline::CSSInliner::options()
//!     .remove_style_tags(true)
//!     .build()
//!     .inline(html)?;
//! assert_eq!(
//!     inlined,
//!     "<html><head></head><body><h1 style=\"color: blue;\">Big Text</h1></body></html>"
//! );
//! # Ok::<(), koala_inline::InlineError>(())
//! ```
//!
//! # Pipeline
//!
//! 1. Parse the document ([`koala_html`]).
//! 2. Collect `<style>` elements and, if enabled, `<link rel="stylesheet">`
//!    targets in document order.
//! 3. Parse the stylesheets ([`koala_css`]) into one rule list.
//! 4. Resolve the cascade for every element.
//! 5. Merge the result with each element's existing `style` attribute.
//! 6. Optionally remove the processed style elements and redundant classes.
//! 7. Serialize.
//!
//! Malformed markup and CSS never fail a call; what was skipped is reported
//! through [`CSSInliner::inline_with_diagnostics`].

/// Removing class names that only served inlined rules.
pub mod classes;
/// Errors surfaced to callers.
pub mod error;
mod inliner;
/// Stylesheet loading for `<link rel="stylesheet">`.
pub mod loader;
/// Writing resolved declarations into `style` attributes.
pub mod merge;
/// Inliner configuration.
pub mod options;
/// Stylesheet discovery.
pub mod sources;

pub use error::{InlineError, LoadError};
pub use inliner::{CSSInliner, InlineOutput};
pub use koala_common::{Component, Diagnostics, PartialParseWarning};
pub use loader::{HttpLoader, StylesheetLoader};
pub use options::InlineOptions;

/// Inline `html` with the default options.
///
/// # Errors
///
/// See [`CSSInliner::inline`].
pub fn inline(html: &str) -> Result<String, InlineError> {
    CSSInliner::default().inline(html)
}
