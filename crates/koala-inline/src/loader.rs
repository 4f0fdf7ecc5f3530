//! Stylesheet loading for `<link rel="stylesheet">`.
//!
//! The inliner never talks to the network directly. It hands resolved hrefs
//! to a [`StylesheetLoader`] and works on the text that comes back.

use koala_common::net::fetch_text;

use crate::error::LoadError;

/// Source of stylesheet text for linked stylesheets.
///
/// Implementations must be shareable so one inliner can serve many threads.
pub trait StylesheetLoader: Send + Sync {
    /// Return the text of the stylesheet at `href`.
    ///
    /// `href` is already resolved against the configured base URL when one
    /// is set.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the stylesheet cannot be obtained.
    fn load(&self, href: &str) -> Result<String, LoadError>;
}

/// Default loader: blocking HTTP(S) GET, with `data:` URLs decoded in memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpLoader;

impl StylesheetLoader for HttpLoader {
    fn load(&self, href: &str) -> Result<String, LoadError> {
        Ok(fetch_text(href)?)
    }
}

impl<F> StylesheetLoader for F
where
    F: Fn(&str) -> Result<String, LoadError> + Send + Sync,
{
    fn load(&self, href: &str) -> Result<String, LoadError> {
        self(href)
    }
}
