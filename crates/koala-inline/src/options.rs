//! Inliner configuration.
//!
//! Options can be built in code through the setters, or loaded from any
//! serde format. Missing fields take their defaults.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::CSSInliner;

/// Configuration for one [`CSSInliner`].
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InlineOptions {
    /// Remove the `<style>` elements (and loaded `<link>` elements) whose
    /// rules were inlined.
    pub remove_style_tags: bool,
    /// When style tags are removed, keep the rules that could not be inlined
    /// in a reduced `<style>` block.
    pub keep_style_tags_for_unmatched: bool,
    /// Base for relative `url()` references in inlined declarations and for
    /// relative `<link>` hrefs.
    pub inline_style_base_url: Option<Url>,
    /// Fetch `<link rel="stylesheet">` targets and inline their rules.
    pub load_remote_stylesheets: bool,
    /// Drop class names from `class` attributes once nothing left in the
    /// document refers to them.
    pub strip_redundant_classes: bool,
    /// Extra CSS applied after every stylesheet in the document.
    pub extra_css: Option<String>,
}

impl Default for InlineOptions {
    fn default() -> Self {
        Self {
            remove_style_tags: false,
            keep_style_tags_for_unmatched: true,
            inline_style_base_url: None,
            load_remote_stylesheets: false,
            strip_redundant_classes: false,
            extra_css: None,
        }
    }
}

impl InlineOptions {
    /// Set [`InlineOptions::remove_style_tags`].
    #[must_use]
    pub const fn remove_style_tags(mut self, remove_style_tags: bool) -> Self {
        self.remove_style_tags = remove_style_tags;
        self
    }

    /// Set [`InlineOptions::keep_style_tags_for_unmatched`].
    #[must_use]
    pub const fn keep_style_tags_for_unmatched(mut self, keep: bool) -> Self {
        self.keep_style_tags_for_unmatched = keep;
        self
    }

    /// Set [`InlineOptions::inline_style_base_url`].
    #[must_use]
    pub fn inline_style_base_url(mut self, base_url: Option<Url>) -> Self {
        self.inline_style_base_url = base_url;
        self
    }

    /// Set [`InlineOptions::load_remote_stylesheets`].
    #[must_use]
    pub const fn load_remote_stylesheets(mut self, load: bool) -> Self {
        self.load_remote_stylesheets = load;
        self
    }

    /// Set [`InlineOptions::strip_redundant_classes`].
    #[must_use]
    pub const fn strip_redundant_classes(mut self, strip: bool) -> Self {
        self.strip_redundant_classes = strip;
        self
    }

    /// Set [`InlineOptions::extra_css`].
    #[must_use]
    pub fn extra_css(mut self, css: Option<String>) -> Self {
        self.extra_css = css;
        self
    }

    /// Create an inliner with these options and the default loader.
    #[must_use]
    pub fn build(self) -> CSSInliner {
        CSSInliner::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = InlineOptions::default();
        assert!(!options.remove_style_tags);
        assert!(options.keep_style_tags_for_unmatched);
        assert!(options.inline_style_base_url.is_none());
        assert!(!options.load_remote_stylesheets);
    }

    #[test]
    fn test_setters_chain() {
        let options = InlineOptions::default()
            .remove_style_tags(true)
            .keep_style_tags_for_unmatched(false)
            .strip_redundant_classes(true)
            .extra_css(Some("p { margin: 0 }".to_string()));
        assert!(options.remove_style_tags);
        assert!(!options.keep_style_tags_for_unmatched);
        assert!(options.strip_redundant_classes);
        assert_eq!(options.extra_css.as_deref(), Some("p { margin: 0 }"));
    }
}
