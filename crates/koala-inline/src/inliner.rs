//! The inlining pipeline.

use std::{fmt, io};

use koala_common::{Component, Diagnostics, url::resolve_against};
use koala_css::{CSSParser, Rule, Stylesheet, reduced_stylesheet, resolve};
use koala_dom::{Attributes, DomTree, ElementData, NodeId, NodeType};
use koala_html::{parse_document, serialize, serialize_to};

use crate::classes::{inlined_classes, strip_redundant_classes};
use crate::error::InlineError;
use crate::loader::{HttpLoader, StylesheetLoader};
use crate::merge::{apply_styles, merged_styles};
use crate::options::InlineOptions;
use crate::sources::{StylesheetSource, collect_stylesheet_sources, ignored_style_text};

/// Result of [`CSSInliner::inline_with_diagnostics`].
#[derive(Debug, Clone)]
pub struct InlineOutput {
    /// The inlined document.
    pub html: String,
    /// Everything that was skipped while parsing the document and its
    /// stylesheets.
    pub diagnostics: Diagnostics,
}

/// Inlines CSS into `style` attributes.
///
/// An inliner holds no per-document state and can be shared between threads.
pub struct CSSInliner {
    options: InlineOptions,
    loader: Box<dyn StylesheetLoader>,
}

impl fmt::Debug for CSSInliner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CSSInliner")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Default for CSSInliner {
    fn default() -> Self {
        Self::new(InlineOptions::default())
    }
}

impl CSSInliner {
    /// Create an inliner that loads linked stylesheets over HTTP.
    #[must_use]
    pub fn new(options: InlineOptions) -> Self {
        Self {
            options,
            loader: Box::new(HttpLoader),
        }
    }

    /// Default options, to be adjusted and turned into an inliner with
    /// [`InlineOptions::build`].
    #[must_use]
    pub fn options() -> InlineOptions {
        InlineOptions::default()
    }

    /// Replace the loader used for `<link rel="stylesheet">`.
    #[must_use]
    pub fn with_loader(mut self, loader: impl StylesheetLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    /// The options this inliner was built with.
    #[must_use]
    pub const fn inline_options(&self) -> &InlineOptions {
        &self.options
    }

    /// Inline `html` and return the resulting markup.
    ///
    /// # Errors
    ///
    /// Returns [`InlineError::RemoteStylesheet`] if a linked stylesheet
    /// cannot be loaded.
    pub fn inline(&self, html: &str) -> Result<String, InlineError> {
        let (tree, _) = self.process(html)?;
        Ok(serialize(&tree))
    }

    /// Inline a document given as raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`InlineError::Decode`] if `html` is not valid UTF-8, and
    /// otherwise fails like [`CSSInliner::inline`].
    pub fn inline_bytes(&self, html: &[u8]) -> Result<String, InlineError> {
        self.inline(std::str::from_utf8(html)?)
    }

    /// Inline `html` and write the markup to `target`.
    ///
    /// Nothing is written when inlining fails.
    ///
    /// # Errors
    ///
    /// Fails like [`CSSInliner::inline`], or with [`InlineError::Io`] if
    /// writing fails.
    pub fn inline_to<W: io::Write>(&self, html: &str, target: &mut W) -> Result<(), InlineError> {
        let (tree, _) = self.process(html)?;
        serialize_to(&tree, target)?;
        Ok(())
    }

    /// Inline `html` and also return the warnings recorded along the way.
    ///
    /// # Errors
    ///
    /// Fails like [`CSSInliner::inline`].
    pub fn inline_with_diagnostics(&self, html: &str) -> Result<InlineOutput, InlineError> {
        let (tree, diagnostics) = self.process(html)?;
        Ok(InlineOutput {
            html: serialize(&tree),
            diagnostics,
        })
    }

    fn process(&self, html: &str) -> Result<(DomTree, Diagnostics), InlineError> {
        let span = tracing::info_span!("inline", bytes = html.len());
        let _entered = span.enter();

        let (mut tree, mut diagnostics) = parse_document(html);
        let sources = collect_stylesheet_sources(&tree, self.options.load_remote_stylesheets);

        // Sheets are concatenated so source order runs across all of them.
        let mut stylesheet = Stylesheet::default();
        let mut document_css = Vec::with_capacity(sources.len());
        for source in &sources {
            let css = match source {
                StylesheetSource::Style { css, .. } => css.clone(),
                StylesheetSource::Link { href, .. } => self.load(href)?,
            };
            stylesheet.append(parse_css(&css, &mut diagnostics));
            document_css.push(css);
        }
        if let Some(extra) = &self.options.extra_css {
            stylesheet.append(parse_css(extra, &mut diagnostics));
        }

        let updates = {
            let cascade = resolve(&tree, &stylesheet);
            merged_styles(
                &tree,
                &cascade,
                self.options.inline_style_base_url.as_ref(),
                &mut diagnostics,
            )
        };
        tracing::debug!(elements = updates.len(), "merged styles");
        apply_styles(&mut tree, updates);

        let remaining_css = if self.options.remove_style_tags {
            self.remove_style_tags(&mut tree, &sources, &stylesheet, &mut diagnostics)
        } else {
            document_css.join("\n")
        };

        if self.options.strip_redundant_classes {
            let remaining = format!("{remaining_css}\n{}", ignored_style_text(&tree));
            strip_redundant_classes(&mut tree, &inlined_classes(&stylesheet), &remaining);
        }

        Ok((tree, diagnostics))
    }

    /// Load a linked stylesheet, resolving `href` against the base URL.
    fn load(&self, href: &str) -> Result<String, InlineError> {
        let resolved = match &self.options.inline_style_base_url {
            Some(base) => resolve_against(href, base),
            None => href.to_string(),
        };
        self.loader.load(&resolved).map_err(move |source| {
            tracing::warn!(href = %resolved, error = %source, "failed to load stylesheet");
            InlineError::RemoteStylesheet {
                href: resolved,
                source,
            }
        })
    }

    /// Detach the processed `<style>` and `<link>` elements.
    ///
    /// When unmatched rules are kept, the first `<style>` element survives
    /// with the reduced stylesheet as its text. Returns the CSS left in the
    /// document.
    fn remove_style_tags(
        &self,
        tree: &mut DomTree,
        sources: &[StylesheetSource],
        stylesheet: &Stylesheet,
        diagnostics: &mut Diagnostics,
    ) -> String {
        let reduced = if self.options.keep_style_tags_for_unmatched {
            reduced_stylesheet(stylesheet)
        } else {
            let dropped = stylesheet
                .rules
                .iter()
                .filter(|rule| match rule {
                    Rule::Style(style) => style.passthrough_selector_text().is_some(),
                    Rule::At(_) => true,
                })
                .count();
            if dropped > 0 {
                diagnostics.warn(
                    Component::Inliner,
                    format!("{dropped} rules could not be inlined and were removed"),
                );
            }
            String::new()
        };

        let mut keeper = None;
        if !reduced.is_empty() {
            let node = sources
                .iter()
                .find_map(|source| match source {
                    StylesheetSource::Style { node, .. } => Some(*node),
                    StylesheetSource::Link { .. } => None,
                })
                .unwrap_or_else(|| new_style_element(tree));
            tree.set_child_text(node, reduced.clone());
            keeper = Some(node);
        }

        for source in sources {
            if Some(source.node()) != keeper {
                tree.detach(source.node());
            }
        }
        reduced
    }
}

/// Append an empty `<style>` element to the head.
fn new_style_element(tree: &mut DomTree) -> NodeId {
    let parent = tree
        .head()
        .or_else(|| tree.document_element())
        .unwrap_or(NodeId::ROOT);
    let style = tree.alloc(NodeType::Element(ElementData::new("style", Attributes::new())));
    tree.append_child(parent, style);
    style
}

fn parse_css(css: &str, diagnostics: &mut Diagnostics) -> Stylesheet {
    let mut parser = CSSParser::new(css);
    let stylesheet = parser.parse_stylesheet();
    diagnostics.extend(parser.into_diagnostics());
    stylesheet
}
