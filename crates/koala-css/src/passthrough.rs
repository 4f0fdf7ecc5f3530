//! Rules that cannot be inlined.
//!
//! Dynamic pseudo-classes, pseudo-elements and conditional at-rules only make
//! sense to a user agent at render time. They are written back out as a
//! reduced stylesheet so the document keeps them after inlining.

use std::collections::HashSet;

use crate::parser::{Rule, Stylesheet};
use crate::tokenizer::{CSSToken, CSSTokenizer};

/// Serialize the parts of `stylesheet` the cascade did not consume, in
/// source order, one rule per line.
///
/// Style rules keep only their non-inlinable selectors. At-rules are copied
/// as written. Returns an empty string when nothing remains.
#[must_use]
pub fn reduced_stylesheet(stylesheet: &Stylesheet) -> String {
    let mut blocks = Vec::new();
    for rule in &stylesheet.rules {
        match rule {
            Rule::Style(style) => {
                let Some(selector) = style.passthrough_selector_text() else {
                    continue;
                };
                if style.declarations.is_empty() {
                    continue;
                }
                let body: Vec<String> = style.declarations.iter().map(|d| format!("{d};")).collect();
                blocks.push(format!("{selector} {{ {} }}", body.join(" ")));
            }
            Rule::At(at_rule) => blocks.push(at_rule.raw.clone()),
        }
    }
    blocks.join("\n")
}

/// Class names that appear in class selectors anywhere in `css`.
///
/// A `.` delimiter directly followed by an identifier is a class selector.
/// Inside declaration values numbers never tokenize that way, so scanning the
/// whole text is safe.
#[must_use]
pub fn referenced_classes(css: &str) -> HashSet<String> {
    let mut tokenizer = CSSTokenizer::new(css);
    tokenizer.run();
    let tokens = tokenizer.into_tokens();
    tokens
        .windows(2)
        .filter_map(|pair| match pair {
            [CSSToken::Delim('.'), CSSToken::Ident(name)] => Some(name.clone()),
            _ => None,
        })
        .collect()
}
