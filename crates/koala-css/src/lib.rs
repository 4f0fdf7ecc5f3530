//! CSS tokenizer, parser, selector matching and cascade for the Koala CSS inliner.
//!
//! # Scope
//!
//! This crate implements:
//! - **CSS Tokenizer** ([§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization))
//!   - All token types: ident, function, at-keyword, hash, string, url, number, dimension, etc.
//!   - Comment handling
//!   - Escape sequences
//!   - Byte spans for every token
//!
//! - **CSS Parser** ([§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing))
//!   - Stylesheet, declaration list and style attribute parsing
//!   - Style rules, plus at-rules kept verbatim for passthrough
//!   - Recoverable errors recorded as diagnostics
//!
//! - **CSS Selectors** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/))
//!   - Type, universal, class, ID and attribute selectors
//!   - Descendant, child, next-sibling and subsequent-sibling combinators
//!   - Structural pseudo-classes and `:not()`
//!   - Specificity calculation
//!
//! - **CSS Cascade** ([CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/))
//!   - Rule index keyed on the subject compound
//!   - Specificity and source-order sorting, with `!important` as its own tier
//!
//! - **Passthrough** of rules that cannot be inlined, and `url()` rewriting.
//!
//! # Not Implemented
//!
//! - Value parsing or computation of any kind
//! - Inheritance
//! - Evaluating media queries
//! - `:is()`, `:where()`, `:has()` and namespace prefixes

/// CSS cascade per [CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/).
pub mod cascade;
/// CSS parser per [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing).
pub mod parser;
/// Reduced stylesheet for rules that cannot be inlined.
pub mod passthrough;
/// CSS selector parsing and matching per [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
pub mod selector;
/// CSS tokenizer per [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization).
pub mod tokenizer;
/// `url()` rewriting.
pub mod urls;

// Re-exports for convenience
pub use cascade::{
    CascadeResult, MatchResult, MatchStrategy, ResolvedStyle, RuleIndex, resolve, resolve_with,
};
pub use parser::{AtRule, CSSParser, Declaration, Rule, StyleRule, Stylesheet};
pub use passthrough::{reduced_stylesheet, referenced_classes};
pub use selector::{
    ParsedSelector, SelectorError, Specificity, matches, parse_selector, parse_selector_list,
};
pub use tokenizer::{CSSToken, CSSTokenizer};
pub use urls::rewrite_urls;
