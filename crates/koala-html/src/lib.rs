//! HTML tokenizer, tree builder and serializer for the Koala CSS inliner.
//!
//! # Scope
//!
//! This crate implements:
//! - **HTML Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Data, RCDATA, RAWTEXT, script data and PLAINTEXT states
//!   - DOCTYPE, comment and tag states
//!   - Character references, decoded in attribute values only
//!
//! - **HTML Parser / Tree Builder** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - Insertion modes: Initial, BeforeHtml, BeforeHead, InHead, AfterHead, InBody, Text, AfterBody, AfterAfterBody
//!   - Implicit tag handling and stack of open elements
//!   - SVG and MathML foreign content
//!
//! - **Serializer** ([WHATWG § 13.3](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments))
//!
//! # Not Implemented
//!
//! - Table, select and template insertion modes
//! - Foster parenting
//! - Adoption agency algorithm

/// HTML parser and tree construction.
pub mod parser;
/// Markup output.
pub mod serializer;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

use koala_common::Diagnostics;
use koala_dom::DomTree;

pub use parser::{HTMLParser, InsertionMode};
pub use serializer::{serialize, serialize_node, serialize_to};
pub use tokenizer::{HTMLTokenizer, Token};

/// Tokenize and build a document in one step.
///
/// Returns the tree together with every tokenizer and tree builder parse
/// error. Parsing never fails.
#[must_use]
pub fn parse_document(html: &str) -> (DomTree, Diagnostics) {
    let mut tokenizer = HTMLTokenizer::new(html.to_string());
    tokenizer.run();
    let (tokens, mut diagnostics) = tokenizer.into_parts();
    let (tree, tree_diagnostics) = HTMLParser::new(tokens).run_with_issues();
    diagnostics.extend(tree_diagnostics);
    tracing::debug!(nodes = tree.len(), warnings = diagnostics.len(), "parsed document");
    (tree, diagnostics)
}
