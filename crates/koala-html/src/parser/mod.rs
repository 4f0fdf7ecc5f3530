//! HTML tree construction.

mod tree_builder;
/// SVG and MathML name adjustments.
pub mod foreign_content;

pub use tree_builder::{HTMLParser, InsertionMode, VOID_ELEMENTS};
