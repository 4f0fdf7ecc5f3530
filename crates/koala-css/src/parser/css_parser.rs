//! CSS Parser per [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing).
//!
//! "The input to the parsing stage is a stream of tokens from the tokenization stage."
//!
//! The parser never computes values. Declaration values, selector preludes and
//! at-rules are sliced out of the source exactly as written, so that whatever
//! ends up in a `style` attribute or a passthrough `<style>` block is what the
//! author wrote.

use std::fmt;

use koala_common::{Component, Diagnostics};

use crate::selector::{ParsedSelector, parse_selector_list};
use crate::tokenizer::{CSSToken, CSSTokenizer, SpannedToken};

/// At-rules that cannot be inlined but are carried over verbatim.
const PASSTHROUGH_AT_RULES: &[&str] = &[
    "charset",
    "container",
    "counter-style",
    "document",
    "font-face",
    "font-feature-values",
    "import",
    "keyframes",
    "layer",
    "media",
    "namespace",
    "page",
    "supports",
    "viewport",
];

const VENDOR_PREFIXES: &[&str] = &["-webkit-", "-moz-", "-ms-", "-o-"];

static EOF: CSSToken = CSSToken::EOF;

/// [§ 5.4.4 Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-a-declaration)
///
/// A CSS declaration (e.g., `color: red`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// The property name, lowercased. Custom properties keep their case.
    pub name: String,
    /// The value as written, trimmed, without `!important`.
    pub value: String,
    /// Whether the declaration has `!important`.
    pub important: bool,
}

impl Declaration {
    /// Create a declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>, important: bool) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            important,
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)?;
        if self.important {
            f.write_str(" !important")?;
        }
        Ok(())
    }
}

/// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-qualified-rule)
///
/// A CSS style rule (selector list + declarations).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    /// The prelude as written, trimmed.
    pub selector_text: String,
    /// Parsed selectors. Empty when the prelude could not be parsed.
    pub selectors: Vec<ParsedSelector>,
    /// The declarations in this rule block.
    pub declarations: Vec<Declaration>,
    /// True when every selector can be resolved statically. A rule that is
    /// not inlinable has at least part of it carried over into the reduced
    /// stylesheet.
    pub inlinable: bool,
}

impl StyleRule {
    /// Selectors the cascade can apply.
    pub fn inlinable_selectors(&self) -> impl Iterator<Item = &ParsedSelector> {
        self.selectors.iter().filter(|s| s.is_inlinable())
    }

    /// The selector text to keep in the reduced stylesheet, if any.
    ///
    /// An unparseable prelude is kept whole. Otherwise only the selectors
    /// that cannot be inlined are kept.
    #[must_use]
    pub fn passthrough_selector_text(&self) -> Option<String> {
        if self.inlinable {
            return None;
        }
        if self.selectors.is_empty() {
            return Some(self.selector_text.clone());
        }
        let kept: Vec<&str> = self
            .selectors
            .iter()
            .filter(|s| !s.is_inlinable())
            .map(|s| s.text.as_str())
            .collect();
        Some(kept.join(", "))
    }
}

/// [§ 5.4.2 Consume an at-rule](https://www.w3.org/TR/css-syntax-3/#consume-at-rule)
///
/// An at-rule kept for passthrough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRule {
    /// The at-keyword name (without the `@`), lowercased.
    pub name: String,
    /// The prelude as written, trimmed.
    pub prelude: String,
    /// The whole rule as written, from `@` to the closing `;` or `}`.
    pub raw: String,
}

/// [§ 5.3.3 Consume a list of rules](https://www.w3.org/TR/css-syntax-3/#consume-list-of-rules)
///
/// A CSS rule (either a style rule or an at-rule).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// A style rule (qualified rule).
    Style(StyleRule),
    /// An at-rule.
    At(AtRule),
}

/// [§ 5.3.2 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
///
/// A parsed CSS stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stylesheet {
    /// The list of rules in the stylesheet, in source order.
    pub rules: Vec<Rule>,
}

impl Stylesheet {
    /// Style rules in source order.
    pub fn style_rules(&self) -> impl Iterator<Item = &StyleRule> {
        self.rules.iter().filter_map(|rule| match rule {
            Rule::Style(style) => Some(style),
            Rule::At(_) => None,
        })
    }

    /// Append the rules of a later sheet. Source order continues across
    /// sheets.
    pub fn append(&mut self, other: Self) {
        self.rules.extend(other.rules);
    }

    /// True if there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// CSS parser
pub struct CSSParser<'a> {
    source: &'a str,
    tokens: Vec<SpannedToken>,
    position: usize,
    diagnostics: Diagnostics,
}

impl<'a> CSSParser<'a> {
    /// Tokenize `source` and prepare to parse it.
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        let mut tokenizer = CSSTokenizer::new(source);
        tokenizer.run();
        Self {
            source,
            tokens: tokenizer.into_spanned(),
            position: 0,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Warnings recorded so far.
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Give up the parser and keep its warnings.
    #[must_use]
    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// [§ 5.3.3 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
    ///
    /// "To parse a stylesheet from input..."
    pub fn parse_stylesheet(&mut self) -> Stylesheet {
        // "Consume a list of rules from input, with the top-level flag set."
        let mut rules = Vec::new();

        loop {
            match self.peek() {
                // "<whitespace-token>" "Do nothing."
                // "<CDO-token>" or "<CDC-token>" "If the top-level flag is set, do nothing."
                CSSToken::Whitespace | CSSToken::CDO | CSSToken::CDC => self.consume(),

                // "<EOF-token>" "Return the list of rules."
                CSSToken::EOF => break,

                // "<at-keyword-token>"
                // "Reconsume the current input token. Consume an at-rule, and append
                // the returned value to the list of rules."
                CSSToken::AtKeyword(_) => {
                    if let Some(at_rule) = self.consume_at_rule() {
                        rules.push(Rule::At(at_rule));
                    }
                }

                CSSToken::RightBrace => {
                    self.warn("unexpected `}` at top level");
                    self.consume();
                }

                // "anything else"
                // "Reconsume the current input token. Consume a qualified rule. If
                // anything is returned, append it to the list of rules."
                _ => {
                    if let Some(rule) = self.consume_qualified_rule() {
                        rules.push(Rule::Style(rule));
                    }
                }
            }
        }

        tracing::debug!(rules = rules.len(), "parsed stylesheet");
        Stylesheet { rules }
    }

    /// [§ 5.3.6 Parse a list of declarations](https://www.w3.org/TR/css-syntax-3/#parse-list-of-declarations)
    ///
    /// The whole input is one declaration list. A stray `}` is skipped.
    pub fn parse_declaration_list(&mut self) -> Vec<Declaration> {
        self.consume_list_of_declarations(false)
    }

    /// [CSS Style Attributes § 3 Syntax](https://www.w3.org/TR/css-style-attr/#syntax)
    ///
    /// "The value of the style attribute must match the syntax of the contents
    /// of a CSS declaration block (excluding the delimiting braces)"
    pub fn parse_style_attribute(&mut self) -> Vec<Declaration> {
        let declarations = self.parse_declaration_list();
        tracing::trace!(count = declarations.len(), "parsed style attribute");
        declarations
    }

    fn peek(&self) -> &CSSToken {
        self.token_at(self.position)
    }

    fn token_at(&self, index: usize) -> &CSSToken {
        self.tokens.get(index).map_or(&EOF, |t| &t.token)
    }

    /// Move past the current token. EOF is never consumed.
    fn consume(&mut self) {
        if !self.peek().is_eof() {
            self.position += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_whitespace() {
            self.consume();
        }
    }

    /// Byte offset where the current token starts.
    fn current_start(&self) -> usize {
        self.tokens
            .get(self.position)
            .map_or(self.source.len(), |t| t.start)
    }

    /// Byte offset just past the last consumed token.
    fn previous_end(&self) -> usize {
        self.position
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(0, |t| t.end)
    }

    fn slice(&self, start: usize, end: usize) -> &'a str {
        self.source.get(start..end).unwrap_or_default()
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.diagnostics.warn(Component::Css, message);
    }

    /// [§ 5.4.7 Consume a component value](https://www.w3.org/TR/css-syntax-3/#consume-component-value)
    ///
    /// Skips one preserved token, or a whole block or function. When EOF cuts
    /// a block short, returns the closing characters it was missing so the
    /// caller can close it implicitly.
    fn consume_component_value(&mut self) -> String {
        let mut open: Vec<char> = Vec::new();
        loop {
            match self.peek() {
                CSSToken::EOF => break,
                CSSToken::LeftBrace => open.push('}'),
                CSSToken::LeftBracket => open.push(']'),
                CSSToken::LeftParen | CSSToken::Function(_) => open.push(')'),
                token @ (CSSToken::RightBrace | CSSToken::RightBracket | CSSToken::RightParen) => {
                    let close = match token {
                        CSSToken::RightBrace => '}',
                        CSSToken::RightBracket => ']',
                        _ => ')',
                    };
                    // "<}-token>, <]-token>, <)-token>": a mismatched closer
                    // inside a block is an ordinary token.
                    if open.last() == Some(&close) {
                        let _ = open.pop();
                    }
                }
                _ => {}
            }
            self.consume();
            if open.is_empty() {
                return String::new();
            }
        }
        if !open.is_empty() {
            self.warn("unterminated block closed at end of input");
        }
        open.into_iter().rev().collect()
    }

    /// [§ 5.4.2 Consume an at-rule](https://www.w3.org/TR/css-syntax-3/#consume-at-rule)
    fn consume_at_rule(&mut self) -> Option<AtRule> {
        let start = self.current_start();
        let CSSToken::AtKeyword(keyword) = self.peek() else {
            return None;
        };
        let name = keyword.to_ascii_lowercase();
        self.consume();

        let prelude_start = self.current_start();
        let prelude_end;
        let mut missing = String::new();
        loop {
            match self.peek() {
                // "<semicolon-token>" "Return the at-rule."
                CSSToken::Semicolon => {
                    prelude_end = self.current_start();
                    self.consume();
                    break;
                }
                // "<EOF-token>" "This is a parse error. Return the at-rule."
                CSSToken::EOF => {
                    prelude_end = self.previous_end().max(prelude_start);
                    break;
                }
                // "<{-token>" "Consume a simple block and assign it to the
                // at-rule's block. Return the at-rule."
                CSSToken::LeftBrace => {
                    prelude_end = self.current_start();
                    missing = self.consume_component_value();
                    break;
                }
                // "anything else" "Reconsume the current input token. Consume a
                // component value. Append the returned value to the at-rule's prelude."
                _ => missing.push_str(&self.consume_component_value()),
            }
        }

        if !is_passthrough_at_rule(&name) {
            self.warn(format!("unknown at-rule @{name} skipped"));
            return None;
        }

        let raw = format!("{}{missing}", self.slice(start, self.previous_end()));
        Some(AtRule {
            name,
            prelude: trim_css_whitespace(self.slice(prelude_start, prelude_end)).to_string(),
            raw,
        })
    }

    /// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-qualified-rule)
    fn consume_qualified_rule(&mut self) -> Option<StyleRule> {
        let start = self.current_start();

        loop {
            match self.peek() {
                // "<EOF-token>" "This is a parse error. Return nothing."
                CSSToken::EOF => {
                    self.warn("rule without a declaration block dropped");
                    return None;
                }
                // "<{-token>" "Consume a simple block and assign it to the
                // qualified rule's block. Return the qualified rule."
                CSSToken::LeftBrace => break,
                // "anything else" "Reconsume the current input token. Consume a
                // component value. Append the returned value to the qualified
                // rule's prelude."
                _ => {
                    let _ = self.consume_component_value();
                }
            }
        }

        let selector_text = trim_css_whitespace(self.slice(start, self.current_start())).to_string();
        self.consume();
        let declarations = self.consume_list_of_declarations(true);
        if self.peek().is_eof() {
            self.warn("unterminated block closed at end of input");
        } else {
            self.consume();
        }

        if selector_text.is_empty() {
            self.warn("rule without a selector dropped");
            return None;
        }

        let (selectors, inlinable) = match parse_selector_list(&selector_text) {
            Ok(selectors) => {
                let inlinable = selectors.iter().all(ParsedSelector::is_inlinable);
                (selectors, inlinable)
            }
            Err(err) => {
                self.diagnostics.warn(
                    Component::Selector,
                    format!("unsupported selector `{selector_text}`: {err}"),
                );
                (Vec::new(), false)
            }
        };
        if !inlinable {
            tracing::trace!(selector = %selector_text, "rule kept for passthrough");
        }

        Some(StyleRule {
            selector_text,
            selectors,
            declarations,
            inlinable,
        })
    }

    /// [§ 5.4.5 Consume a list of declarations](https://www.w3.org/TR/css-syntax-3/#consume-list-of-declarations)
    ///
    /// `in_block` stops at the `}` that closes a style rule.
    fn consume_list_of_declarations(&mut self, in_block: bool) -> Vec<Declaration> {
        let mut declarations = Vec::new();

        loop {
            match self.peek() {
                // "<whitespace-token>" or "<semicolon-token>" "Do nothing."
                CSSToken::Whitespace | CSSToken::Semicolon => self.consume(),

                // "<EOF-token>" "Return the list of declarations."
                CSSToken::EOF => return declarations,
                CSSToken::RightBrace if in_block => return declarations,
                CSSToken::RightBrace => {
                    self.warn("unexpected `}` in declaration list");
                    self.consume();
                }

                // "<at-keyword-token>" "Reconsume the current input token.
                // Consume an at-rule."
                //
                // Nested rules have no meaning in a style attribute.
                CSSToken::AtKeyword(name) => {
                    let message = format!("at-rule @{name} inside a declaration block skipped");
                    self.warn(message);
                    self.skip_nested_at_rule(in_block);
                }

                // "<ident-token>" "Consume a declaration. If anything was
                // returned, append it to the list of declarations."
                CSSToken::Ident(_) => {
                    if let Some(declaration) = self.consume_declaration(in_block) {
                        declarations.push(declaration);
                    }
                }

                // "anything else" "This is a parse error. Reconsume the current
                // input token. As long as the next input token is anything other
                // than a <semicolon-token> or <EOF-token>, consume a component
                // value and throw away the returned value."
                other => {
                    let message = format!("unexpected {other} in declaration list");
                    self.warn(message);
                    self.skip_to_declaration_end(in_block);
                }
            }
        }
    }

    fn skip_nested_at_rule(&mut self, in_block: bool) {
        self.consume();
        loop {
            match self.peek() {
                CSSToken::Semicolon => {
                    self.consume();
                    return;
                }
                CSSToken::EOF => return,
                CSSToken::RightBrace if in_block => return,
                CSSToken::LeftBrace => {
                    let _ = self.consume_component_value();
                    return;
                }
                _ => {
                    let _ = self.consume_component_value();
                }
            }
        }
    }

    fn skip_to_declaration_end(&mut self, in_block: bool) {
        loop {
            match self.peek() {
                CSSToken::Semicolon | CSSToken::EOF => return,
                CSSToken::RightBrace if in_block => return,
                _ => {
                    let _ = self.consume_component_value();
                }
            }
        }
    }

    /// Drop whitespace component values from the end of `components`.
    fn trim_trailing_whitespace(&self, components: &mut Vec<(usize, usize)>) {
        while let Some(&(first, last)) = components.last()
            && first == last
            && self.token_at(first).is_whitespace()
        {
            let _ = components.pop();
        }
    }

    /// [§ 5.4.6 Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-declaration)
    fn consume_declaration(&mut self, in_block: bool) -> Option<Declaration> {
        // "Consume the next input token."
        let CSSToken::Ident(raw_name) = self.peek() else {
            return None;
        };
        let name = if raw_name.starts_with("--") {
            raw_name.clone()
        } else {
            raw_name.to_ascii_lowercase()
        };
        self.consume();

        // "While the next input token is a <whitespace-token>, consume the next input token."
        self.skip_whitespace();

        // "If the next input token is anything other than a <colon-token>, this
        // is a parse error. Return nothing."
        if !matches!(self.peek(), CSSToken::Colon) {
            self.warn(format!("declaration `{name}` is missing a colon"));
            self.skip_to_declaration_end(in_block);
            return None;
        }
        self.consume();
        self.skip_whitespace();

        // "As long as the next input token is anything other than an
        // <EOF-token>, consume a component value and append it to the
        // declaration's value."
        //
        // Each entry is the (first, last) token index of one component value.
        let mut components: Vec<(usize, usize)> = Vec::new();
        let mut missing = String::new();
        loop {
            match self.peek() {
                CSSToken::Semicolon | CSSToken::EOF => break,
                CSSToken::RightBrace if in_block => break,
                _ => {
                    let first = self.position;
                    missing.push_str(&self.consume_component_value());
                    components.push((first, self.position.saturating_sub(1).max(first)));
                }
            }
        }

        // "If the last two non-<whitespace-token>s in the declaration's value
        // are a <delim-token> with the value "!" followed by an <ident-token>
        // with a value that is an ASCII case-insensitive match for
        // "important", remove them from the declaration's value and set the
        // declaration's important flag to true."
        self.trim_trailing_whitespace(&mut components);
        let mut important = false;
        if let Some(&(first, last)) = components.last()
            && first == last
            && matches!(self.token_at(first), CSSToken::Ident(word) if word.eq_ignore_ascii_case("important"))
        {
            let mut rest = components.clone();
            let _ = rest.pop();
            self.trim_trailing_whitespace(&mut rest);
            if let Some(&(bang, _)) = rest.last()
                && matches!(self.token_at(bang), CSSToken::Delim('!'))
            {
                let _ = rest.pop();
                self.trim_trailing_whitespace(&mut rest);
                components = rest;
                important = true;
            }
        }

        let (Some(&(first, _)), Some(&(_, last))) = (components.first(), components.last()) else {
            self.warn(format!("declaration `{name}` has an empty value"));
            return None;
        };
        if (first..=last).any(|i| self.token_at(i).is_bad()) {
            self.warn(format!("declaration `{name}` has an invalid value"));
            return None;
        }

        let start = self.tokens.get(first).map_or(0, |t| t.start);
        let end = self.tokens.get(last).map_or(start, |t| t.end);
        let value = format!("{}{missing}", self.slice(start, end));
        Some(Declaration {
            name,
            value,
            important,
        })
    }
}

fn trim_css_whitespace(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_ascii_whitespace())
}

fn is_passthrough_at_rule(name: &str) -> bool {
    let unprefixed = VENDOR_PREFIXES
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .unwrap_or(name);
    PASSTHROUGH_AT_RULES.contains(&unprefixed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declarations(css: &str) -> Vec<Declaration> {
        CSSParser::new(css).parse_declaration_list()
    }

    #[test]
    fn test_value_is_raw_source_slice() {
        let decls = declarations("font-family : 'Helvetica Neue' , Arial /* note */ ;");
        assert_eq!(decls, vec![Declaration::new("font-family", "'Helvetica Neue' , Arial", false)]);
    }

    #[test]
    fn test_important_with_whitespace() {
        let decls = declarations("COLOR: red ! IMPORTANT; margin: 0!important");
        assert_eq!(
            decls,
            vec![
                Declaration::new("color", "red", true),
                Declaration::new("margin", "0", true),
            ]
        );
    }

    #[test]
    fn test_custom_property_keeps_case() {
        let decls = declarations("--Brand-Color: #f00");
        assert_eq!(decls[0].name, "--Brand-Color");
    }

    #[test]
    fn test_vendor_prefixed_keyframes_pass_through() {
        assert!(is_passthrough_at_rule("-webkit-keyframes"));
        assert!(is_passthrough_at_rule("media"));
        assert!(!is_passthrough_at_rule("tailwind"));
    }

    #[test]
    fn test_unclosed_function_is_closed() {
        let decls = declarations("background: url(a.png) rgb(1, 2");
        assert_eq!(decls[0].value, "url(a.png) rgb(1, 2)");
    }

    #[test]
    fn test_declaration_display() {
        assert_eq!(Declaration::new("color", "red", true).to_string(), "color: red !important");
    }
}
