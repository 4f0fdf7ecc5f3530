//! Selector parsing.
//!
//! [§ 18 Grammar](https://www.w3.org/TR/selectors-4/#grammar)
//!
//! Selectors are parsed from their source text rather than from CSS tokens so
//! that a rule's prelude can be kept verbatim when it has to be passed
//! through unchanged.

use std::borrow::Cow;

use thiserror::Error;

use super::nth::Nth;
use super::{
    AttributeOperator, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    ParsedSelector, PseudoClass, SimpleSelector,
};
use crate::tokenizer::scanner::{is_ident_code_point, is_ident_start_code_point};

/// Pseudo-elements that CSS 2 allowed with a single colon.
///
/// [§ 3.6.1 Syntax](https://www.w3.org/TR/selectors-4/#pseudo-element-syntax)
/// "For compatibility with existing style sheets, user agents must also accept
/// the previous one-colon notation for pseudo-elements introduced in CSS
/// levels 1 and 2 (namely, :first-line, :first-letter, :before and :after)."
const LEGACY_PSEUDO_ELEMENTS: &[&str] = &["before", "after", "first-line", "first-letter"];

/// Why a selector could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// Nothing but whitespace, or an empty entry in a selector list.
    #[error("empty selector")]
    Empty,
    /// A character that cannot appear at this point.
    #[error("unexpected {found:?} at position {position}")]
    Unexpected {
        /// The offending character.
        found: char,
        /// Its index in the selector, in characters.
        position: usize,
    },
    /// The selector stopped in the middle of a construct.
    #[error("unexpected end of selector")]
    UnexpectedEnd,
    /// A combinator with nothing to its right.
    #[error("dangling combinator")]
    DanglingCombinator,
    /// A functional pseudo-class with a bad or missing argument, or arguments
    /// given to a pseudo-class that takes none.
    #[error("invalid arguments for :{0}")]
    InvalidArgument(String),
}

/// Parse a comma-separated selector list.
///
/// [§ 4.1 Selector Lists](https://www.w3.org/TR/selectors-4/#grouping)
/// "If just one of these selectors were invalid, the entire selector list
/// would be invalid."
///
/// # Errors
///
/// Returns the first error from any selector in the list.
pub fn parse_selector_list(raw: &str) -> Result<Vec<ParsedSelector>, SelectorError> {
    let stripped = strip_comments(raw);
    split_top_level(&stripped)
        .into_iter()
        .map(parse_selector)
        .collect()
}

/// Parse a single complex selector.
///
/// # Errors
///
/// Returns a [`SelectorError`] if `raw` is not a selector this engine
/// understands. Namespace prefixes and complex selectors inside `:not()` are
/// rejected.
pub fn parse_selector(raw: &str) -> Result<ParsedSelector, SelectorError> {
    let stripped = strip_comments(raw);
    let text = trim_css_whitespace(&stripped);
    if text.is_empty() {
        return Err(SelectorError::Empty);
    }
    let complex = SelectorParser::new(text).parse_complex()?;
    let specificity = complex.calculate_specificity();
    Ok(ParsedSelector {
        text: text.to_string(),
        complex,
        specificity,
    })
}

fn trim_css_whitespace(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_ascii_whitespace())
}

/// Remove `/* ... */` comments outside strings.
///
/// [§ 4.3.2 Consume comments](https://www.w3.org/TR/css-syntax-3/#consume-comment)
/// An unterminated comment runs to the end of the input.
fn strip_comments(raw: &str) -> Cow<'_, str> {
    if !raw.contains("/*") {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    let mut quote: Option<char> = None;
    while let Some(c) = chars.next() {
        match (c, quote) {
            ('\\', _) => {
                out.push(c);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            ('/', None) if chars.peek() == Some(&'*') => {
                let _ = chars.next();
                let mut prev = '\0';
                for inner in chars.by_ref() {
                    if prev == '*' && inner == '/' {
                        break;
                    }
                    prev = inner;
                }
            }
            (q, Some(open)) if q == open => {
                quote = None;
                out.push(c);
            }
            ('"' | '\'', None) => {
                quote = Some(c);
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Split on commas that are not nested in parentheses, brackets or strings.
fn split_top_level(raw: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in raw.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (c, quote) {
            ('\\', _) => escaped = true,
            (q, Some(open)) if q == open => quote = None,
            (_, Some(_)) => {}
            ('"' | '\'', None) => quote = Some(c),
            ('(' | '[', None) => depth += 1,
            (')' | ']', None) => depth = depth.saturating_sub(1),
            (',', None) if depth == 0 => {
                parts.push(raw.get(start..i).unwrap_or_default());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(raw.get(start..).unwrap_or_default());
    parts
}

struct SelectorParser {
    chars: Vec<char>,
    pos: usize,
}

impl SelectorParser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn advance(&mut self) {
        self.pos = (self.pos + 1).min(self.chars.len());
    }

    const fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    /// Returns true if any whitespace was skipped.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.advance();
        }
        self.pos > start
    }

    fn unexpected(&self) -> SelectorError {
        self.peek()
            .map_or(SelectorError::UnexpectedEnd, |found| SelectorError::Unexpected {
                found,
                position: self.pos,
            })
    }

    /// `<complex-selector> = <compound-selector> [ <combinator>? <compound-selector> ]*`
    fn parse_complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let _ = self.skip_whitespace();
        let mut left: Vec<(CompoundSelector, Combinator)> = Vec::new();
        let mut current = self.parse_compound()?;

        loop {
            let had_whitespace = self.skip_whitespace();
            let Some(c) = self.peek() else {
                break;
            };
            let combinator = match c {
                '>' => Combinator::Child,
                '+' => Combinator::NextSibling,
                '~' => Combinator::SubsequentSibling,
                _ if had_whitespace => Combinator::Descendant,
                _ => return Err(self.unexpected()),
            };
            if combinator != Combinator::Descendant {
                self.advance();
                let _ = self.skip_whitespace();
            }
            if self.at_end() {
                return Err(SelectorError::DanglingCombinator);
            }
            let next = self.parse_compound()?;
            left.push((std::mem::replace(&mut current, next), combinator));
        }

        Ok(ComplexSelector {
            subject: current,
            combinators: left
                .into_iter()
                .rev()
                .map(|(compound, combinator)| (combinator, compound))
                .collect(),
        })
    }

    /// `<compound-selector> = [ <type-selector>? <subclass-selector>* ]!`
    fn parse_compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut simple_selectors = Vec::new();

        if self.peek() == Some('*') {
            self.advance();
            simple_selectors.push(SimpleSelector::Universal);
        } else if self.starts_ident() {
            let name = self.consume_ident();
            simple_selectors.push(SimpleSelector::Type(name.to_ascii_lowercase()));
        }

        loop {
            let simple = match self.peek() {
                Some('#') => {
                    self.advance();
                    SimpleSelector::Id(self.expect_ident()?)
                }
                Some('.') => {
                    self.advance();
                    SimpleSelector::Class(self.expect_ident()?)
                }
                Some('[') => {
                    self.advance();
                    SimpleSelector::Attribute(self.parse_attribute()?)
                }
                Some(':') => {
                    self.advance();
                    self.parse_pseudo()?
                }
                _ => break,
            };
            simple_selectors.push(simple);
        }

        if simple_selectors.is_empty() {
            return Err(self.unexpected());
        }
        Ok(CompoundSelector { simple_selectors })
    }

    /// `<attribute-selector> = '[' <wq-name> ']' |
    ///     '[' <wq-name> <attr-matcher> [ <string-token> | <ident-token> ] <attr-modifier>? ']'`
    fn parse_attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        let _ = self.skip_whitespace();
        let name = self.expect_ident()?.to_ascii_lowercase();
        let _ = self.skip_whitespace();

        let operator = match (self.peek(), self.peek_at(1)) {
            (Some(']'), _) => {
                self.advance();
                return Ok(AttributeSelector {
                    name,
                    operator: AttributeOperator::Exists,
                    value: String::new(),
                    case_insensitive: false,
                });
            }
            (Some('='), _) => AttributeOperator::Equals,
            (Some('~'), Some('=')) => AttributeOperator::Includes,
            (Some('|'), Some('=')) => AttributeOperator::DashMatch,
            (Some('^'), Some('=')) => AttributeOperator::Prefix,
            (Some('$'), Some('=')) => AttributeOperator::Suffix,
            (Some('*'), Some('=')) => AttributeOperator::Substring,
            _ => return Err(self.unexpected()),
        };
        if operator != AttributeOperator::Equals {
            self.advance();
        }
        self.advance();
        let _ = self.skip_whitespace();

        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.advance();
                self.consume_string(quote)?
            }
            _ => self.expect_ident()?,
        };
        let _ = self.skip_whitespace();

        // `<attr-modifier> = i | s`
        let mut case_insensitive = false;
        if let Some(flag @ ('i' | 'I' | 's' | 'S')) = self.peek() {
            self.advance();
            case_insensitive = flag.eq_ignore_ascii_case(&'i');
            let _ = self.skip_whitespace();
        }

        if self.peek() != Some(']') {
            return Err(self.unexpected());
        }
        self.advance();
        Ok(AttributeSelector {
            name,
            operator,
            value,
            case_insensitive,
        })
    }

    /// `<pseudo-class-selector>` or `<pseudo-element-selector>`, after the
    /// first colon.
    fn parse_pseudo(&mut self) -> Result<SimpleSelector, SelectorError> {
        let is_element = self.peek() == Some(':');
        if is_element {
            self.advance();
        }
        let name = self.expect_ident()?.to_ascii_lowercase();
        let arguments = if self.peek() == Some('(') {
            self.advance();
            Some(self.consume_arguments()?)
        } else {
            None
        };

        if is_element || LEGACY_PSEUDO_ELEMENTS.contains(&name.as_str()) {
            return Ok(SimpleSelector::PseudoElement(name));
        }

        let pseudo = name
            .parse::<PseudoClass>()
            .unwrap_or_else(|_| PseudoClass::Dynamic(name.clone()));
        let nth = |arg: &str| Nth::parse(arg).ok_or_else(|| SelectorError::InvalidArgument(name.clone()));
        let pseudo = match (pseudo, arguments) {
            // Unknown functional pseudo-classes keep their name and drop the
            // arguments. They never match.
            (PseudoClass::Dynamic(_), _) => PseudoClass::Dynamic(name.clone()),
            (PseudoClass::NthChild(_), Some(arg)) => PseudoClass::NthChild(nth(arg.as_str())?),
            (PseudoClass::NthLastChild(_), Some(arg)) => PseudoClass::NthLastChild(nth(arg.as_str())?),
            (PseudoClass::NthOfType(_), Some(arg)) => PseudoClass::NthOfType(nth(arg.as_str())?),
            (PseudoClass::NthLastOfType(_), Some(arg)) => PseudoClass::NthLastOfType(nth(arg.as_str())?),
            (PseudoClass::Not(_), Some(arg)) => PseudoClass::Not(parse_compound_list(&arg)?),
            (
                PseudoClass::NthChild(_)
                | PseudoClass::NthLastChild(_)
                | PseudoClass::NthOfType(_)
                | PseudoClass::NthLastOfType(_)
                | PseudoClass::Not(_),
                None,
            )
            | (_, Some(_)) => return Err(SelectorError::InvalidArgument(name)),
            (pseudo, None) => pseudo,
        };
        Ok(SimpleSelector::PseudoClass(pseudo))
    }

    /// Everything up to the matching `)`, which is consumed.
    fn consume_arguments(&mut self) -> Result<String, SelectorError> {
        let mut out = String::new();
        let mut depth = 1usize;
        let mut quote: Option<char> = None;
        while let Some(c) = self.bump() {
            match (c, quote) {
                ('\\', _) => {
                    out.push(c);
                    if let Some(next) = self.bump() {
                        out.push(next);
                    }
                    continue;
                }
                (q, Some(open)) if q == open => quote = None,
                (_, Some(_)) => {}
                ('"' | '\'', None) => quote = Some(c),
                ('(', None) => depth += 1,
                (')', None) => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(out);
                    }
                }
                _ => {}
            }
            out.push(c);
        }
        Err(SelectorError::UnexpectedEnd)
    }

    /// [§ 4.3.5 Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token),
    /// after the opening quote.
    fn consume_string(&mut self, quote: char) -> Result<String, SelectorError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(SelectorError::UnexpectedEnd),
                Some(c) if c == quote => return Ok(out),
                // "newline: This is a parse error. ... create a <bad-string-token>"
                Some('\n' | '\r' | '\x0C') => return Err(self.unexpected()),
                Some('\\') => match self.peek() {
                    None => {}
                    // "Otherwise, if the next input code point is a newline,
                    // consume it."
                    Some('\n' | '\r' | '\x0C') => self.advance(),
                    Some(_) => out.push(self.consume_escape()),
                },
                Some(c) => out.push(c),
            }
        }
    }

    /// [§ 4.3.9 Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#would-start-an-identifier)
    fn starts_ident(&self) -> bool {
        match self.peek() {
            Some('-') => match self.peek_at(1) {
                Some(c) if is_ident_start_code_point(c) || c == '-' => true,
                Some('\\') => self.is_valid_escape_at(1),
                _ => false,
            },
            Some(c) if is_ident_start_code_point(c) => true,
            Some('\\') => self.is_valid_escape_at(0),
            _ => false,
        }
    }

    /// [§ 4.3.8 Check if two code points are a valid escape](https://www.w3.org/TR/css-syntax-3/#starts-with-a-valid-escape)
    fn is_valid_escape_at(&self, offset: usize) -> bool {
        self.peek_at(offset) == Some('\\')
            && self
                .peek_at(offset + 1)
                .is_some_and(|c| !matches!(c, '\n' | '\r' | '\x0C'))
    }

    fn expect_ident(&mut self) -> Result<String, SelectorError> {
        if self.starts_ident() {
            Ok(self.consume_ident())
        } else {
            Err(self.unexpected())
        }
    }

    /// [§ 4.3.11 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    fn consume_ident(&mut self) -> String {
        let mut out = String::new();
        loop {
            match self.peek() {
                Some(c) if is_ident_code_point(c) => {
                    out.push(c);
                    self.advance();
                }
                Some('\\') if self.is_valid_escape_at(0) => {
                    self.advance();
                    out.push(self.consume_escape());
                }
                _ => return out,
            }
        }
    }

    /// [§ 4.3.7 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point),
    /// after the backslash.
    fn consume_escape(&mut self) -> char {
        let Some(first) = self.bump() else {
            return char::REPLACEMENT_CHARACTER;
        };
        if !first.is_ascii_hexdigit() {
            return first;
        }
        let mut hex = String::from(first);
        while hex.len() < 6 && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            if let Some(c) = self.bump() {
                hex.push(c);
            }
        }
        // "If the next input code point is whitespace, consume it as well."
        if self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.advance();
        }
        // "If this number is zero, or is for a surrogate, or is greater than
        // the maximum allowed code point, return U+FFFD."
        u32::from_str_radix(&hex, 16)
            .ok()
            .filter(|&n| n != 0)
            .and_then(char::from_u32)
            .unwrap_or(char::REPLACEMENT_CHARACTER)
    }
}

/// `:not()` takes a list of compound selectors.
fn parse_compound_list(raw: &str) -> Result<Vec<CompoundSelector>, SelectorError> {
    split_top_level(raw)
        .into_iter()
        .map(|part| {
            let part = trim_css_whitespace(part);
            if part.is_empty() {
                return Err(SelectorError::Empty);
            }
            let mut parser = SelectorParser::new(part);
            let compound = parser.parse_compound()?;
            if parser.at_end() {
                Ok(compound)
            } else {
                Err(parser.unexpected())
            }
        })
        .collect()
}
