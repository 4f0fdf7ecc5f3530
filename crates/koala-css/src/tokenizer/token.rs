//! CSS token types per [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization).
//!
//! The inliner never computes values, so numeric tokens keep only what the
//! parser needs to tell them apart. Every token also remembers where it came
//! from in the source, which lets the parser hand back declaration values and
//! selector text exactly as authored.

use core::fmt;

/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#token-diagrams)
///
/// "A `<hash-token>` with the type flag set to 'id'... or 'unrestricted'."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashType {
    /// The value would start an ident sequence (`#main`, `#fff`).
    Id,
    /// Anything else (`#123`).
    Unrestricted,
}

/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#token-diagrams)
///
/// "A `<number-token>` has a type flag set to either 'integer' or 'number'."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericType {
    /// No decimal point or exponent.
    Integer,
    /// Has a decimal point or exponent.
    Number,
}

/// A token from CSS Syntax Level 3.
#[derive(Debug, Clone, PartialEq)]
pub enum CSSToken {
    /// `<ident-token>`
    Ident(String),
    /// `<function-token>`, the name without the opening parenthesis.
    Function(String),
    /// `<at-keyword-token>`, the name without the `@`.
    AtKeyword(String),
    /// `<hash-token>`
    Hash {
        /// The name after `#`.
        value: String,
        /// "a type flag set to either 'id' or 'unrestricted'"
        hash_type: HashType,
    },
    /// `<string-token>` with escapes resolved.
    String(String),
    /// `<bad-string-token>`: a string broken by an unescaped newline.
    BadString,
    /// `<url-token>` for an unquoted `url(...)`.
    Url(String),
    /// `<bad-url-token>`
    BadUrl,
    /// `<delim-token>`
    Delim(char),
    /// `<number-token>`
    Number {
        /// The numeric value.
        value: f64,
        /// Integer or number.
        numeric_type: NumericType,
    },
    /// `<percentage-token>`
    Percentage {
        /// The numeric value, without the `%`.
        value: f64,
    },
    /// `<dimension-token>`
    Dimension {
        /// The numeric value.
        value: f64,
        /// The unit as written.
        unit: String,
    },
    /// `<whitespace-token>`
    Whitespace,
    /// `<CDO-token>` (`<!--`)
    CDO,
    /// `<CDC-token>` (`-->`)
    CDC,
    /// `<colon-token>`
    Colon,
    /// `<semicolon-token>`
    Semicolon,
    /// `<comma-token>`
    Comma,
    /// `<[-token>`
    LeftBracket,
    /// `<]-token>`
    RightBracket,
    /// `<(-token>`
    LeftParen,
    /// `<)-token>`
    RightParen,
    /// `<{-token>`
    LeftBrace,
    /// `<}-token>`
    RightBrace,
    /// End of input.
    EOF,
}

impl CSSToken {
    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EOF)
    }

    /// Returns true if this is a whitespace token.
    #[must_use]
    pub const fn is_whitespace(&self) -> bool {
        matches!(self, Self::Whitespace)
    }

    /// `<bad-string-token>` and `<bad-url-token>` "represent a parsing error".
    #[must_use]
    pub const fn is_bad(&self) -> bool {
        matches!(self, Self::BadString | Self::BadUrl)
    }
}

impl fmt::Display for CSSToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(v) => write!(f, "<ident:{v}>"),
            Self::Function(v) => write!(f, "<function:{v}(>"),
            Self::AtKeyword(v) => write!(f, "<at-keyword:@{v}>"),
            Self::Hash { value, hash_type } => {
                let t = match hash_type {
                    HashType::Id => "id",
                    HashType::Unrestricted => "unrestricted",
                };
                write!(f, "<hash:#{value} ({t})>")
            }
            Self::String(v) => write!(f, "<string:\"{v}\">"),
            Self::BadString => write!(f, "<bad-string>"),
            Self::Url(v) => write!(f, "<url:{v}>"),
            Self::BadUrl => write!(f, "<bad-url>"),
            Self::Delim(c) => write!(f, "<delim:{c}>"),
            Self::Number { value, .. } => write!(f, "<number:{value}>"),
            Self::Percentage { value } => write!(f, "<percentage:{value}%>"),
            Self::Dimension { value, unit } => write!(f, "<dimension:{value}{unit}>"),
            Self::Whitespace => write!(f, "<whitespace>"),
            Self::CDO => write!(f, "<CDO>"),
            Self::CDC => write!(f, "<CDC>"),
            Self::Colon => write!(f, "<colon>"),
            Self::Semicolon => write!(f, "<semicolon>"),
            Self::Comma => write!(f, "<comma>"),
            Self::LeftBracket => write!(f, "<[>"),
            Self::RightBracket => write!(f, "<]>"),
            Self::LeftParen => write!(f, "<(>"),
            Self::RightParen => write!(f, "<)>"),
            Self::LeftBrace => write!(f, "<{{>"),
            Self::RightBrace => write!(f, "<}}>"),
            Self::EOF => write!(f, "<EOF>"),
        }
    }
}

/// A token together with the byte range it was read from.
///
/// Comments are never part of a span: the tokenizer skips them before it
/// records where the next token starts.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    /// The token.
    pub token: CSSToken,
    /// Byte offset of the first code point.
    pub start: usize,
    /// Byte offset one past the last code point.
    pub end: usize,
}

impl SpannedToken {
    /// The source text this token was read from.
    #[must_use]
    pub fn slice<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.start..self.end).unwrap_or_default()
    }
}
