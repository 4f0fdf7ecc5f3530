use super::token::{CSSToken, HashType, NumericType, SpannedToken};

/// [§ 4.3 Tokenizer Algorithms](https://www.w3.org/TR/css-syntax-3/#tokenizer-algorithms)
///
/// CSS tokenizer following CSS Syntax Module Level 3.
///
/// Tokenization never fails. Malformed strings and URLs become
/// `<bad-string-token>` / `<bad-url-token>` and the parser decides what to
/// drop.
pub struct CSSTokenizer {
    /// Code points paired with their byte offset in the source.
    input: Vec<(usize, char)>,
    /// Byte length of the source, the offset of EOF.
    source_len: usize,
    /// Index of the next code point in `input`.
    position: usize,
    /// Collected tokens
    tokens: Vec<SpannedToken>,
}

impl CSSTokenizer {
    /// Create a new CSS tokenizer with the given input.
    pub fn new(input: impl Into<String>) -> Self {
        let source: String = input.into();
        Self {
            input: source.char_indices().collect(),
            source_len: source.len(),
            position: 0,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the whole input. The last token is always `EOF`.
    pub fn run(&mut self) {
        loop {
            // "Consume comments."
            self.consume_comments();
            let start = self.byte_offset();
            let token = self.consume_token();
            let end = self.byte_offset();
            let is_eof = token.is_eof();
            self.tokens.push(SpannedToken { token, start, end });
            if is_eof {
                break;
            }
        }
    }

    /// Return the collected tokens without their spans.
    #[must_use]
    pub fn into_tokens(self) -> Vec<CSSToken> {
        self.tokens.into_iter().map(|t| t.token).collect()
    }

    /// Return the collected tokens with their spans.
    #[must_use]
    pub fn into_spanned(self) -> Vec<SpannedToken> {
        self.tokens
    }

    /// [§ 4.3.1 Consume a token](https://www.w3.org/TR/css-syntax-3/#consume-token)
    fn consume_token(&mut self) -> CSSToken {
        // "Consume the next input code point."
        let Some(c) = self.consume() else {
            return CSSToken::EOF;
        };

        match c {
            // "whitespace"
            // "Consume as much whitespace as possible. Return a <whitespace-token>."
            c if is_whitespace(c) => {
                self.consume_whitespace();
                CSSToken::Whitespace
            }

            // "U+0022 QUOTATION MARK (")" / "U+0027 APOSTROPHE (')"
            // "Consume a string token and return it."
            '"' | '\'' => self.consume_string_token(c),

            // "U+0023 NUMBER SIGN (#)"
            '#' => {
                // "If the next input code point is an ident code point or the next
                // two input code points are a valid escape..."
                if self.peek().is_some_and(is_ident_code_point)
                    || is_valid_escape(self.peek(), self.peek_at(1))
                {
                    // "If the next 3 input code points would start an ident sequence,
                    // set the <hash-token>'s type flag to 'id'."
                    let hash_type = if self.would_start_ident_sequence() {
                        HashType::Id
                    } else {
                        HashType::Unrestricted
                    };
                    let value = self.consume_ident_sequence();
                    CSSToken::Hash { value, hash_type }
                } else {
                    CSSToken::Delim('#')
                }
            }

            '(' => CSSToken::LeftParen,
            ')' => CSSToken::RightParen,
            ',' => CSSToken::Comma,
            ':' => CSSToken::Colon,
            ';' => CSSToken::Semicolon,
            '[' => CSSToken::LeftBracket,
            ']' => CSSToken::RightBracket,
            '{' => CSSToken::LeftBrace,
            '}' => CSSToken::RightBrace,

            // "U+002B PLUS SIGN (+)" / "U+002E FULL STOP (.)"
            // "If the input stream starts with a number, reconsume the current
            // input code point, consume a numeric token, and return it."
            '+' | '.' => {
                self.reconsume();
                if self.would_start_number() {
                    self.consume_numeric_token()
                } else {
                    self.skip(1);
                    CSSToken::Delim(c)
                }
            }

            // "U+002D HYPHEN-MINUS (-)"
            '-' => {
                self.reconsume();
                if self.would_start_number() {
                    self.consume_numeric_token()
                }
                // "Otherwise, if the next 2 input code points are U+002D U+003E (->)..."
                else if self.peek_at(1) == Some('-') && self.peek_at(2) == Some('>') {
                    self.skip(3);
                    CSSToken::CDC
                }
                // "Otherwise, if the input stream starts with an ident sequence..."
                else if self.would_start_ident_sequence() {
                    self.consume_ident_like_token()
                } else {
                    self.skip(1);
                    CSSToken::Delim('-')
                }
            }

            // "U+003C LESS-THAN SIGN (<)"
            // "If the next 3 input code points are U+0021 U+002D U+002D (!--)..."
            '<' if self.peek() == Some('!')
                && self.peek_at(1) == Some('-')
                && self.peek_at(2) == Some('-') =>
            {
                self.skip(3);
                CSSToken::CDO
            }

            // "U+0040 COMMERCIAL AT (@)"
            '@' => {
                if self.would_start_ident_sequence() {
                    CSSToken::AtKeyword(self.consume_ident_sequence())
                } else {
                    CSSToken::Delim('@')
                }
            }

            // "U+005C REVERSE SOLIDUS (\)"
            '\\' => {
                if is_valid_escape(Some('\\'), self.peek()) {
                    self.reconsume();
                    self.consume_ident_like_token()
                } else {
                    // "This is a parse error."
                    CSSToken::Delim('\\')
                }
            }

            c if c.is_ascii_digit() => {
                self.reconsume();
                self.consume_numeric_token()
            }

            c if is_ident_start_code_point(c) => {
                self.reconsume();
                self.consume_ident_like_token()
            }

            // "anything else"
            c => CSSToken::Delim(c),
        }
    }

    /// [§ 4.3.2 Consume comments](https://www.w3.org/TR/css-syntax-3/#consume-comment)
    ///
    /// "If the next two input code points are U+002F SOLIDUS (/) followed by
    /// U+002A ASTERISK (*), consume them and all following code points up to
    /// and including the first U+002A ASTERISK (*) followed by U+002F SOLIDUS (/),
    /// or up to an EOF code point."
    fn consume_comments(&mut self) {
        while self.peek() == Some('/') && self.peek_at(1) == Some('*') {
            self.skip(2);
            loop {
                match self.consume() {
                    Some('*') if self.peek() == Some('/') => {
                        self.skip(1);
                        break;
                    }
                    Some(_) => {}
                    None => break,
                }
            }
        }
    }

    fn consume_whitespace(&mut self) {
        while self.peek().is_some_and(is_whitespace) {
            self.skip(1);
        }
    }

    /// [§ 4.3.4 Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    fn consume_string_token(&mut self, ending_code_point: char) -> CSSToken {
        let mut value = String::new();
        loop {
            match self.consume() {
                // "ending code point" / "EOF"
                // EOF is a parse error, but the string is still returned.
                None => return CSSToken::String(value),
                Some(c) if c == ending_code_point => return CSSToken::String(value),

                // "newline"
                // "This is a parse error. Reconsume the current input code point,
                // create a <bad-string-token>, and return it."
                Some(c) if is_newline(c) => {
                    self.reconsume();
                    return CSSToken::BadString;
                }

                // "U+005C REVERSE SOLIDUS (\)"
                Some('\\') => match self.peek() {
                    None => {}
                    Some(c) if is_newline(c) => self.skip(1),
                    Some(_) => value.push(self.consume_escaped_code_point()),
                },

                Some(c) => value.push(c),
            }
        }
    }

    /// [§ 4.3.3 Consume a numeric token](https://www.w3.org/TR/css-syntax-3/#consume-numeric-token)
    fn consume_numeric_token(&mut self) -> CSSToken {
        let (value, numeric_type) = self.consume_number();

        // "If the next 3 input code points would start an ident sequence..."
        if self.would_start_ident_sequence() {
            let unit = self.consume_ident_sequence();
            CSSToken::Dimension { value, unit }
        }
        // "Otherwise, if the next input code point is U+0025 PERCENTAGE SIGN (%)..."
        else if self.peek() == Some('%') {
            self.skip(1);
            CSSToken::Percentage { value }
        } else {
            CSSToken::Number {
                value,
                numeric_type,
            }
        }
    }

    /// [§ 4.3.4 Consume an ident-like token](https://www.w3.org/TR/css-syntax-3/#consume-ident-like-token)
    fn consume_ident_like_token(&mut self) -> CSSToken {
        let string = self.consume_ident_sequence();

        // "If string's value is an ASCII case-insensitive match for 'url',
        // and the next input code point is U+0028 LEFT PARENTHESIS (()"
        if string.eq_ignore_ascii_case("url") && self.peek() == Some('(') {
            self.skip(1);
            // "While the next two input code points are whitespace, consume the
            // next input code point."
            while self.peek().is_some_and(is_whitespace) && self.peek_at(1).is_some_and(is_whitespace)
            {
                self.skip(1);
            }
            // "If the next one or two input code points are U+0022 QUOTATION MARK,
            // U+0027 APOSTROPHE, or whitespace followed by U+0022 QUOTATION MARK or
            // U+0027 APOSTROPHE, then create a <function-token>"
            let quoted = |c: Option<char>| matches!(c, Some('"' | '\''));
            if quoted(self.peek())
                || (self.peek().is_some_and(is_whitespace) && quoted(self.peek_at(1)))
            {
                CSSToken::Function(string)
            } else {
                self.consume_url_token()
            }
        } else if self.peek() == Some('(') {
            self.skip(1);
            CSSToken::Function(string)
        } else {
            CSSToken::Ident(string)
        }
    }

    /// [§ 4.3.6 Consume a url token](https://www.w3.org/TR/css-syntax-3/#consume-url-token)
    fn consume_url_token(&mut self) -> CSSToken {
        let mut value = String::new();
        self.consume_whitespace();

        loop {
            match self.consume() {
                // "U+0029 RIGHT PARENTHESIS ())" / "EOF"
                Some(')') | None => return CSSToken::Url(value),

                // "whitespace"
                // "Consume as much whitespace as possible. If the next input code
                // point is U+0029 RIGHT PARENTHESIS ()) or EOF, consume it and
                // return the <url-token>; otherwise, consume the remnants of a bad
                // url, create a <bad-url-token>, and return it."
                Some(c) if is_whitespace(c) => {
                    self.consume_whitespace();
                    return match self.consume() {
                        Some(')') | None => CSSToken::Url(value),
                        Some(_) => {
                            self.consume_bad_url_remnants();
                            CSSToken::BadUrl
                        }
                    };
                }

                Some('"' | '\'' | '(') => {
                    self.consume_bad_url_remnants();
                    return CSSToken::BadUrl;
                }

                Some('\\') => {
                    if is_valid_escape(Some('\\'), self.peek()) {
                        value.push(self.consume_escaped_code_point());
                    } else {
                        self.consume_bad_url_remnants();
                        return CSSToken::BadUrl;
                    }
                }

                Some(c) => value.push(c),
            }
        }
    }

    /// [§ 4.3.14 Consume the remnants of a bad url](https://www.w3.org/TR/css-syntax-3/#consume-remnants-of-bad-url)
    fn consume_bad_url_remnants(&mut self) {
        loop {
            match self.consume() {
                Some(')') | None => return,
                Some('\\') if is_valid_escape(Some('\\'), self.peek()) => {
                    let _ = self.consume_escaped_code_point();
                }
                Some(_) => {}
            }
        }
    }

    /// [§ 4.3.11 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    fn consume_ident_sequence(&mut self) -> String {
        let mut result = String::new();
        loop {
            match self.peek() {
                Some(c) if is_ident_code_point(c) => {
                    self.skip(1);
                    result.push(c);
                }
                Some('\\') if is_valid_escape(Some('\\'), self.peek_at(1)) => {
                    self.skip(1);
                    result.push(self.consume_escaped_code_point());
                }
                _ => return result,
            }
        }
    }

    /// [§ 4.3.12 Consume a number](https://www.w3.org/TR/css-syntax-3/#consume-number)
    fn consume_number(&mut self) -> (f64, NumericType) {
        // "Initially set type to 'integer'. Let repr be the empty string."
        let mut numeric_type = NumericType::Integer;
        let mut repr = String::new();

        // "If the next input code point is U+002B PLUS SIGN (+) or U+002D
        // HYPHEN-MINUS (-), consume it and append it to repr."
        if matches!(self.peek(), Some('+' | '-')) {
            self.push_next(&mut repr);
        }
        self.push_digits(&mut repr);

        // "If the next 2 input code points are U+002E FULL STOP (.) followed by a digit..."
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.push_next(&mut repr);
            self.push_digits(&mut repr);
            numeric_type = NumericType::Number;
        }

        // "If the next 2 or 3 input code points are U+0045 LATIN CAPITAL LETTER E (E)
        // or U+0065 LATIN SMALL LETTER E (e), optionally followed by U+002D
        // HYPHEN-MINUS (-) or U+002B PLUS SIGN (+), followed by a digit..."
        if matches!(self.peek(), Some('e' | 'E')) {
            let has_sign = matches!(self.peek_at(1), Some('+' | '-'));
            let digit_at = if has_sign { 2 } else { 1 };
            if self.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                self.push_next(&mut repr);
                if has_sign {
                    self.push_next(&mut repr);
                }
                self.push_digits(&mut repr);
                numeric_type = NumericType::Number;
            }
        }

        // "Convert repr to a number"
        (repr.parse().unwrap_or(0.0), numeric_type)
    }

    fn push_next(&mut self, repr: &mut String) {
        if let Some(c) = self.consume() {
            repr.push(c);
        }
    }

    fn push_digits(&mut self, repr: &mut String) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.push_next(repr);
        }
    }

    /// [§ 4.3.7 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    ///
    /// Called after the backslash has been consumed.
    fn consume_escaped_code_point(&mut self) -> char {
        match self.consume() {
            // "hex digit"
            Some(c) if c.is_ascii_hexdigit() => {
                let mut hex = String::from(c);
                // "Consume as many hex digits as possible, but no more than 5."
                while hex.len() < 6 && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                    self.push_next(&mut hex);
                }
                // "If the next input code point is whitespace, consume it as well."
                if self.peek().is_some_and(is_whitespace) {
                    self.skip(1);
                }
                // "If this number is zero, or is for a surrogate, or is greater
                // than the maximum allowed code point, return U+FFFD REPLACEMENT
                // CHARACTER."
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|&n| n != 0)
                    .and_then(char::from_u32)
                    .unwrap_or('\u{FFFD}')
            }
            // "EOF"
            None => '\u{FFFD}',
            // "anything else"
            Some(c) => c,
        }
    }

    /// [§ 4.3.9 Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#would-start-an-identifier)
    fn would_start_ident_sequence(&self) -> bool {
        match self.peek() {
            // "U+002D HYPHEN-MINUS"
            // "If the second code point is an ident-start code point or a
            // U+002D HYPHEN-MINUS, or the second and third code points are a
            // valid escape, return true."
            Some('-') => {
                let second = self.peek_at(1);
                second.is_some_and(|c| is_ident_start_code_point(c) || c == '-')
                    || is_valid_escape(second, self.peek_at(2))
            }
            Some(c) if is_ident_start_code_point(c) => true,
            Some('\\') => is_valid_escape(Some('\\'), self.peek_at(1)),
            _ => false,
        }
    }

    /// [§ 4.3.10 Check if three code points would start a number](https://www.w3.org/TR/css-syntax-3/#starts-with-a-number)
    fn would_start_number(&self) -> bool {
        let digit = |c: Option<char>| c.is_some_and(|c| c.is_ascii_digit());
        match self.peek() {
            Some('+' | '-') => {
                digit(self.peek_at(1)) || (self.peek_at(1) == Some('.') && digit(self.peek_at(2)))
            }
            Some('.') => digit(self.peek_at(1)),
            c => digit(c),
        }
    }

    fn byte_offset(&self) -> usize {
        self.input
            .get(self.position)
            .map_or(self.source_len, |&(offset, _)| offset)
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += 1;
        Some(c)
    }

    fn skip(&mut self, n: usize) {
        self.position = (self.position + n).min(self.input.len());
    }

    fn reconsume(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).map(|&(_, c)| c)
    }
}

/// [§ 4.3.8 Check if two code points are a valid escape](https://www.w3.org/TR/css-syntax-3/#starts-with-a-valid-escape)
fn is_valid_escape(first: Option<char>, second: Option<char>) -> bool {
    first == Some('\\') && !second.is_some_and(is_newline)
}

/// [§ 4.2 newline](https://www.w3.org/TR/css-syntax-3/#newline)
///
/// CR and FF count as newlines because the input is not preprocessed.
const fn is_newline(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\x0C')
}

/// [§ 4.2 whitespace](https://www.w3.org/TR/css-syntax-3/#whitespace)
///
/// "A newline, U+0009 CHARACTER TABULATION, or U+0020 SPACE."
const fn is_whitespace(c: char) -> bool {
    is_newline(c) || matches!(c, '\t' | ' ')
}

/// [§ 4.2 ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
///
/// "A letter, a non-ASCII code point, or U+005F LOW LINE (_)."
pub(crate) const fn is_ident_start_code_point(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// [§ 4.2 ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
///
/// "An ident-start code point, a digit, or U+002D HYPHEN-MINUS (-)."
pub(crate) const fn is_ident_code_point(c: char) -> bool {
    is_ident_start_code_point(c) || c.is_ascii_digit() || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spanned(input: &str) -> Vec<SpannedToken> {
        let mut tokenizer = CSSTokenizer::new(input);
        tokenizer.run();
        tokenizer.into_spanned()
    }

    #[test]
    fn test_spans_are_byte_offsets() {
        let source = "é{x:1}";
        let tokens = spanned(source);
        assert_eq!(tokens[0].token, CSSToken::Ident("é".to_string()));
        assert_eq!((tokens[0].start, tokens[0].end), (0, 2));
        assert_eq!(tokens[1].slice(source), "{");
        assert_eq!(tokens.last().map(|t| t.start), Some(source.len()));
    }

    #[test]
    fn test_comments_excluded_from_spans() {
        let source = "/* lead */a/* mid */b";
        let tokens = spanned(source);
        assert_eq!(tokens[0].slice(source), "a");
        assert_eq!(tokens[1].slice(source), "b");
    }

    #[test]
    fn test_escape_out_of_range() {
        let tokens = spanned("\\110000 x");
        assert_eq!(tokens[0].token, CSSToken::Ident("\u{FFFD}x".to_string()));
    }
}
