//! Character reference decoding for attribute values.
//!
//! [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
//!
//! Text content is kept verbatim so it re-serializes byte for byte, but
//! attribute values are decoded: selectors such as `[title="a & b"]` compare
//! against the decoded value, and the serializer re-escapes on output.

use super::named_character_references::longest_match;

/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
///
/// "If the number is one of the numbers in the first column of the following
/// table, then find the row with that number in the first column, and set the
/// character reference code to the number in the second column."
const C1_REPLACEMENTS: &[(u32, char)] = &[
    (0x80, '\u{20AC}'),
    (0x82, '\u{201A}'),
    (0x83, '\u{0192}'),
    (0x84, '\u{201E}'),
    (0x85, '\u{2026}'),
    (0x86, '\u{2020}'),
    (0x87, '\u{2021}'),
    (0x88, '\u{02C6}'),
    (0x89, '\u{2030}'),
    (0x8A, '\u{0160}'),
    (0x8B, '\u{2039}'),
    (0x8C, '\u{0152}'),
    (0x8E, '\u{017D}'),
    (0x91, '\u{2018}'),
    (0x92, '\u{2019}'),
    (0x93, '\u{201C}'),
    (0x94, '\u{201D}'),
    (0x95, '\u{2022}'),
    (0x96, '\u{2013}'),
    (0x97, '\u{2014}'),
    (0x98, '\u{02DC}'),
    (0x99, '\u{2122}'),
    (0x9A, '\u{0161}'),
    (0x9B, '\u{203A}'),
    (0x9C, '\u{0153}'),
    (0x9E, '\u{017E}'),
    (0x9F, '\u{0178}'),
];

/// Decode every character reference in an attribute value.
///
/// Unknown or malformed references are left as written.
#[must_use]
pub fn decode_attribute_value(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        match decode_one(after) {
            Some((consumed, decoded)) => {
                out.push_str(&decoded);
                rest = &after[consumed..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Decode the reference starting right after `&`. Returns bytes consumed and
/// the replacement.
fn decode_one(input: &str) -> Option<(usize, String)> {
    if let Some(numeric) = input.strip_prefix('#') {
        return decode_numeric(numeric).map(|(len, c)| (len + 1, c.to_string()));
    }
    let (len, value, terminated) = longest_match(input)?;
    // "If the character reference was consumed as part of an attribute, and
    // the last character matched is not a U+003B SEMICOLON character (;), and
    // the next input character is either a U+003D EQUALS SIGN character (=) or
    // an ASCII alphanumeric, then, for historical reasons, flush code points
    // consumed as a character reference"
    if !terminated
        && input[len..]
            .chars()
            .next()
            .is_some_and(|c| c == '=' || c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some((len, value.to_string()))
}

/// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
fn decode_numeric(input: &str) -> Option<(usize, char)> {
    let (radix, prefix_len) = match input.as_bytes().first() {
        Some(b'x' | b'X') => (16, 1),
        _ => (10, 0),
    };
    let digits = &input[prefix_len..];
    let digit_len = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    if digit_len == 0 {
        // "absence-of-digits-in-numeric-character-reference parse error"
        return None;
    }
    let mut consumed = prefix_len + digit_len;
    if digits[digit_len..].starts_with(';') {
        consumed += 1;
    }
    let code = u32::from_str_radix(&digits[..digit_len], radix).unwrap_or(u32::MAX);
    Some((consumed, code_point_for(code)))
}

/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
fn code_point_for(code: u32) -> char {
    if code == 0 || code > 0x0010_FFFF {
        return '\u{FFFD}';
    }
    if let Some(&(_, replacement)) = C1_REPLACEMENTS.iter().find(|&&(n, _)| n == code) {
        return replacement;
    }
    char::from_u32(code).unwrap_or('\u{FFFD}')
}
