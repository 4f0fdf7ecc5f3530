//! Named character reference lookup table.
//!
//! [§ 13.5 Named character references](https://html.spec.whatwg.org/multipage/named-characters.html#named-character-references)
//!
//! The full table defines 2,231 entities; the ones that show up in real
//! email templates are listed here. Names include the trailing semicolon.
//! The legacy entities that may appear without one are listed separately.

use std::collections::HashMap;
use std::sync::LazyLock;

const ENTITIES: &[(&str, &str)] = &[
    ("amp;", "&"),
    ("lt;", "<"),
    ("gt;", ">"),
    ("quot;", "\""),
    ("apos;", "'"),
    ("nbsp;", "\u{00A0}"),
    ("shy;", "\u{00AD}"),
    ("zwnj;", "\u{200C}"),
    ("zwj;", "\u{200D}"),
    ("ensp;", "\u{2002}"),
    ("emsp;", "\u{2003}"),
    ("thinsp;", "\u{2009}"),
    ("copy;", "\u{00A9}"),
    ("reg;", "\u{00AE}"),
    ("trade;", "\u{2122}"),
    ("mdash;", "\u{2014}"),
    ("ndash;", "\u{2013}"),
    ("hellip;", "\u{2026}"),
    ("bull;", "\u{2022}"),
    ("middot;", "\u{00B7}"),
    ("sect;", "\u{00A7}"),
    ("para;", "\u{00B6}"),
    ("lsquo;", "\u{2018}"),
    ("rsquo;", "\u{2019}"),
    ("ldquo;", "\u{201C}"),
    ("rdquo;", "\u{201D}"),
    ("laquo;", "\u{00AB}"),
    ("raquo;", "\u{00BB}"),
    ("cent;", "\u{00A2}"),
    ("pound;", "\u{00A3}"),
    ("euro;", "\u{20AC}"),
    ("yen;", "\u{00A5}"),
    ("times;", "\u{00D7}"),
    ("divide;", "\u{00F7}"),
    ("plusmn;", "\u{00B1}"),
    ("deg;", "\u{00B0}"),
    ("frac12;", "\u{00BD}"),
    ("frac14;", "\u{00BC}"),
    ("frac34;", "\u{00BE}"),
    ("larr;", "\u{2190}"),
    ("rarr;", "\u{2192}"),
    ("uarr;", "\u{2191}"),
    ("darr;", "\u{2193}"),
    ("eacute;", "\u{00E9}"),
    ("Eacute;", "\u{00C9}"),
    ("egrave;", "\u{00E8}"),
    ("aacute;", "\u{00E1}"),
    ("agrave;", "\u{00E0}"),
    ("auml;", "\u{00E4}"),
    ("ouml;", "\u{00F6}"),
    ("uuml;", "\u{00FC}"),
    ("Auml;", "\u{00C4}"),
    ("Ouml;", "\u{00D6}"),
    ("Uuml;", "\u{00DC}"),
    ("szlig;", "\u{00DF}"),
    ("ntilde;", "\u{00F1}"),
    ("ccedil;", "\u{00E7}"),
];

/// "not terminated by a U+003B SEMICOLON character" is tolerated for these.
const LEGACY_ENTITIES: &[&str] = &["amp", "lt", "gt", "quot", "nbsp", "copy", "reg"];

static NAMED_ENTITIES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut table: HashMap<&'static str, &'static str> = ENTITIES.iter().copied().collect();
    for &legacy in LEGACY_ENTITIES {
        if let Some(value) = ENTITIES
            .iter()
            .find(|(name, _)| name.strip_suffix(';') == Some(legacy))
            .map(|&(_, value)| value)
        {
            let _ = table.insert(legacy, value);
        }
    }
    table
});

const LONGEST_NAME: usize = 8;

/// Look up a named character reference. `name` excludes the leading `&`.
#[must_use]
pub fn lookup_entity(name: &str) -> Option<&'static str> {
    NAMED_ENTITIES.get(name).copied()
}

/// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
///
/// "Consume the maximum number of characters possible, where the consumed
/// characters are one of the identifiers in the named character references
/// table."
///
/// `input` starts right after the `&`. Returns the matched length in bytes,
/// the replacement, and whether the match ended with a semicolon.
#[must_use]
pub fn longest_match(input: &str) -> Option<(usize, &'static str, bool)> {
    let limit = input
        .char_indices()
        .nth(LONGEST_NAME)
        .map_or(input.len(), |(i, _)| i);
    (1..=limit)
        .rev()
        .filter(|&len| input.is_char_boundary(len))
        .find_map(|len| {
            let candidate = &input[..len];
            lookup_entity(candidate).map(|value| (len, value, candidate.ends_with(';')))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_common_entities() {
        assert_eq!(lookup_entity("amp;"), Some("&"));
        assert_eq!(lookup_entity("nbsp;"), Some("\u{00A0}"));
        assert_eq!(lookup_entity("amp"), Some("&"));
        assert_eq!(lookup_entity("mdash"), None);
    }

    #[test]
    fn test_longest_match_prefers_semicolon_form() {
        assert_eq!(longest_match("amp;rest"), Some((4, "&", true)));
        assert_eq!(longest_match("ampxyz"), Some((3, "&", false)));
        assert_eq!(longest_match("zzz;"), None);
    }
}
