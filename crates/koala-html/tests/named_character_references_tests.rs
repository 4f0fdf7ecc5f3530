//! Integration tests for named character reference lookup.

use koala_html::tokenizer::character_reference::decode_attribute_value;
use koala_html::tokenizer::named_character_references::{longest_match, lookup_entity};

#[test]
fn test_lookup_common_entities() {
    assert_eq!(lookup_entity("amp;"), Some("&"));
    assert_eq!(lookup_entity("lt;"), Some("<"));
    assert_eq!(lookup_entity("gt;"), Some(">"));
    assert_eq!(lookup_entity("quot;"), Some("\""));
    assert_eq!(lookup_entity("nbsp;"), Some("\u{00A0}"));
    assert_eq!(lookup_entity("mdash;"), Some("\u{2014}"));
}

#[test]
fn test_lookup_legacy_entities() {
    // Legacy entities without semicolon
    assert_eq!(lookup_entity("amp"), Some("&"));
    assert_eq!(lookup_entity("lt"), Some("<"));
    assert_eq!(lookup_entity("gt"), Some(">"));
}

#[test]
fn test_lookup_unknown_entity() {
    assert_eq!(lookup_entity("notarealentity;"), None);
    assert_eq!(lookup_entity(""), None);
}

#[test]
fn test_longest_match() {
    assert_eq!(longest_match("copy; 2024"), Some((5, "\u{00A9}", true)));
    assert_eq!(longest_match("lt3"), Some((2, "<", false)));
    assert_eq!(longest_match("xyz;"), None);
}

#[test]
fn test_decode_mixed_attribute_value() {
    assert_eq!(
        decode_attribute_value("&quot;Hi&quot; &mdash; &#128075;"),
        "\"Hi\" \u{2014} \u{1F44B}"
    );
}
