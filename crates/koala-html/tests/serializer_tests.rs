//! Integration tests for HTML serialization.

use koala_html::{parse_document, serialize, serialize_to};
use quickcheck_macros::quickcheck;

fn roundtrip(html: &str) -> String {
    let (tree, _) = parse_document(html);
    serialize(&tree)
}

#[test]
fn test_complete_document_is_reproduced() {
    let html = "<!DOCTYPE html><html><head><title>Hi</title></head><body><p class=\"a\">Hello <b>world</b></p></body></html>";
    assert_eq!(roundtrip(html), html);
}

#[test]
fn test_implied_elements_are_written() {
    assert_eq!(
        roundtrip("<p>x"),
        "<html><head></head><body><p>x</p></body></html>"
    );
}

#[test]
fn test_text_and_comments_are_byte_for_byte() {
    let html = "<html><head></head><body>Tom &amp; Jerry&nbsp;&copy; <!--[if mso]><table><![endif]--></body></html>";
    assert_eq!(roundtrip(html), html);
}

#[test]
fn test_template_in_head_is_reproduced() {
    let html = "<html><head><template><p>x</p></template></head><body><p>y</p></body></html>";
    assert_eq!(roundtrip(html), html);
}

#[test]
fn test_raw_text_is_not_escaped() {
    let html = "<html><head><style>a > b { content: \"&\"; }</style></head><body><script>if (a < b) {}</script></body></html>";
    assert_eq!(roundtrip(html), html);
}

#[test]
fn test_attribute_values_are_escaped() {
    assert_eq!(
        roundtrip(r#"<body><a title='say "hi" &amp; bye' href="/?a=1&amp;b=2"></a></body>"#),
        r#"<html><head></head><body><a title="say &quot;hi&quot; &amp; bye" href="/?a=1&amp;b=2"></a></body></html>"#
    );
}

#[test]
fn test_void_elements_have_no_end_tag() {
    assert_eq!(
        roundtrip("<body><br/><img src=x.png><hr></body>"),
        r#"<html><head></head><body><br><img src="x.png"><hr></body></html>"#
    );
}

#[test]
fn test_svg_self_closing_and_case() {
    assert_eq!(
        roundtrip(r#"<body><svg viewBox="0 0 1 1"><path d="M0"/></svg></body>"#),
        r#"<html><head></head><body><svg viewBox="0 0 1 1"><path d="M0"/></svg></body></html>"#
    );
}

#[test]
fn test_legacy_doctype_is_kept() {
    let html = r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd"><html><head></head><body></body></html>"#;
    assert_eq!(roundtrip(html), html);
}

#[test]
fn test_serialize_to_writer_matches_string() {
    let (tree, _) = parse_document("<p>one<p>two");
    let mut out = Vec::new();
    serialize_to(&tree, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), serialize(&tree));
}

#[quickcheck]
fn prop_parse_never_panics(input: String) -> bool {
    let (tree, _) = parse_document(&input);
    tree.document_element().is_some()
}

#[quickcheck]
fn prop_serialization_is_a_fixed_point(input: String) -> bool {
    let once = roundtrip(&input);
    roundtrip(&once) == once
}
