//! Loading inliner options from JSON.

use koala_inline::InlineOptions;
use url::Url;

#[test]
fn test_empty_object_gives_defaults() {
    let options: InlineOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(options, InlineOptions::default());
}

#[test]
fn test_partial_object() {
    let options: InlineOptions = serde_json::from_str(
        r#"{
            "remove_style_tags": true,
            "inline_style_base_url": "https://example.com/mail/",
            "extra_css": "p { margin: 0 }"
        }"#,
    )
    .unwrap();
    assert!(options.remove_style_tags);
    assert!(options.keep_style_tags_for_unmatched);
    assert!(!options.load_remote_stylesheets);
    assert_eq!(
        options.inline_style_base_url,
        Some(Url::parse("https://example.com/mail/").unwrap())
    );
    assert_eq!(options.extra_css.as_deref(), Some("p { margin: 0 }"));
}

#[test]
fn test_invalid_base_url_is_rejected() {
    let result: Result<InlineOptions, _> =
        serde_json::from_str(r#"{ "inline_style_base_url": "not a url" }"#);
    assert!(result.is_err());
}

#[test]
fn test_serialize_then_load() {
    let options = InlineOptions::default()
        .remove_style_tags(true)
        .strip_redundant_classes(true)
        .inline_style_base_url(Some(Url::parse("https://example.com/").unwrap()));
    let json = serde_json::to_string(&options).unwrap();
    assert!(json.contains("\"inline_style_base_url\":\"https://example.com/\""));
    let loaded: InlineOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(loaded, options);
}

#[test]
fn test_loaded_options_drive_the_inliner() {
    let options: InlineOptions = serde_json::from_str(r#"{ "remove_style_tags": true }"#).unwrap();
    let html = "<html><head><style>p { color: red }</style></head><body><p>a</p></body></html>";
    assert_eq!(
        options.build().inline(html).unwrap(),
        "<html><head></head><body><p style=\"color: red;\">a</p></body></html>"
    );
}
