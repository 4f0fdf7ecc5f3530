//! End-to-end tests for the inliner.

use koala_inline::{CSSInliner, Component, InlineError, InlineOptions, LoadError, inline};
use quickcheck_macros::quickcheck;
use url::Url;

fn inline_with(options: InlineOptions, html: &str) -> String {
    options.build().inline(html).unwrap()
}

fn removing() -> InlineOptions {
    CSSInliner::options().remove_style_tags(true)
}

/// `<html><head>{head}</head><body>{body}</body></html>`
fn page(head: &str, body: &str) -> String {
    format!("<html><head>{head}</head><body>{body}</body></html>")
}

// =============================================================================
// Basic inlining
// =============================================================================

#[test]
fn test_end_to_end_remove_style_tags() {
    let html = "<html><head><style>h1{color:blue;}</style></head><body><h1>Big Text</h1></body></html>";
    assert_eq!(
        inline_with(removing(), html),
        "<html><head></head><body><h1 style=\"color: blue;\">Big Text</h1></body></html>"
    );
}

#[test]
fn test_style_tags_kept_by_default() {
    let html = "<html><head><style>h1{color:blue;}</style></head><body><h1>Big Text</h1></body></html>";
    assert_eq!(
        inline(html).unwrap(),
        "<html><head><style>h1{color:blue;}</style></head><body><h1 style=\"color: blue;\">Big Text</h1></body></html>"
    );
}

#[test]
fn test_multiple_declarations_and_important() {
    let html = page(
        "<style>span { padding: 0; border: 1px solid #ccc !important; }</style>",
        "<span>x</span>",
    );
    assert_eq!(
        inline_with(removing(), &html),
        page(
            "",
            "<span style=\"padding: 0; border: 1px solid #ccc !important;\">x</span>"
        )
    );
}

#[test]
fn test_unmatched_elements_are_untouched() {
    let html = page("<style>.missing { color: red }</style>", "<p class=\"x\">a</p>");
    assert_eq!(inline_with(removing(), &html), page("", "<p class=\"x\">a</p>"));
}

// =============================================================================
// Cascade
// =============================================================================

#[test]
fn test_inline_style_beats_stylesheet() {
    let html = page(
        "<style>p { color: blue; margin: 0 }</style>",
        "<p style=\"color:red\">a</p>",
    );
    assert_eq!(
        inline_with(removing(), &html),
        page("", "<p style=\"color: red; margin: 0;\">a</p>")
    );
}

#[test]
fn test_important_stylesheet_beats_inline_style() {
    let html = page(
        "<style>p { color: blue !important }</style>",
        "<p style=\"color:red\">a</p>",
    );
    assert_eq!(
        inline_with(removing(), &html),
        page("", "<p style=\"color: blue !important;\">a</p>")
    );
}

#[test]
fn test_class_beats_type() {
    let html = page(
        "<style>.footer { color: blue } p { color: red }</style>",
        "<p class=\"footer\">a</p>",
    );
    assert_eq!(
        inline_with(removing(), &html),
        page("", "<p class=\"footer\" style=\"color: blue;\">a</p>")
    );
}

#[test]
fn test_later_rule_wins_on_tie() {
    let html = page(
        "<style>.a { color: red } .b { color: blue }</style>",
        "<p class=\"b a\">a</p>",
    );
    assert!(inline_with(removing(), &html).contains("style=\"color: blue;\""));
}

#[test]
fn test_source_order_runs_across_style_elements() {
    let html = page(
        "<style>p { color: red }</style>",
        "<style>p { color: green }</style><p>a</p>",
    );
    assert_eq!(
        inline_with(removing(), &html),
        page("", "<p style=\"color: green;\">a</p>")
    );
}

#[test]
fn test_combinators_and_structural_pseudo_classes() {
    let html = page(
        "<style>ul > li:first-child { font-weight: bold } li + li { border-top: 1px } li:nth-child(odd) a { color: red }</style>",
        "<ul><li><a href=\"#\">1</a></li><li>2</li><li><a href=\"#\">3</a></li></ul>",
    );
    assert_eq!(
        inline_with(removing(), &html),
        page(
            "",
            "<ul><li style=\"font-weight: bold;\"><a href=\"#\" style=\"color: red;\">1</a></li><li style=\"border-top: 1px;\">2</li><li style=\"border-top: 1px;\"><a href=\"#\" style=\"color: red;\">3</a></li></ul>"
        )
    );
}

#[test]
fn test_comment_in_selector_is_inlined() {
    let html = page(
        "<style>h1, /* title */ h2 { color: red }</style>",
        "<h2>x</h2>",
    );
    assert_eq!(
        inline_with(removing(), &html),
        page("", "<h2 style=\"color: red;\">x</h2>")
    );
}

// =============================================================================
// Non-inlinable rules
// =============================================================================

#[test]
fn test_unmatched_rules_kept_in_reduced_style() {
    let html = page(
        "<style>a { color: red } a:hover { color: blue } @media (max-width: 600px) { a { color: black } }</style>",
        "<a href=\"#\">x</a>",
    );
    assert_eq!(
        inline_with(removing(), &html),
        page(
            "<style>a:hover { color: blue; }\n@media (max-width: 600px) { a { color: black } }</style>",
            "<a href=\"#\" style=\"color: red;\">x</a>"
        )
    );
}

#[test]
fn test_unmatched_rules_dropped_when_not_kept() {
    let html = page(
        "<style>a { color: red } a:hover { color: blue }</style>",
        "<a href=\"#\">x</a>",
    );
    let output = removing()
        .keep_style_tags_for_unmatched(false)
        .build()
        .inline_with_diagnostics(&html)
        .unwrap();
    assert_eq!(
        output.html,
        page("", "<a href=\"#\" style=\"color: red;\">x</a>")
    );
    assert!(
        output
            .diagnostics
            .iter()
            .any(|w| w.component == Component::Inliner)
    );
}

#[test]
fn test_ignored_and_foreign_type_styles_are_left_alone() {
    let html = page(
        "<style data-inline-ignore=\"\">p { color: red }</style><style type=\"text/x-template\">p { color: green }</style>",
        "<p>a</p>",
    );
    assert_eq!(inline_with(removing(), &html), html);
}

// =============================================================================
// Options
// =============================================================================

#[test]
fn test_strip_redundant_classes() {
    let html = page(
        "<style>.a { color: red } .b:hover { color: blue }</style>",
        "<p class=\"a b c\">x</p><p class=\"a\">y</p>",
    );
    let options = removing().strip_redundant_classes(true);
    assert_eq!(
        inline_with(options, &html),
        page(
            "<style>.b:hover { color: blue; }</style>",
            "<p class=\"b c\" style=\"color: red;\">x</p><p style=\"color: red;\">y</p>"
        )
    );
}

#[test]
fn test_classes_kept_while_style_tags_stay() {
    let html = page("<style>.a { color: red }</style>", "<p class=\"a\">x</p>");
    let options = CSSInliner::options().strip_redundant_classes(true);
    assert!(inline_with(options, &html).contains("class=\"a\""));
}

#[test]
fn test_extra_css_applies_last() {
    let html = page("<style>p { color: red }</style>", "<p>a</p>");
    let options = removing().extra_css(Some("p { color: green; margin: 0 }".to_string()));
    assert_eq!(
        inline_with(options, &html),
        page("", "<p style=\"color: green; margin: 0;\">a</p>")
    );
}

#[test]
fn test_base_url_rewrites_relative_urls() {
    let html = page(
        "<style>div { background: url(img/bg.png) } p { background: url('/x.png') }</style>",
        "<div>a</div><p>b</p>",
    );
    let options = removing()
        .inline_style_base_url(Some(Url::parse("https://example.com/mail/index.html").unwrap()));
    assert_eq!(
        inline_with(options, &html),
        page(
            "",
            "<div style=\"background: url(https://example.com/mail/img/bg.png);\">a</div><p style=\"background: url('https://example.com/x.png');\">b</p>"
        )
    );
}

// =============================================================================
// Linked stylesheets
// =============================================================================

fn test_loader(href: &str) -> Result<String, LoadError> {
    match href {
        "https://example.com/css/main.css" => Ok("p { color: red }".to_string()),
        other => Err(LoadError::Unavailable(other.to_string())),
    }
}

#[test]
fn test_linked_stylesheet_is_loaded_and_removed() {
    let html = page(
        "<link rel=\"stylesheet\" href=\"css/main.css\">",
        "<p>a</p>",
    );
    let inliner = removing()
        .load_remote_stylesheets(true)
        .inline_style_base_url(Some(Url::parse("https://example.com/").unwrap()))
        .build()
        .with_loader(test_loader);
    assert_eq!(
        inliner.inline(&html).unwrap(),
        page("", "<p style=\"color: red;\">a</p>")
    );
}

#[test]
fn test_links_ignored_when_loading_disabled() {
    let html = page(
        "<link rel=\"stylesheet\" href=\"https://example.com/css/main.css\">",
        "<p>a</p>",
    );
    let inliner = removing().build().with_loader(test_loader);
    assert_eq!(inliner.inline(&html).unwrap(), html);
}

#[test]
fn test_failed_load_is_an_error() {
    let html = page(
        "<link rel=\"stylesheet\" href=\"https://example.com/missing.css\">",
        "<p>a</p>",
    );
    let inliner = CSSInliner::options()
        .load_remote_stylesheets(true)
        .build()
        .with_loader(test_loader);
    let err = inliner.inline(&html).unwrap_err();
    assert!(matches!(
        err,
        InlineError::RemoteStylesheet { ref href, source: LoadError::Unavailable(_) }
            if href == "https://example.com/missing.css"
    ));

    let mut out = Vec::new();
    assert!(inliner.inline_to(&html, &mut out).is_err());
    assert!(out.is_empty());
}

#[test]
fn test_data_url_link_with_default_loader() {
    let html = page(
        "<link rel=\"stylesheet\" href=\"data:text/css,p%20%7B%20color%3A%20red%20%7D\">",
        "<p>a</p>",
    );
    let inliner = removing().load_remote_stylesheets(true).build();
    assert_eq!(
        inliner.inline(&html).unwrap(),
        page("", "<p style=\"color: red;\">a</p>")
    );
}

#[test]
fn test_unmatched_rules_from_links_get_a_new_style_element() {
    let html = page("<link rel=\"stylesheet\" href=\"x.css\">", "<p>a</p>");
    let inliner = removing()
        .load_remote_stylesheets(true)
        .build()
        .with_loader(|_: &str| Ok::<_, LoadError>("p:hover { color: red }".to_string()));
    assert_eq!(
        inliner.inline(&html).unwrap(),
        page("<style>p:hover { color: red; }</style>", "<p>a</p>")
    );
}

// =============================================================================
// Entry points and degenerate input
// =============================================================================

#[test]
fn test_empty_input() {
    assert_eq!(inline("").unwrap(), "<html><head></head><body></body></html>");
}

#[test]
fn test_document_without_styles_is_unchanged() {
    let html = "<!DOCTYPE html><html><head><title>x</title></head><body><p class=\"a\" style=\"color:red\">Tom &amp; Jerry</p><!-- c --></body></html>";
    assert_eq!(inline(html).unwrap(), html);
}

#[test]
fn test_malformed_input_is_recovered() {
    let html = "<html><body><h1>Title</h1><p>unclosed <b>bold<style>p { color: red";
    let out = inline(html).unwrap();
    assert!(out.contains("<h1>Title</h1>"), "{out}");
    assert!(out.contains("<p style=\"color: red;\">unclosed "), "{out}");
}

#[test]
fn test_malformed_css_reports_diagnostics() {
    let html = page(
        "<style>p { color red; margin: 0 } @bogus { } svg|a { x: y }</style>",
        "<p>a</p>",
    );
    let output = CSSInliner::default().inline_with_diagnostics(&html).unwrap();
    assert!(output.html.contains("<p style=\"margin: 0;\">"));
    let components: Vec<Component> = output.diagnostics.iter().map(|w| w.component).collect();
    assert!(components.contains(&Component::Css));
    assert!(components.contains(&Component::Selector));
}

#[test]
fn test_inline_bytes() {
    let html = page("<style>p { color: red }</style>", "<p>a</p>");
    assert_eq!(
        CSSInliner::default().inline_bytes(html.as_bytes()).unwrap(),
        inline(&html).unwrap()
    );
    let err = CSSInliner::default()
        .inline_bytes(b"<p>\xff\xfe</p>")
        .unwrap_err();
    assert!(matches!(err, InlineError::Decode(_)));
}

#[test]
fn test_inline_to_matches_inline() {
    let html = page("<style>p { color: red }</style>", "<p>a</p>");
    let inliner = CSSInliner::default();
    let mut out = Vec::new();
    inliner.inline_to(&html, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), inliner.inline(&html).unwrap());
}

#[test]
fn test_inliner_is_shareable_across_threads() {
    let inliner = std::sync::Arc::new(CSSInliner::default());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let inliner = std::sync::Arc::clone(&inliner);
            std::thread::spawn(move || {
                inliner
                    .inline(&page("<style>p { margin: 0 }</style>", &format!("<p>{i}</p>")))
                    .unwrap()
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        assert!(handle.join().unwrap().contains(&format!("<p style=\"margin: 0;\">{i}</p>")));
    }
}

// =============================================================================
// Properties
// =============================================================================

#[quickcheck]
fn prop_inline_never_fails_on_text(input: String) -> bool {
    inline(&input).is_ok()
}

#[quickcheck]
fn prop_fully_inlined_document_is_a_fixed_point(input: String) -> bool {
    let inliner = removing().keep_style_tags_for_unmatched(false).build();
    let Ok(once) = inliner.inline(&input) else {
        return false;
    };
    inliner.inline(&once).is_ok_and(|twice| twice == once)
}
