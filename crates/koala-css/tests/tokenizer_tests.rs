//! Integration tests for the CSS tokenizer.
//!
//! The parser slices selector text and declaration values straight out of
//! the source using token spans, so most of these tests check spans and the
//! tokens the parser branches on rather than computed values.

use koala_css::tokenizer::{CSSToken, CSSTokenizer, HashType, SpannedToken};
use quickcheck_macros::quickcheck;

fn tokenize(input: &str) -> Vec<CSSToken> {
    let mut tokenizer = CSSTokenizer::new(input);
    tokenizer.run();
    tokenizer.into_tokens()
}

fn tokenize_spanned(input: &str) -> Vec<SpannedToken> {
    let mut tokenizer = CSSTokenizer::new(input);
    tokenizer.run();
    tokenizer.into_spanned()
}

/// The token stream in its `Display` form, concatenated.
fn render(input: &str) -> String {
    tokenize(input).iter().map(ToString::to_string).collect()
}

/// Source slices of every token except whitespace.
fn slices(source: &str) -> Vec<&str> {
    tokenize_spanned(source)
        .iter()
        .filter(|t| !t.token.is_whitespace())
        .map(|t| t.slice(source))
        .collect()
}

// =============================================================================
// Rules and at-rules
// =============================================================================

#[test]
fn test_rule_token_stream() {
    assert_eq!(
        render("h1{color:red}"),
        "<ident:h1><{><ident:color><colon><ident:red><}><EOF>"
    );
}

#[test]
fn test_media_prelude() {
    assert_eq!(
        render("@media screen and (max-width:600px)"),
        "<at-keyword:@media><whitespace><ident:screen><whitespace><ident:and>\
         <whitespace><(><ident:max-width><colon><dimension:600px><)><EOF>"
    );
}

#[test]
fn test_cdo_and_cdc_around_rules() {
    assert_eq!(
        render("<!-- a{} -->"),
        "<CDO><whitespace><ident:a><{><}><whitespace><CDC><EOF>"
    );
}

#[test]
fn test_empty_input_is_just_eof() {
    let tokens = tokenize_spanned("");
    assert_eq!(tokens.len(), 1);
    assert!(tokens[0].token.is_eof());
    assert_eq!((tokens[0].start, tokens[0].end), (0, 0));
}

// =============================================================================
// Comments
// =============================================================================

#[test]
fn test_comments_produce_no_tokens() {
    assert_eq!(render("a/* x */b"), "<ident:a><ident:b><EOF>");
}

#[test]
fn test_comments_are_outside_every_span() {
    let source = "a /* c */ > b";
    let all: Vec<&str> = tokenize_spanned(source)
        .iter()
        .map(|t| t.slice(source))
        .collect();
    assert_eq!(all, vec!["a", " ", " ", ">", " ", "b", ""]);
}

#[test]
fn test_unterminated_comment_runs_to_eof() {
    assert_eq!(render("a /* open { color: red }"), "<ident:a><whitespace><EOF>");
}

// =============================================================================
// Declaration values
// =============================================================================

#[test]
fn test_spans_slice_back_to_source() {
    let source = "a { margin : 0 auto !important }";
    let all: Vec<&str> = tokenize_spanned(source)
        .iter()
        .map(|t| t.slice(source))
        .collect();
    assert_eq!(
        all,
        vec![
            "a", " ", "{", " ", "margin", " ", ":", " ", "0", " ", "auto", " ", "!", "important", " ",
            "}", ""
        ]
    );
}

#[test]
fn test_value_slices_keep_authored_text() {
    let source = "margin: -0.5em +2px 1e3% #FFF";
    assert_eq!(
        slices(source),
        vec!["margin", ":", "-0.5em", "+2px", "1e3%", "#FFF", ""]
    );
    let tokens = tokenize(source);
    assert!(tokens.contains(&CSSToken::Dimension {
        value: -0.5,
        unit: "em".to_string()
    }));
    assert!(tokens.contains(&CSSToken::Percentage { value: 1000.0 }));
}

#[test]
fn test_important_is_a_delim_and_an_ident() {
    assert_eq!(
        render("red!important"),
        "<ident:red><delim:!><ident:important><EOF>"
    );
    assert_eq!(
        render("red ! IMPORTANT"),
        "<ident:red><whitespace><delim:!><whitespace><ident:IMPORTANT><EOF>"
    );
}

#[test]
fn test_non_ascii_spans_are_byte_offsets() {
    let source = "p{content:'é→'}";
    let tokens = tokenize_spanned(source);
    let string = tokens
        .iter()
        .find(|t| matches!(t.token, CSSToken::String(_)))
        .unwrap();
    assert_eq!(string.token, CSSToken::String("é→".to_string()));
    assert_eq!(string.slice(source), "'é→'");
    assert_eq!(tokens.last().unwrap().start, source.len());
}

// =============================================================================
// Strings
// =============================================================================

#[test]
fn test_string_keeps_quotes_in_span() {
    let source = "font-family:'Open Sans'";
    let tokens = tokenize_spanned(source);
    assert_eq!(tokens[2].token, CSSToken::String("Open Sans".to_string()));
    assert_eq!(tokens[2].slice(source), "'Open Sans'");
}

#[test]
fn test_newline_breaks_a_string() {
    // The newline is reconsumed, so the next declaration still tokenizes.
    assert_eq!(
        render("a:'x\n;b:c"),
        "<ident:a><colon><bad-string><whitespace><semicolon><ident:b><colon><ident:c><EOF>"
    );
}

#[test]
fn test_escaped_newline_continues_a_string() {
    assert_eq!(tokenize("'a\\\nb'")[0], CSSToken::String("ab".to_string()));
}

#[test]
fn test_string_at_eof_is_still_a_string() {
    assert_eq!(tokenize("\"open")[0], CSSToken::String("open".to_string()));
}

// =============================================================================
// url()
// =============================================================================

#[test]
fn test_unquoted_url() {
    let source = "background:URL( img/a.png )";
    let tokens = tokenize_spanned(source);
    let url = &tokens[2];
    assert_eq!(url.token, CSSToken::Url("img/a.png".to_string()));
    assert_eq!(url.slice(source), "URL( img/a.png )");
}

#[test]
fn test_quoted_url_is_a_function() {
    assert_eq!(
        render("url( \"a.png\")"),
        "<function:url(><whitespace><string:\"a.png\"><)><EOF>"
    );
}

#[test]
fn test_bad_urls() {
    assert_eq!(tokenize("url(a b.png)")[0], CSSToken::BadUrl);
    assert_eq!(tokenize("url(a\"b)")[0], CSSToken::BadUrl);
    // The remnants are consumed up to the closing parenthesis.
    assert_eq!(render("url(a(b) c"), "<bad-url><whitespace><ident:c><EOF>");
}

#[test]
fn test_unterminated_url_runs_to_eof() {
    assert_eq!(tokenize("url(a.png")[0], CSSToken::Url("a.png".to_string()));
}

// =============================================================================
// Selector preludes
// =============================================================================

#[test]
fn test_selector_prelude_tokens() {
    assert_eq!(
        render("ul > li:nth-child(2n+1)"),
        "<ident:ul><whitespace><delim:>><whitespace><ident:li><colon>\
         <function:nth-child(><dimension:2n><number:1><)><EOF>"
    );
}

#[test]
fn test_hash_types() {
    let hash = |input: &str| tokenize(input).into_iter().next().unwrap();
    assert_eq!(
        hash("#main"),
        CSSToken::Hash {
            value: "main".to_string(),
            hash_type: HashType::Id
        }
    );
    assert_eq!(
        hash("#-x"),
        CSSToken::Hash {
            value: "-x".to_string(),
            hash_type: HashType::Id
        }
    );
    assert_eq!(
        hash("#123"),
        CSSToken::Hash {
            value: "123".to_string(),
            hash_type: HashType::Unrestricted
        }
    );
    assert_eq!(hash("# a"), CSSToken::Delim('#'));
}

#[test]
fn test_escapes_in_class_names() {
    assert_eq!(
        tokenize(r".sm\:p-4")[..2],
        [CSSToken::Delim('.'), CSSToken::Ident("sm:p-4".to_string())]
    );
    // A hex escape swallows one trailing space.
    assert_eq!(tokenize(r"\31 0")[0], CSSToken::Ident("10".to_string()));
    assert_eq!(tokenize(r"\0 a")[0], CSSToken::Ident("\u{FFFD}a".to_string()));
}

#[test]
fn test_attribute_selector_tokens() {
    assert_eq!(
        render("[href^='http' i]"),
        "<[><ident:href><delim:^><delim:=><string:\"http\"><whitespace><ident:i><]><EOF>"
    );
}

// =============================================================================
// Properties
// =============================================================================

#[quickcheck]
fn prop_spans_are_ordered_and_on_char_boundaries(input: String) -> bool {
    let tokens = tokenize_spanned(&input);
    let ordered = tokens.windows(2).all(|pair| pair[0].end <= pair[1].start);
    let in_bounds = tokens.iter().all(|t| {
        t.start <= t.end
            && t.end <= input.len()
            && input.is_char_boundary(t.start)
            && input.is_char_boundary(t.end)
    });
    let ends_with_eof = tokens.last().is_some_and(|t| t.token.is_eof());
    ordered && in_bounds && ends_with_eof
}

#[quickcheck]
fn prop_only_the_last_token_is_eof(input: String) -> bool {
    let tokens = tokenize(&input);
    tokens.iter().filter(|t| t.is_eof()).count() == 1
}
