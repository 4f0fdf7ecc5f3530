//! Integration tests for the HTML tokenizer.

use koala_html::{HTMLTokenizer, Token};

/// Helper to tokenize a string and return the tokens
fn tokenize(input: &str) -> Vec<Token> {
    let mut tokenizer = HTMLTokenizer::new(input.to_string());
    tokenizer.run();
    tokenizer.into_tokens()
}

/// Helper to pull the attributes off a start tag token
fn attributes_of(token: &Token) -> Vec<(String, String)> {
    match token {
        Token::StartTag { attributes, .. } => attributes
            .iter()
            .map(|a| (a.name.clone(), a.value.clone()))
            .collect(),
        other => panic!("Expected StartTag token, got {other:?}"),
    }
}

fn text(data: &str) -> Token {
    Token::Text {
        data: data.to_string(),
    }
}

#[test]
fn test_plain_text() {
    let tokens = tokenize("Hello");
    assert_eq!(tokens, vec![text("Hello"), Token::EndOfFile]);
}

#[test]
fn test_empty_input() {
    assert_eq!(tokenize(""), vec![Token::EndOfFile]);
}

#[test]
fn test_doctype() {
    let tokens = tokenize("<!DOCTYPE html>");
    assert_eq!(tokens.len(), 2); // DOCTYPE + EOF
    match &tokens[0] {
        Token::Doctype {
            name, force_quirks, ..
        } => {
            assert_eq!(name.as_deref(), Some("html"));
            assert!(!force_quirks);
        }
        _ => panic!("Expected DOCTYPE token"),
    }
}

#[test]
fn test_doctype_with_identifiers() {
    let tokens = tokenize(
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" 'http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd'>"#,
    );
    match &tokens[0] {
        Token::Doctype {
            public_identifier,
            system_identifier,
            ..
        } => {
            assert_eq!(
                public_identifier.as_deref(),
                Some("-//W3C//DTD XHTML 1.0 Strict//EN")
            );
            assert_eq!(
                system_identifier.as_deref(),
                Some("http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd")
            );
        }
        _ => panic!("Expected DOCTYPE token"),
    }
}

#[test]
fn test_start_tag() {
    let tokens = tokenize("<div>");
    assert_eq!(tokens.len(), 2);
    match &tokens[0] {
        Token::StartTag {
            name,
            self_closing,
            attributes,
        } => {
            assert_eq!(name, "div");
            assert!(!self_closing);
            assert!(attributes.is_empty());
        }
        _ => panic!("Expected StartTag token"),
    }
}

#[test]
fn test_tag_names_are_lowercased() {
    let tokens = tokenize("<DIV></Div>");
    assert_eq!(tokens[0].tag_name(), Some("div"));
    assert_eq!(tokens[1].tag_name(), Some("div"));
}

#[test]
fn test_end_tag() {
    let tokens = tokenize("</div>");
    assert_eq!(tokens.len(), 2);
    assert_eq!(
        tokens[0],
        Token::EndTag {
            name: "div".to_string()
        }
    );
}

#[test]
fn test_self_closing_tag() {
    let tokens = tokenize("<br/>");
    match &tokens[0] {
        Token::StartTag {
            name, self_closing, ..
        } => {
            assert_eq!(name, "br");
            assert!(self_closing);
        }
        _ => panic!("Expected StartTag token"),
    }
}

#[test]
fn test_comment() {
    let tokens = tokenize("<!-- hello -->");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: " hello ".to_string()
        }
    );
}

#[test]
fn test_conditional_comment_kept_verbatim() {
    let tokens = tokenize("<!--[if mso]><table><![endif]-->");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: "[if mso]><table><![endif]".to_string()
        }
    );
}

#[test]
fn test_bogus_comment() {
    let tokens = tokenize("<?xml version=\"1.0\"?>");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: "?xml version=\"1.0\"?".to_string()
        }
    );
}

#[test]
fn test_cdata_becomes_bogus_comment() {
    let tokens = tokenize("<![CDATA[x]]>");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: "[CDATA[x]]".to_string()
        }
    );
}

#[test]
fn test_attribute_double_quoted() {
    let tokens = tokenize(r#"<div class="container">"#);
    assert_eq!(
        attributes_of(&tokens[0]),
        vec![("class".to_string(), "container".to_string())]
    );
}

#[test]
fn test_attribute_single_quoted() {
    let tokens = tokenize("<div class='container'>");
    assert_eq!(
        attributes_of(&tokens[0]),
        vec![("class".to_string(), "container".to_string())]
    );
}

#[test]
fn test_attribute_unquoted() {
    let tokens = tokenize("<td width=100>");
    assert_eq!(
        attributes_of(&tokens[0]),
        vec![("width".to_string(), "100".to_string())]
    );
}

#[test]
fn test_boolean_attribute() {
    let tokens = tokenize("<input disabled>");
    assert_eq!(
        attributes_of(&tokens[0]),
        vec![("disabled".to_string(), String::new())]
    );
}

#[test]
fn test_multiple_attributes_keep_order() {
    let tokens = tokenize(r#"<a href="/x" ID=top class='c'>"#);
    assert_eq!(
        attributes_of(&tokens[0]),
        vec![
            ("href".to_string(), "/x".to_string()),
            ("id".to_string(), "top".to_string()),
            ("class".to_string(), "c".to_string()),
        ]
    );
}

#[test]
fn test_duplicate_attribute_first_wins() {
    let mut tokenizer = HTMLTokenizer::new(r#"<p class="a" class="b">"#.to_string());
    tokenizer.run();
    let (tokens, diagnostics) = tokenizer.into_parts();
    assert_eq!(
        attributes_of(&tokens[0]),
        vec![("class".to_string(), "a".to_string())]
    );
    assert!(
        diagnostics
            .iter()
            .any(|w| w.message.contains("duplicate-attribute"))
    );
}

#[test]
fn test_tag_with_text_content() {
    let tokens = tokenize("<p>Hi</p>");
    assert_eq!(tokens.len(), 4);
    assert_eq!(tokens[0].tag_name(), Some("p"));
    assert_eq!(tokens[1], text("Hi"));
    assert_eq!(tokens[2].tag_name(), Some("p"));
    assert_eq!(tokens[3], Token::EndOfFile);
}

#[test]
fn test_style_element_rawtext() {
    let tokens = tokenize("<style>p > a { color: red; }</style>");
    assert_eq!(tokens[1], text("p > a { color: red; }"));
    assert_eq!(
        tokens[2],
        Token::EndTag {
            name: "style".to_string()
        }
    );
}

#[test]
fn test_style_with_fake_tags() {
    let tokens = tokenize("<style>a::after { content: '<b></b>'; }</style>");
    assert_eq!(tokens[1], text("a::after { content: '<b></b>'; }"));
    assert_eq!(tokens.len(), 4);
}

#[test]
fn test_style_with_wrong_end_tag() {
    let tokens = tokenize("<style></styles></style>");
    assert_eq!(tokens[1], text("</styles>"));
    assert_eq!(tokens[2].tag_name(), Some("style"));
}

#[test]
fn test_title_element_rcdata() {
    let tokens = tokenize("<title>a < b</title>");
    assert_eq!(tokens[1], text("a < b"));
    assert_eq!(tokens[2].tag_name(), Some("title"));
}

#[test]
fn test_textarea_element_rcdata() {
    let tokens = tokenize("<textarea><p>not a tag</p></textarea>");
    assert_eq!(tokens[1], text("<p>not a tag</p>"));
}

#[test]
fn test_script_data() {
    let tokens = tokenize("<script>if (a<b) { x = '</div>'; }</script>");
    assert_eq!(tokens[1], text("if (a<b) { x = '</div>'; }"));
    assert_eq!(tokens[2].tag_name(), Some("script"));
}

#[test]
fn test_unterminated_style_runs_to_eof() {
    let tokens = tokenize("<style>h1{color:red}");
    assert_eq!(tokens[1], text("h1{color:red}"));
    assert_eq!(tokens[2], Token::EndOfFile);
}

#[test]
fn test_character_references_kept_in_text() {
    let tokens = tokenize("Tom &amp; Jerry &copy; 2024 &nbsp;");
    assert_eq!(tokens[0], text("Tom &amp; Jerry &copy; 2024 &nbsp;"));
}

#[test]
fn test_character_references_decoded_in_attributes() {
    let tokens = tokenize(r#"<a title="Tom &amp; Jerry" href="/?a=1&amp;b=2&copy=3">"#);
    assert_eq!(
        attributes_of(&tokens[0]),
        vec![
            ("title".to_string(), "Tom & Jerry".to_string()),
            ("href".to_string(), "/?a=1&b=2&copy=3".to_string()),
        ]
    );
}

#[test]
fn test_bare_less_than_is_text() {
    let tokens = tokenize("1 < 2");
    assert_eq!(tokens[0], text("1 < 2"));
}

#[test]
fn test_eof_in_tag_drops_tag() {
    let tokens = tokenize("text<div class=");
    assert_eq!(tokens, vec![text("text"), Token::EndOfFile]);
}
