//! Integration tests for the HTML parser.

use koala_dom::{DomTree, Namespace, Node, NodeId, NodeType};
use koala_html::{HTMLParser, HTMLTokenizer, parse_document};

/// Helper to parse HTML and return the DOM tree
fn parse(html: &str) -> DomTree {
    let mut tokenizer = HTMLTokenizer::new(html.to_string());
    tokenizer.run();
    let parser = HTMLParser::new(tokenizer.into_tokens());
    parser.run()
}

/// Helper to get element by tag name (first match, depth-first)
fn find_element(tree: &DomTree, from: NodeId, tag: &str) -> Option<NodeId> {
    tree.descendants(from)
        .find(|&id| tree.as_element(id).is_some_and(|data| data.tag_name == tag))
}

/// Helper to collect every element with a tag name, in document order
fn find_all(tree: &DomTree, tag: &str) -> Vec<NodeId> {
    tree.elements()
        .filter(|&id| tree.as_element(id).is_some_and(|data| data.tag_name == tag))
        .collect()
}

/// Helper to get text content of a node (concatenated)
fn text_content(tree: &DomTree, id: NodeId) -> String {
    let mut result = String::new();
    if let Some(node) = tree.get(id) {
        match &node.node_type {
            NodeType::Text(data) => result.push_str(data),
            _ => {
                for &child_id in tree.children(id) {
                    result.push_str(&text_content(tree, child_id));
                }
            }
        }
    }
    result
}

/// Helper to list the tag names of an element's element children
fn child_tags(tree: &DomTree, id: NodeId) -> Vec<String> {
    tree.element_children(id)
        .filter_map(|child| tree.as_element(child))
        .map(|data| data.tag_name.clone())
        .collect()
}

/// Helper to get a node reference
fn get_node(tree: &DomTree, id: NodeId) -> &Node {
    tree.get(id).expect("Node not found")
}

#[test]
fn test_document_structure() {
    let tree = parse("<!DOCTYPE html><html><head></head><body></body></html>");

    // Root should be Document
    let root = get_node(&tree, NodeId::ROOT);
    assert!(matches!(root.node_type, NodeType::Document));

    // Document should have a doctype then html
    let first = tree.first_child(NodeId::ROOT).unwrap();
    match &get_node(&tree, first).node_type {
        NodeType::Doctype(doctype) => assert_eq!(doctype.name, "html"),
        other => panic!("Expected doctype, got {other:?}"),
    }

    let html_id = tree.document_element().unwrap();
    assert_eq!(child_tags(&tree, html_id), vec!["head", "body"]);
}

#[test]
fn test_implicit_html_head_body() {
    let tree = parse("<p>Hello</p>");
    let html_id = tree.document_element().unwrap();
    assert_eq!(child_tags(&tree, html_id), vec!["head", "body"]);
    let body_id = tree.body().unwrap();
    assert_eq!(child_tags(&tree, body_id), vec!["p"]);
    assert_eq!(text_content(&tree, body_id), "Hello");
}

#[test]
fn test_empty_input_builds_skeleton() {
    let tree = parse("");
    assert!(tree.document_element().is_some());
    assert!(tree.head().is_some());
    assert!(tree.body().is_some());
}

#[test]
fn test_text_node() {
    let tree = parse("<html><body>Hello World</body></html>");
    let body_id = tree.body().unwrap();
    assert_eq!(text_content(&tree, body_id), "Hello World");
}

#[test]
fn test_text_is_kept_raw() {
    let tree = parse("<p>Tom &amp; Jerry&nbsp;</p>");
    let p = find_element(&tree, NodeId::ROOT, "p").unwrap();
    assert_eq!(tree.child_text(p), "Tom &amp; Jerry&nbsp;");
}

#[test]
fn test_comment_node() {
    let tree = parse("<body><!-- note --></body>");
    let body_id = tree.body().unwrap();
    let comment = tree.first_child(body_id).unwrap();
    match &get_node(&tree, comment).node_type {
        NodeType::Comment(data) => assert_eq!(data, " note "),
        other => panic!("Expected comment, got {other:?}"),
    }
}

#[test]
fn test_comment_before_html_goes_to_document() {
    let tree = parse("<!-- top --><html></html>");
    let first = tree.first_child(NodeId::ROOT).unwrap();
    assert!(matches!(get_node(&tree, first).node_type, NodeType::Comment(_)));
}

#[test]
fn test_nested_elements() {
    let tree = parse("<div><span><b>x</b></span></div>");
    let div = find_element(&tree, NodeId::ROOT, "div").unwrap();
    let span = find_element(&tree, div, "span").unwrap();
    let b = find_element(&tree, span, "b").unwrap();
    assert_eq!(tree.parent(b), Some(span));
    assert_eq!(tree.parent(span), Some(div));
}

#[test]
fn test_element_attributes() {
    let tree = parse(r#"<div id="main" class="a b">x</div>"#);
    let div = find_element(&tree, NodeId::ROOT, "div").unwrap();
    let data = tree.as_element(div).unwrap();
    assert_eq!(data.id(), Some("main"));
    assert!(data.has_class("a"));
    assert!(data.has_class("b"));
}

#[test]
fn test_void_elements() {
    let tree = parse("<p>a<br>b<img src=x.png>c</p>");
    let p = find_element(&tree, NodeId::ROOT, "p").unwrap();
    assert_eq!(child_tags(&tree, p), vec!["br", "img"]);
    let br = find_element(&tree, p, "br").unwrap();
    assert!(tree.children(br).is_empty());
}

#[test]
fn test_title_and_style_go_to_head() {
    let tree = parse("<title>T</title><style>p{color:red}</style><p>x</p>");
    let head = tree.head().unwrap();
    assert_eq!(child_tags(&tree, head), vec!["title", "style"]);
    let style = find_element(&tree, head, "style").unwrap();
    assert_eq!(tree.child_text(style), "p{color:red}");
}

#[test]
fn test_style_after_head_is_inserted_into_head() {
    let tree = parse("<html><head></head><style>a{}</style><body></body></html>");
    let head = tree.head().unwrap();
    assert_eq!(child_tags(&tree, head), vec!["style"]);
}

#[test]
fn test_style_in_body_stays_in_body() {
    let tree = parse("<body><p>x</p><style>p{color:red}</style></body>");
    let body = tree.body().unwrap();
    assert_eq!(child_tags(&tree, body), vec!["p", "style"]);
}

#[test]
fn test_meta_element() {
    let tree = parse(r#"<head><meta charset="utf-8"></head>"#);
    let meta = find_element(&tree, NodeId::ROOT, "meta").unwrap();
    assert_eq!(
        tree.as_element(meta).unwrap().get_attribute("charset"),
        Some("utf-8")
    );
    assert_eq!(tree.parent(meta), tree.head());
}

#[test]
fn test_whitespace_preserved_in_text() {
    let tree = parse("<pre>  a\n  b  </pre>");
    let pre = find_element(&tree, NodeId::ROOT, "pre").unwrap();
    assert_eq!(tree.child_text(pre), "  a\n  b  ");
}

#[test]
fn test_whitespace_after_body_goes_into_body() {
    let tree = parse("<html><body><p>x</p></body>\n</html>\n");
    let body = tree.body().unwrap();
    let last = tree.last_child(body).unwrap();
    assert_eq!(tree.as_text(last), Some("\n\n"));
}

#[test]
fn test_p_closed_by_block() {
    let tree = parse("<p>one<div>two</div>");
    let body = tree.body().unwrap();
    assert_eq!(child_tags(&tree, body), vec!["p", "div"]);
}

#[test]
fn test_p_closed_by_p() {
    let tree = parse("<p>one<p>two");
    let body = tree.body().unwrap();
    assert_eq!(child_tags(&tree, body), vec!["p", "p"]);
}

#[test]
fn test_stray_p_end_tag_creates_empty_p() {
    let tree = parse("<div></p></div>");
    let div = find_element(&tree, NodeId::ROOT, "div").unwrap();
    assert_eq!(child_tags(&tree, div), vec!["p"]);
    let p = find_element(&tree, div, "p").unwrap();
    assert!(tree.children(p).is_empty());
}

#[test]
fn test_br_end_tag_is_br() {
    let tree = parse("<p>a</br>b</p>");
    let p = find_element(&tree, NodeId::ROOT, "p").unwrap();
    assert_eq!(child_tags(&tree, p), vec!["br"]);
}

#[test]
fn test_heading_closes_heading() {
    let tree = parse("<h1>a<h2>b</h2>");
    let body = tree.body().unwrap();
    assert_eq!(child_tags(&tree, body), vec!["h1", "h2"]);
}

#[test]
fn test_li_implicit_close() {
    let tree = parse("<ul><li>one<li>two<li>three</ul>");
    let ul = find_element(&tree, NodeId::ROOT, "ul").unwrap();
    assert_eq!(child_tags(&tree, ul), vec!["li", "li", "li"]);
}

#[test]
fn test_dd_dt_implicit_close() {
    let tree = parse("<dl><dt>term<dd>def<dt>term2<dd>def2</dl>");
    let dl = find_element(&tree, NodeId::ROOT, "dl").unwrap();
    assert_eq!(child_tags(&tree, dl), vec!["dt", "dd", "dt", "dd"]);
}

#[test]
fn test_nested_lists() {
    let tree = parse("<ul><li>a<ul><li>b</ul><li>c</ul>");
    let outer = find_element(&tree, NodeId::ROOT, "ul").unwrap();
    assert_eq!(child_tags(&tree, outer), vec!["li", "li"]);
    assert_eq!(find_all(&tree, "li").len(), 3);
}

#[test]
fn test_option_closes_option() {
    let tree = parse("<select><option>a<option>b</select>");
    let select = find_element(&tree, NodeId::ROOT, "select").unwrap();
    assert_eq!(child_tags(&tree, select), vec!["option", "option"]);
}

#[test]
fn test_table_parts_close_predecessors() {
    let tree = parse("<table><tr><td>a<td>b<tr><td>c</table>");
    let table = find_element(&tree, NodeId::ROOT, "table").unwrap();
    assert_eq!(child_tags(&tree, table), vec!["tr", "tr"]);
    let rows = find_all(&tree, "tr");
    assert_eq!(child_tags(&tree, rows[0]), vec!["td", "td"]);
    assert_eq!(child_tags(&tree, rows[1]), vec!["td"]);
}

#[test]
fn test_nested_table_cells_stay_nested() {
    let tree = parse("<table><tr><td><table><tr><td>inner</td></tr></table></td><td>x</td></tr></table>");
    let outer_row = find_all(&tree, "tr")[0];
    assert_eq!(child_tags(&tree, outer_row), vec!["td", "td"]);
    assert_eq!(find_all(&tree, "table").len(), 2);
}

#[test]
fn test_any_other_end_tag_ignores_special() {
    let tree = parse("<div><span>a</div>b");
    let div = find_element(&tree, NodeId::ROOT, "div").unwrap();
    let body = tree.body().unwrap();
    assert_eq!(tree.parent(div), Some(body));
    // `b` follows the div, the span was closed with it.
    let last = tree.last_child(body).unwrap();
    assert_eq!(tree.as_text(last), Some("b"));
}

#[test]
fn test_stray_end_tag_is_ignored() {
    let (tree, diagnostics) = parse_document("<p>a</span>b</p>");
    let p = find_element(&tree, NodeId::ROOT, "p").unwrap();
    assert_eq!(tree.child_text(p), "ab");
    assert!(!diagnostics.is_empty());
}

#[test]
fn test_misnested_formatting_closes_inner() {
    let tree = parse("<b><i>x</b>y</i>");
    let b = find_element(&tree, NodeId::ROOT, "b").unwrap();
    let body = tree.body().unwrap();
    assert_eq!(tree.parent(b), Some(body));
    let last = tree.last_child(body).unwrap();
    assert_eq!(tree.as_text(last), Some("y"));
}

#[test]
fn test_a_start_tag_closes_open_a() {
    let tree = parse(r#"<a href="1">one<a href="2">two</a>"#);
    let body = tree.body().unwrap();
    assert_eq!(child_tags(&tree, body), vec!["a", "a"]);
    let links = find_all(&tree, "a");
    assert_eq!(text_content(&tree, links[0]), "one");
    assert_eq!(text_content(&tree, links[1]), "two");
}

#[test]
fn test_template_in_head_keeps_its_contents() {
    let (tree, _) = parse_document(
        "<html><head><template><p>x</p></template></head><body><p>y</p></body></html>",
    );
    let html = tree.document_element().unwrap();
    assert_eq!(child_tags(&tree, html), vec!["head", "body"]);
    let head = tree.head().unwrap();
    let template = find_element(&tree, head, "template").unwrap();
    assert_eq!(tree.parent(template), Some(head));
    assert_eq!(child_tags(&tree, template), vec!["p"]);
    assert_eq!(text_content(&tree, template), "x");
    assert_eq!(text_content(&tree, tree.body().unwrap()), "y");
}

#[test]
fn test_head_end_tag_inside_template_is_ignored() {
    let (tree, diagnostics) = parse_document("<head><template><div>a</head>b</div></template><title>t</title></head><p>c");
    let head = tree.head().unwrap();
    let template = find_element(&tree, head, "template").unwrap();
    assert_eq!(text_content(&tree, template), "ab");
    assert!(find_element(&tree, head, "title").is_some());
    assert_eq!(text_content(&tree, tree.body().unwrap()), "c");
    assert!(!diagnostics.is_empty());
}

#[test]
fn test_unknown_tags_are_generic_elements() {
    let tree = parse("<custom-card data-x=1><o:p></o:p></custom-card>");
    let card = find_element(&tree, NodeId::ROOT, "custom-card").unwrap();
    assert_eq!(child_tags(&tree, card), vec!["o:p"]);
}

#[test]
fn test_html_attributes_are_merged() {
    let tree = parse(r#"<html lang="en"><body><html dir="ltr" lang="fr">"#);
    let html = tree.document_element().unwrap();
    let data = tree.as_element(html).unwrap();
    assert_eq!(data.get_attribute("lang"), Some("en"));
    assert_eq!(data.get_attribute("dir"), Some("ltr"));
}

#[test]
fn test_svg_foreign_content() {
    let tree = parse(r#"<div><svg viewbox="0 0 10 10"><lineargradient/><path d="M0"/></svg><p>after</p></div>"#);
    let svg = find_element(&tree, NodeId::ROOT, "svg").unwrap();
    let data = tree.as_element(svg).unwrap();
    assert_eq!(data.namespace, Namespace::Svg);
    assert_eq!(data.get_attribute("viewBox"), Some("0 0 10 10"));
    assert_eq!(child_tags(&tree, svg), vec!["linearGradient", "path"]);

    let path = find_element(&tree, svg, "path").unwrap();
    assert!(tree.as_element(path).unwrap().self_closing);

    let div = find_element(&tree, NodeId::ROOT, "div").unwrap();
    assert_eq!(child_tags(&tree, div), vec!["svg", "p"]);
}

#[test]
fn test_html_breaks_out_of_svg() {
    let tree = parse("<svg><circle></circle><p>text</p>");
    let body = tree.body().unwrap();
    assert_eq!(child_tags(&tree, body), vec!["svg", "p"]);
    let p = find_element(&tree, NodeId::ROOT, "p").unwrap();
    assert_eq!(tree.as_element(p).unwrap().namespace, Namespace::Html);
}

#[test]
fn test_math_namespace() {
    let tree = parse("<math><mi>x</mi></math>");
    let mi = find_element(&tree, NodeId::ROOT, "mi").unwrap();
    assert_eq!(tree.as_element(mi).unwrap().namespace, Namespace::MathMl);
}

#[test]
fn test_unterminated_style_is_closed_at_eof() {
    let tree = parse("<style>h1{color:red}");
    let style = find_element(&tree, NodeId::ROOT, "style").unwrap();
    assert_eq!(tree.child_text(style), "h1{color:red}");
    assert!(tree.body().is_some());
}

#[test]
fn test_simple_email_template() {
    let html = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <style>
    .title { color: #333; }
  </style>
</head>
<body>
  <table role="presentation" width="100%">
    <tr>
      <td class="title">Welcome</td>
    </tr>
  </table>
</body>
</html>"#;
    let tree = parse(html);
    let head = tree.head().unwrap();
    assert_eq!(child_tags(&tree, head), vec!["meta", "style"]);
    let td = find_element(&tree, NodeId::ROOT, "td").unwrap();
    assert_eq!(text_content(&tree, td), "Welcome");
    assert!(tree.as_element(td).unwrap().has_class("title"));
}
