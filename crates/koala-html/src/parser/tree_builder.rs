use koala_common::{Component, Diagnostics};
use koala_dom::{
    Attribute, Attributes, DoctypeData, DomTree, ElementData, Namespace, NodeId, NodeType,
};
use strum_macros::Display;

use super::foreign_content::{adjust_mathml_attributes, adjust_svg_attributes, adjust_svg_tag_name};
use crate::tokenizer::Token;

/// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
///
/// "The insertion mode is a state variable that controls the primary operation
/// of the tree construction stage."
///
/// Only the modes a document needs are modelled. Table, select, template and
/// frameset content is handled by the "in body" rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InsertionMode {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    Initial,
    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    BeforeHtml,
    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    BeforeHead,
    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    InHead,
    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    AfterHead,
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    InBody,
    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    Text,
    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    AfterBody,
    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    AfterAfterBody,
}

/// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
///
/// Start tags that "close a p element" if one is in button scope.
const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "center",
    "details",
    "dialog",
    "dir",
    "div",
    "dl",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "header",
    "hgroup",
    "main",
    "menu",
    "nav",
    "ol",
    "search",
    "section",
    "summary",
    "ul",
];

/// End tags that close their element with "generate implied end tags" and
/// "pop until" when the element is in scope.
const BLOCK_END_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "button",
    "center",
    "details",
    "dialog",
    "dir",
    "div",
    "dl",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "header",
    "hgroup",
    "listing",
    "main",
    "menu",
    "nav",
    "ol",
    "pre",
    "search",
    "section",
    "select",
    "summary",
    "ul",
];

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
///
/// "Void elements: area, base, br, col, embed, hr, img, input, link, meta,
/// source, track, wbr"
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements that belong in `<head>` and are processed with the "in head"
/// rules wherever they appear.
const HEAD_ELEMENTS: &[&str] = &[
    "base", "basefont", "bgsound", "link", "meta", "noframes", "script", "style", "template",
    "title",
];

/// [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#special)
///
/// "The following elements have varying levels of special parsing rules"
const SPECIAL_ELEMENTS: &[&str] = &[
    "address",
    "applet",
    "area",
    "article",
    "aside",
    "base",
    "basefont",
    "bgsound",
    "blockquote",
    "body",
    "br",
    "button",
    "caption",
    "center",
    "col",
    "colgroup",
    "dd",
    "details",
    "dir",
    "div",
    "dl",
    "dt",
    "embed",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "frame",
    "frameset",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "head",
    "header",
    "hgroup",
    "hr",
    "html",
    "iframe",
    "img",
    "input",
    "keygen",
    "li",
    "link",
    "listing",
    "main",
    "marquee",
    "menu",
    "meta",
    "nav",
    "noembed",
    "noframes",
    "noscript",
    "object",
    "ol",
    "p",
    "param",
    "plaintext",
    "pre",
    "script",
    "search",
    "section",
    "select",
    "source",
    "style",
    "summary",
    "table",
    "tbody",
    "td",
    "template",
    "textarea",
    "tfoot",
    "th",
    "thead",
    "title",
    "tr",
    "track",
    "ul",
    "wbr",
    "xmp",
];

/// [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
///
/// "A start tag whose tag name is one of: ..." that breaks out of foreign
/// content back into HTML.
const FOREIGN_BREAKOUT_TAGS: &[&str] = &[
    "b",
    "big",
    "blockquote",
    "body",
    "br",
    "center",
    "code",
    "dd",
    "div",
    "dl",
    "dt",
    "em",
    "embed",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "head",
    "hr",
    "i",
    "img",
    "li",
    "listing",
    "menu",
    "meta",
    "nobr",
    "ol",
    "p",
    "pre",
    "ruby",
    "s",
    "small",
    "span",
    "strong",
    "strike",
    "sub",
    "sup",
    "table",
    "tt",
    "u",
    "ul",
    "var",
];

/// Table sections and rows, closed by a later sibling part.
const TABLE_SECTIONS: &[&str] = &["tbody", "thead", "tfoot"];

/// HTML tree builder.
///
/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// "The input to the tree construction stage is a sequence of tokens from the
/// tokenization stage."
///
/// The builder never fails: every parse error is recorded in its
/// [`Diagnostics`] and the token is recovered from the way browsers do.
pub struct HTMLParser {
    /// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
    insertion_mode: InsertionMode,

    /// "the original insertion mode", restored when the "text" mode ends.
    original_insertion_mode: Option<InsertionMode>,

    /// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    stack_of_open_elements: Vec<NodeId>,

    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#the-element-pointers)
    /// "the head element pointer"
    head_element_pointer: Option<NodeId>,

    tree: DomTree,
    tokens: Vec<Token>,
    stopped: bool,
    diagnostics: Diagnostics,
}

impl HTMLParser {
    /// Create a tree builder over a token stream.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            insertion_mode: InsertionMode::Initial,
            original_insertion_mode: None,
            stack_of_open_elements: Vec::new(),
            head_element_pointer: None,
            tree: DomTree::new(),
            tokens,
            stopped: false,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Build the tree, discarding diagnostics.
    #[must_use]
    pub fn run(self) -> DomTree {
        self.run_with_issues().0
    }

    /// Build the tree and return every parse error recorded along the way.
    #[must_use]
    pub fn run_with_issues(mut self) -> (DomTree, Diagnostics) {
        let tokens = std::mem::take(&mut self.tokens);
        for token in &tokens {
            self.process_token(token);
            if self.stopped {
                break;
            }
        }
        (self.tree, self.diagnostics)
    }

    /// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
    ///
    /// "As each token is emitted from the tokenizer, the user agent must follow
    /// the appropriate steps from the following list, known as the tree
    /// construction dispatcher"
    fn process_token(&mut self, token: &Token) {
        if self.should_use_foreign_content_rules(token) {
            self.handle_foreign_content(token);
            return;
        }
        self.process_token_in_mode(token);
    }

    fn process_token_in_mode(&mut self, token: &Token) {
        match self.insertion_mode {
            InsertionMode::Initial => self.handle_initial_mode(token),
            InsertionMode::BeforeHtml => self.handle_before_html_mode(token),
            InsertionMode::BeforeHead => self.handle_before_head_mode(token),
            InsertionMode::InHead => self.handle_in_head_mode(token),
            InsertionMode::AfterHead => self.handle_after_head_mode(token),
            InsertionMode::InBody => self.handle_in_body_mode(token),
            InsertionMode::Text => self.handle_text_mode(token),
            InsertionMode::AfterBody => self.handle_after_body_mode(token),
            InsertionMode::AfterAfterBody => self.handle_after_after_body_mode(token),
        }
    }

    fn reprocess_token(&mut self, token: &Token) {
        self.process_token(token);
    }

    fn parse_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        let mode = self.insertion_mode;
        self.diagnostics
            .warn(Component::Html, format!("{message} in \"{mode}\" mode"));
    }
}

// =============================================================================
// Node creation and insertion
// =============================================================================

impl HTMLParser {
    /// [§ 13.2.1 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
    const fn is_whitespace(c: char) -> bool {
        matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ')
    }

    /// Split a text run into its leading whitespace and the remainder.
    fn split_leading_whitespace(data: &str) -> (&str, &str) {
        let split = data
            .find(|c: char| !Self::is_whitespace(c))
            .unwrap_or(data.len());
        data.split_at(split)
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#current-node)
    ///
    /// "The current node is the bottommost node in this stack of open elements."
    fn current_node(&self) -> Option<NodeId> {
        self.stack_of_open_elements.last().copied()
    }

    fn get_tag_name(&self, id: NodeId) -> Option<&str> {
        self.tree.as_element(id).map(|data| data.tag_name.as_str())
    }

    /// Whether a `template` element is on the stack of open elements.
    fn template_is_open(&self) -> bool {
        self.stack_of_open_elements.iter().any(|&id| {
            self.tree
                .as_element(id)
                .is_some_and(|data| data.namespace == Namespace::Html && data.tag_name == "template")
        })
    }

    fn current_node_is(&self, tag_name: &str) -> bool {
        self.current_node()
            .and_then(|id| self.tree.as_element(id))
            .is_some_and(|data| data.namespace == Namespace::Html && data.tag_name == tag_name)
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-place-for-inserting-a-node)
    ///
    /// Without foster parenting the appropriate place is always the end of
    /// the current node.
    fn insertion_parent(&self) -> NodeId {
        self.current_node().unwrap_or(NodeId::ROOT)
    }

    /// [§ 13.2.6.1 Insert a character](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    ///
    /// "If there is a Text node immediately before the adjusted insertion
    /// location, then append data to that Text node's data."
    fn insert_text(&mut self, data: &str) {
        if data.is_empty() {
            return;
        }
        let parent = self.insertion_parent();
        if let Some(last) = self.tree.last_child(parent)
            && let Some(node) = self.tree.get_mut(last)
            && let NodeType::Text(ref mut text) = node.node_type
        {
            text.push_str(data);
            return;
        }
        let text_id = self.tree.alloc(NodeType::Text(data.to_string()));
        self.tree.append_child(parent, text_id);
    }

    /// [§ 13.2.6.1 Insert a comment](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-comment)
    fn insert_comment(&mut self, data: &str) {
        let parent = self.insertion_parent();
        self.insert_comment_into(parent, data);
    }

    fn insert_comment_into(&mut self, parent: NodeId, data: &str) {
        let comment_id = self.tree.alloc(NodeType::Comment(data.to_string()));
        self.tree.append_child(parent, comment_id);
    }

    /// [§ 13.2.6.1 Create an element for a token](https://html.spec.whatwg.org/multipage/parsing.html#create-an-element-for-the-token)
    fn create_element(
        &mut self,
        tag_name: &str,
        attributes: &[Attribute],
        namespace: Namespace,
    ) -> NodeId {
        let attrs: Attributes = attributes
            .iter()
            .map(|attr| (attr.name.clone(), attr.value.clone()))
            .collect();
        let mut data = ElementData::new(tag_name, attrs);
        data.namespace = namespace;
        self.tree.alloc(NodeType::Element(data))
    }

    /// [§ 13.2.6.1 Insert an HTML element](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    ///
    /// "Insert a foreign element for the token, with the HTML namespace"
    fn insert_html_element(&mut self, tag_name: &str, attributes: &[Attribute]) -> NodeId {
        self.insert_element(tag_name, attributes, Namespace::Html)
    }

    fn insert_element(
        &mut self,
        tag_name: &str,
        attributes: &[Attribute],
        namespace: Namespace,
    ) -> NodeId {
        // STEP 1: "Let the adjusted insertion location be the appropriate place
        //          for inserting a node."
        let parent = self.insertion_parent();
        // STEP 2: "Let element be the result of creating an element for the token"
        let element_id = self.create_element(tag_name, attributes, namespace);
        // STEP 3: "insert element at the adjusted insertion location"
        self.tree.append_child(parent, element_id);
        // STEP 4: "Push element onto the stack of open elements"
        self.stack_of_open_elements.push(element_id);
        element_id
    }

    /// Insert a void element: "Insert an HTML element for the token.
    /// Immediately pop the current node off the stack of open elements."
    fn insert_void_element(&mut self, tag_name: &str, attributes: &[Attribute]) {
        let _ = self.insert_html_element(tag_name, attributes);
        let _ = self.stack_of_open_elements.pop();
    }

    /// [§ 13.2.6.2 The generic raw text element parsing algorithm](https://html.spec.whatwg.org/multipage/parsing.html#generic-raw-text-element-parsing-algorithm)
    ///
    /// 1. "Insert an HTML element for the token."
    /// 2. "Switch the tokenizer to the RAWTEXT state." (done by the tokenizer)
    /// 3. "Let the original insertion mode be the current insertion mode."
    /// 4. "Switch the insertion mode to "text"."
    fn insert_raw_text_element(&mut self, tag_name: &str, attributes: &[Attribute]) {
        let _ = self.insert_html_element(tag_name, attributes);
        self.original_insertion_mode = Some(self.insertion_mode);
        self.insertion_mode = InsertionMode::Text;
    }

    /// Copy attributes missing from `target` onto it, as `<html>` and `<body>`
    /// start tags in body do.
    fn merge_attributes(&mut self, target: NodeId, attributes: &[Attribute]) {
        if let Some(data) = self.tree.as_element_mut(target) {
            for attr in attributes {
                let _ = data.attrs.push_if_absent(attr.name.clone(), attr.value.clone());
            }
        }
    }
}

// =============================================================================
// Stack of open elements
// =============================================================================

impl HTMLParser {
    /// Pop elements until one with the given tag name has been popped.
    fn pop_until_tag(&mut self, tag_name: &str) {
        while let Some(id) = self.stack_of_open_elements.pop() {
            if self.get_tag_name(id) == Some(tag_name) {
                break;
            }
        }
    }

    /// Pop elements until one of the given tag names has been popped.
    fn pop_until_one_of(&mut self, tag_names: &[&str]) {
        while let Some(id) = self.stack_of_open_elements.pop() {
            if self
                .get_tag_name(id)
                .is_some_and(|name| tag_names.contains(&name))
            {
                break;
            }
        }
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
    ///
    /// STEP 1: "Initialize node to be the current node."
    /// STEP 2: "If node is the target node, terminate in a match state."
    /// STEP 3: "Otherwise, if node is one of the element types in list,
    ///          terminate in a failure state."
    /// STEP 4: "Otherwise, set node to the previous entry in the stack of open
    ///          elements and return to step 2."
    fn has_element_in_specific_scope(&self, tag_names: &[&str], scope_markers: &[&str]) -> bool {
        for &node_id in self.stack_of_open_elements.iter().rev() {
            let Some(data) = self.tree.as_element(node_id) else {
                continue;
            };
            let tag = data.tag_name.as_str();
            if data.namespace == Namespace::Html && tag_names.contains(&tag) {
                return true;
            }
            if scope_markers.contains(&tag) {
                return false;
            }
        }
        false
    }

    /// "has an element in scope"
    fn has_element_in_scope(&self, tag_name: &str) -> bool {
        self.has_any_element_in_scope(&[tag_name])
    }

    fn has_any_element_in_scope(&self, tag_names: &[&str]) -> bool {
        const DEFAULT_SCOPE: &[&str] = &[
            "applet",
            "caption",
            "html",
            "table",
            "td",
            "th",
            "marquee",
            "object",
            "template",
            "foreignObject",
            "desc",
            "mi",
            "mo",
            "mn",
            "ms",
            "mtext",
            "annotation-xml",
        ];
        self.has_element_in_specific_scope(tag_names, DEFAULT_SCOPE)
    }

    /// "has an element in button scope": the default scope plus `button`.
    fn has_element_in_button_scope(&self, tag_name: &str) -> bool {
        const BUTTON_SCOPE: &[&str] = &[
            "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template",
            "button",
        ];
        self.has_element_in_specific_scope(&[tag_name], BUTTON_SCOPE)
    }

    /// "has an element in list item scope": the default scope plus `ol`, `ul`.
    fn has_element_in_list_item_scope(&self, tag_name: &str) -> bool {
        const LIST_ITEM_SCOPE: &[&str] = &[
            "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template",
            "ol", "ul",
        ];
        self.has_element_in_specific_scope(&[tag_name], LIST_ITEM_SCOPE)
    }

    /// "has an element in table scope": `html`, `table`, `template`.
    fn has_element_in_table_scope(&self, tag_names: &[&str]) -> bool {
        const TABLE_SCOPE: &[&str] = &["html", "table", "template"];
        self.has_element_in_specific_scope(tag_names, TABLE_SCOPE)
    }

    /// [§ 13.2.6.3 Closing elements that have implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
    ///
    /// "while the current node is a dd element, a dt element, an li element,
    /// an optgroup element, an option element, a p element, an rb element, an
    /// rp element, an rt element, or an rtc element, the user agent must pop
    /// the current node off the stack of open elements."
    fn generate_implied_end_tags_excluding(&mut self, exclude: Option<&str>) {
        const IMPLIED_END_TAG_ELEMENTS: &[&str] = &[
            "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc",
        ];
        while let Some(current) = self.current_node() {
            if let Some(tag) = self.get_tag_name(current)
                && IMPLIED_END_TAG_ELEMENTS.contains(&tag)
                && exclude != Some(tag)
            {
                let _ = self.stack_of_open_elements.pop();
                continue;
            }
            break;
        }
    }

    fn generate_implied_end_tags(&mut self) {
        self.generate_implied_end_tags_excluding(None);
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#close-a-p-element)
    ///
    /// "close a p element": "Generate implied end tags, except for p elements.
    /// ... Pop elements from the stack of open elements until a p element has
    /// been popped from the stack."
    fn close_p_element(&mut self) {
        self.generate_implied_end_tags_excluding(Some("p"));
        if !self.current_node_is("p") {
            self.parse_error("unclosed elements before </p>");
        }
        self.pop_until_tag("p");
    }

    fn close_p_if_in_button_scope(&mut self) {
        if self.has_element_in_button_scope("p") {
            self.close_p_element();
        }
    }

    /// Close an open cell, row or section before a new table part starts.
    fn close_table_parts(&mut self, parts: &[&str]) {
        if self.has_element_in_table_scope(parts) {
            self.generate_implied_end_tags();
            self.pop_until_one_of(parts);
        }
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#special)
    fn is_special_element(tag_name: &str) -> bool {
        SPECIAL_ELEMENTS.contains(&tag_name)
    }

    /// [§ 13.2.6.4.7 "in body" - Any other end tag](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    ///
    /// 1. "Initialize node to be the current node (the bottommost node of the stack)."
    /// 2. "Loop: If node is an HTML element with the same tag name as the token, then:"
    ///    a. "Generate implied end tags, except for HTML elements with the same tag name
    ///    as the token."
    ///    b. "If node is not the current node, then this is a parse error."
    ///    c. "Pop all the nodes from the current node up to node, including node, then stop
    ///    these steps."
    /// 3. "Otherwise, if node is in the special category, then this is a parse error;
    ///    ignore the token, and return."
    /// 4. "Set node to the previous entry in the stack of open elements and return to
    ///    the step labeled loop."
    fn any_other_end_tag(&mut self, tag_name: &str) {
        let mut i = self.stack_of_open_elements.len();
        while i > 0 {
            i -= 1;
            let node_id = self.stack_of_open_elements[i];
            if let Some(node_tag) = self.get_tag_name(node_id) {
                if node_tag == tag_name {
                    self.generate_implied_end_tags_excluding(Some(tag_name));
                    if self.current_node() != Some(node_id) {
                        self.parse_error(format!("misnested </{tag_name}>"));
                    }
                    self.stack_of_open_elements.truncate(i);
                    return;
                }
                if Self::is_special_element(node_tag) {
                    self.parse_error(format!("stray </{tag_name}>"));
                    return;
                }
            }
        }
    }
}

// =============================================================================
// Insertion modes
// =============================================================================

impl HTMLParser {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    fn handle_initial_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
            // "Ignore the token."
            Token::Text { data } => {
                let (_, rest) = Self::split_leading_whitespace(data);
                if !rest.is_empty() {
                    self.insertion_mode = InsertionMode::BeforeHtml;
                    self.reprocess_token(&Token::Text {
                        data: rest.to_string(),
                    });
                }
            }

            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment { data } => {
                self.insert_comment_into(NodeId::ROOT, data);
            }

            // "A DOCTYPE token"
            // "Append a DocumentType node to the Document node, with its name
            // set to the name given in the DOCTYPE token, or the empty string
            // if the name was missing; its public ID set to the public
            // identifier given in the DOCTYPE token, or the empty string if the
            // public identifier was missing; and its system ID set to the
            // system identifier given in the DOCTYPE token..."
            // "Then, switch the insertion mode to "before html"."
            Token::Doctype {
                name,
                public_identifier,
                system_identifier,
                ..
            } => {
                let doctype = DoctypeData {
                    name: name.clone().unwrap_or_default(),
                    public_id: public_identifier.clone(),
                    system_id: system_identifier.clone(),
                };
                let doctype_id = self.tree.alloc(NodeType::Doctype(doctype));
                self.tree.append_child(NodeId::ROOT, doctype_id);
                self.insertion_mode = InsertionMode::BeforeHtml;
            }

            // "Anything else"
            // "In any case, switch the insertion mode to "before html", then
            // reprocess the token."
            _ => {
                self.insertion_mode = InsertionMode::BeforeHtml;
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    fn handle_before_html_mode(&mut self, token: &Token) {
        match token {
            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error("unexpected DOCTYPE"),

            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment { data } => {
                self.insert_comment_into(NodeId::ROOT, data);
            }

            // Whitespace: "Ignore the token."
            Token::Text { data } => {
                let (_, rest) = Self::split_leading_whitespace(data);
                if !rest.is_empty() {
                    self.handle_before_html_anything_else(&Token::Text {
                        data: rest.to_string(),
                    });
                }
            }

            // "A start tag whose tag name is "html""
            // "Create an element for the token in the HTML namespace, with the
            // Document as the intended parent. Append it to the Document
            // object. Put this element in the stack of open elements."
            // "Switch the insertion mode to "before head"."
            Token::StartTag {
                name, attributes, ..
            } if name == "html" => {
                let _ = self.insert_html_element(name, attributes);
                self.insertion_mode = InsertionMode::BeforeHead;
            }

            // "An end tag whose tag name is one of: "head", "body", "html", "br""
            // "Act as described in the "anything else" entry below."
            Token::EndTag { name } if matches!(name.as_str(), "head" | "body" | "html" | "br") => {
                self.handle_before_html_anything_else(token);
            }

            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::EndTag { name } => self.parse_error(format!("stray </{name}>")),

            _ => self.handle_before_html_anything_else(token),
        }
    }

    /// "Anything else": "Create an html element whose node document is the
    /// Document object. Append it to the Document object. Put this element in
    /// the stack of open elements. Switch the insertion mode to "before head",
    /// then reprocess the token."
    fn handle_before_html_anything_else(&mut self, token: &Token) {
        let _ = self.insert_html_element("html", &[]);
        self.insertion_mode = InsertionMode::BeforeHead;
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    fn handle_before_head_mode(&mut self, token: &Token) {
        match token {
            // Whitespace: "Ignore the token."
            Token::Text { data } => {
                let (_, rest) = Self::split_leading_whitespace(data);
                if !rest.is_empty() {
                    self.handle_before_head_anything_else(&Token::Text {
                        data: rest.to_string(),
                    });
                }
            }

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error("unexpected DOCTYPE"),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "A start tag whose tag name is "head""
            // "Insert an HTML element for the token."
            // "Set the head element pointer to the newly created head element."
            // "Switch the insertion mode to "in head"."
            Token::StartTag {
                name, attributes, ..
            } if name == "head" => {
                let head_id = self.insert_html_element(name, attributes);
                self.head_element_pointer = Some(head_id);
                self.insertion_mode = InsertionMode::InHead;
            }

            // "An end tag whose tag name is one of: "head", "body", "html", "br""
            // "Act as described in the "anything else" entry below."
            Token::EndTag { name } if matches!(name.as_str(), "head" | "body" | "html" | "br") => {
                self.handle_before_head_anything_else(token);
            }

            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::EndTag { name } => self.parse_error(format!("stray </{name}>")),

            _ => self.handle_before_head_anything_else(token),
        }
    }

    /// "Anything else": "Insert an HTML element for a "head" start tag token
    /// with no attributes. Set the head element pointer to the newly created
    /// head element. Switch the insertion mode to "in head". Reprocess the
    /// current token."
    fn handle_before_head_anything_else(&mut self, token: &Token) {
        let head_id = self.insert_html_element("head", &[]);
        self.head_element_pointer = Some(head_id);
        self.insertion_mode = InsertionMode::InHead;
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    fn handle_in_head_mode(&mut self, token: &Token) {
        match token {
            // Whitespace: "Insert the character."
            Token::Text { data } => {
                let (whitespace, rest) = Self::split_leading_whitespace(data);
                self.insert_text(whitespace);
                if !rest.is_empty() {
                    self.handle_in_head_anything_else(&Token::Text {
                        data: rest.to_string(),
                    });
                }
            }

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error("unexpected DOCTYPE"),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "A start tag whose tag name is one of: "base", "basefont",
            // "bgsound", "link""
            // "Insert an HTML element for the token. Immediately pop the
            // current node off the stack of open elements."
            //
            // "A start tag whose tag name is "meta"" - same.
            Token::StartTag {
                name, attributes, ..
            } if matches!(
                name.as_str(),
                "base" | "basefont" | "bgsound" | "link" | "meta"
            ) =>
            {
                self.insert_void_element(name, attributes);
            }

            // "A start tag whose tag name is "title""
            // "Follow the generic RCDATA element parsing algorithm."
            //
            // "A start tag whose tag name is one of: "noframes", "style""
            // "Follow the generic raw text element parsing algorithm."
            //
            // "A start tag whose tag name is "noscript", if the scripting flag
            // is enabled" - the tokenizer always treats noscript as raw text.
            //
            // "A start tag whose tag name is "script"" - inserted and read in
            // the script data state.
            Token::StartTag {
                name, attributes, ..
            } if matches!(
                name.as_str(),
                "title" | "noframes" | "style" | "noscript" | "script"
            ) =>
            {
                self.insert_raw_text_element(name, attributes);
            }

            // "A start tag whose tag name is "template""
            //
            // Template contents are parsed as regular children, with the
            // "in body" rules, until the matching end tag. The insertion mode
            // stays "in head" so that `head` is closed only after it.
            Token::StartTag {
                name, attributes, ..
            } if name == "template" => {
                let _ = self.insert_html_element(name, attributes);
            }

            Token::EndTag { name } if name == "template" => {
                if self.has_element_in_scope("template") {
                    self.generate_implied_end_tags();
                    self.pop_until_tag("template");
                } else {
                    self.parse_error("stray </template>");
                }
            }

            // "An end tag whose tag name is "head""
            // "Pop the current node (which will be the head element) off the
            // stack of open elements."
            // "Switch the insertion mode to "after head"."
            Token::EndTag { name } if name == "head" => {
                if self.template_is_open() {
                    self.parse_error("</head> inside <template>");
                    return;
                }
                let _ = self.stack_of_open_elements.pop();
                self.insertion_mode = InsertionMode::AfterHead;
            }

            // "An end tag whose tag name is one of: "body", "html", "br""
            // "Act as described in the "anything else" entry below."
            Token::EndTag { name } if matches!(name.as_str(), "body" | "html" | "br") => {
                self.handle_in_head_anything_else(token);
            }

            // "A start tag whose tag name is "head""
            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::StartTag { name, .. } if name == "head" => {
                self.parse_error("nested <head>");
            }
            Token::EndTag { .. } if self.template_is_open() => self.handle_in_body_mode(token),
            Token::EndTag { name } => self.parse_error(format!("stray </{name}>")),

            _ => self.handle_in_head_anything_else(token),
        }
    }

    /// "Anything else": "Pop the current node (which will be the head element)
    /// off the stack of open elements. Switch the insertion mode to "after
    /// head". Reprocess the token."
    ///
    /// Inside an open `<template>` the current node is not `head`, so the
    /// token goes to the template's contents instead.
    fn handle_in_head_anything_else(&mut self, token: &Token) {
        if self.template_is_open() {
            self.handle_in_body_mode(token);
            return;
        }
        let _ = self.stack_of_open_elements.pop();
        self.insertion_mode = InsertionMode::AfterHead;
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    fn handle_after_head_mode(&mut self, token: &Token) {
        match token {
            // Whitespace: "Insert the character."
            Token::Text { data } => {
                let (whitespace, rest) = Self::split_leading_whitespace(data);
                self.insert_text(whitespace);
                if !rest.is_empty() {
                    self.handle_after_head_anything_else(&Token::Text {
                        data: rest.to_string(),
                    });
                }
            }

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error("unexpected DOCTYPE"),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "A start tag whose tag name is "body""
            // "Insert an HTML element for the token."
            // "Switch the insertion mode to "in body"."
            Token::StartTag {
                name, attributes, ..
            } if name == "body" => {
                let _ = self.insert_html_element(name, attributes);
                self.insertion_mode = InsertionMode::InBody;
            }

            // "A start tag whose tag name is one of: "base", "basefont",
            // "bgsound", "link", "meta", "noframes", "script", "style",
            // "template", "title""
            // "Parse error."
            // "Push the node pointed to by the head element pointer onto the
            // stack of open elements."
            // "Process the token using the rules for the "in head" insertion mode."
            // "Remove the node pointed to by the head element pointer from the
            // stack of open elements. (It might not be the current node at this
            // point.)"
            Token::StartTag { name, .. } if HEAD_ELEMENTS.contains(&name.as_str()) => {
                self.parse_error(format!("<{name}> after </head>"));
                let Some(head_id) = self.head_element_pointer else {
                    self.handle_after_head_anything_else(token);
                    return;
                };
                self.stack_of_open_elements.push(head_id);
                self.handle_in_head_mode(token);
                if let Some(pos) = self
                    .stack_of_open_elements
                    .iter()
                    .rposition(|&id| id == head_id)
                {
                    let _ = self.stack_of_open_elements.remove(pos);
                }
            }

            // "An end tag whose tag name is "template""
            // "Process the token using the rules for the "in head" insertion mode."
            Token::EndTag { name } if name == "template" => self.handle_in_head_mode(token),

            // "A start tag whose tag name is "head""
            // "Parse error. Ignore the token."
            Token::StartTag { name, .. } if name == "head" => {
                self.parse_error("<head> after </head>");
            }

            // "An end tag whose tag name is one of: "body", "html", "br""
            // "Act as described in the "anything else" entry below."
            Token::EndTag { name } if matches!(name.as_str(), "body" | "html" | "br") => {
                self.handle_after_head_anything_else(token);
            }

            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::EndTag { name } => self.parse_error(format!("stray </{name}>")),

            _ => self.handle_after_head_anything_else(token),
        }
    }

    /// "Anything else": "Insert an HTML element for a "body" start tag token
    /// with no attributes. Switch the insertion mode to "in body". Reprocess
    /// the current token."
    fn handle_after_head_anything_else(&mut self, token: &Token) {
        let _ = self.insert_html_element("body", &[]);
        self.insertion_mode = InsertionMode::InBody;
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    ///
    /// ## Not Implemented:
    /// - [§ 13.2.4.3] List of active formatting elements
    /// - [§ 13.2.6.4.7] Adoption agency algorithm (misnested formatting is
    ///   closed by the "any other end tag" walk instead)
    /// - [§ 13.2.6.1] Foster parenting
    /// - Table insertion modes: table parts are inserted where they appear
    ///   and close their predecessors within the current table
    fn handle_in_body_mode(&mut self, token: &Token) {
        match token {
            // "Any other character token"
            // "Insert the character."
            Token::Text { data } => self.insert_text(data),

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error("unexpected DOCTYPE"),

            Token::StartTag {
                name,
                self_closing,
                attributes,
            } => self.handle_in_body_start_tag(name, *self_closing, attributes),

            Token::EndTag { name } => self.handle_in_body_end_tag(token, name),

            // "An end-of-file token"
            // "Stop parsing."
            Token::EndOfFile => self.stopped = true,
        }
    }

    #[allow(clippy::too_many_lines)]
    fn handle_in_body_start_tag(&mut self, name: &str, self_closing: bool, attributes: &[Attribute]) {
        if self_closing && !VOID_ELEMENTS.contains(&name) && !matches!(name, "svg" | "math") {
            self.parse_error(format!("non-void <{name}/>"));
        }
        match name {
            // "A start tag whose tag name is "html""
            // "Parse error. ... for each attribute on the token, check to see if
            // the attribute is already present on the top element of the stack
            // of open elements. If it is not, add the attribute"
            "html" => {
                self.parse_error("nested <html>");
                if let Some(&html_id) = self.stack_of_open_elements.first() {
                    self.merge_attributes(html_id, attributes);
                }
            }

            // "A start tag whose tag name is one of: "base", "basefont",
            // "bgsound", "link", "meta", "noframes", "script", "style",
            // "template", "title""
            // "Process the token using the rules for the "in head" insertion mode."
            _ if HEAD_ELEMENTS.contains(&name) => {
                self.handle_in_head_mode(&Token::StartTag {
                    name: name.to_string(),
                    self_closing,
                    attributes: attributes.to_vec(),
                });
            }

            // "A start tag whose tag name is "body""
            // "Parse error. ... for each attribute on the token, check to see if
            // the attribute is already present on the body element (the second
            // element) on the stack of open elements, and if it is not, add the
            // attribute"
            "body" => {
                self.parse_error("nested <body>");
                if let Some(&body_id) = self.stack_of_open_elements.get(1)
                    && self.get_tag_name(body_id) == Some("body")
                {
                    self.merge_attributes(body_id, attributes);
                }
            }

            // "A start tag whose tag name is "head""
            // "Parse error. Ignore the token."
            "head" => self.parse_error("<head> in body"),

            // "If the stack of open elements has a p element in button scope,
            // then close a p element."
            // "Insert an HTML element for the token."
            _ if BLOCK_ELEMENTS.contains(&name) => {
                self.close_p_if_in_button_scope();
                let _ = self.insert_html_element(name, attributes);
            }

            // "A start tag whose tag name is one of: "h1", "h2", "h3", "h4", "h5", "h6""
            // "If the stack of open elements has a p element in button scope,
            // then close a p element."
            // "If the current node is an HTML element whose tag name is one of
            // "h1", "h2", "h3", "h4", "h5", or "h6", then this is a parse error;
            // pop the current node off the stack of open elements."
            // "Insert an HTML element for the token."
            _ if HEADINGS.contains(&name) => {
                self.close_p_if_in_button_scope();
                if HEADINGS.iter().any(|h| self.current_node_is(h)) {
                    self.parse_error(format!("<{name}> inside a heading"));
                    let _ = self.stack_of_open_elements.pop();
                }
                let _ = self.insert_html_element(name, attributes);
            }

            // "A start tag whose tag name is one of: "pre", "listing""
            // "A start tag whose tag name is "form""
            // "A start tag whose tag name is "plaintext""
            "pre" | "listing" | "form" | "plaintext" => {
                self.close_p_if_in_button_scope();
                let _ = self.insert_html_element(name, attributes);
            }

            // "A start tag whose tag name is "li""
            // "A start tag whose tag name is one of: "dd", "dt""
            "li" => self.close_list_item(&["li"], name, attributes),
            "dd" | "dt" => self.close_list_item(&["dd", "dt"], name, attributes),

            // "A start tag whose tag name is "a""
            // "If the list of active formatting elements contains an a element
            // between the end of the list and the last marker on the list (or
            // the start of the list if there is no marker on the list), then
            // this is a parse error; run the adoption agency algorithm for the
            // token, then remove that element from the list of active
            // formatting elements and the stack of open elements if the
            // adoption agency algorithm didn't already remove it"
            //
            // Without the adoption agency the open `a` and anything opened
            // inside it are closed, so links never nest.
            "a" => {
                if self.has_element_in_scope("a") {
                    self.parse_error("nested <a>");
                    self.pop_until_tag("a");
                }
                let _ = self.insert_html_element(name, attributes);
            }

            // "A start tag whose tag name is "button""
            // "If the stack of open elements has a button element in scope,
            // then run these substeps: Parse error. Generate implied end tags.
            // Pop elements from the stack of open elements until a button
            // element has been popped from the stack."
            "button" => {
                if self.has_element_in_scope("button") {
                    self.parse_error("nested <button>");
                    self.generate_implied_end_tags();
                    self.pop_until_tag("button");
                }
                let _ = self.insert_html_element(name, attributes);
            }

            // "A start tag whose tag name is "table""
            // "If the Document is not set to quirks mode, and the stack of open
            // elements has a p element in button scope, then close a p element."
            "table" => {
                self.close_p_if_in_button_scope();
                let _ = self.insert_html_element(name, attributes);
            }

            // Table parts close the open cell, row or section of the current
            // table before they are inserted.
            "td" | "th" => {
                self.close_table_parts(&["td", "th"]);
                let _ = self.insert_html_element(name, attributes);
            }
            "tr" => {
                self.close_table_parts(&["td", "th"]);
                self.close_table_parts(&["tr"]);
                let _ = self.insert_html_element(name, attributes);
            }
            "tbody" | "thead" | "tfoot" | "caption" | "colgroup" => {
                self.close_table_parts(&["td", "th"]);
                self.close_table_parts(&["tr"]);
                self.close_table_parts(TABLE_SECTIONS);
                let _ = self.insert_html_element(name, attributes);
            }

            // "A start tag whose tag name is "hr""
            // "If the stack of open elements has a p element in button scope,
            // then close a p element."
            // "Insert an HTML element for the token. Immediately pop the current
            // node off the stack of open elements."
            "hr" => {
                self.close_p_if_in_button_scope();
                self.insert_void_element(name, attributes);
            }

            // "A start tag whose tag name is "image""
            // "Parse error. Change the token's tag name to "img" and reprocess
            // it. (Don't ask.)"
            "image" => {
                self.parse_error("<image> start tag");
                self.handle_in_body_start_tag("img", self_closing, attributes);
            }

            _ if VOID_ELEMENTS.contains(&name) => self.insert_void_element(name, attributes),

            // "A start tag whose tag name is "textarea""
            // "Insert an HTML element for the token. ... Switch the tokenizer to
            // the RCDATA state. Let the original insertion mode be the current
            // insertion mode. ... Switch the insertion mode to "text"."
            "textarea" => self.insert_raw_text_element(name, attributes),

            // "A start tag whose tag name is "xmp""
            // "If the stack of open elements has a p element in button scope,
            // then close a p element. ... Follow the generic raw text element
            // parsing algorithm."
            "xmp" => {
                self.close_p_if_in_button_scope();
                self.insert_raw_text_element(name, attributes);
            }

            // "A start tag whose tag name is "iframe"", ""noembed"" and
            // ""noscript", if the scripting flag is enabled"
            // "Follow the generic raw text element parsing algorithm."
            "iframe" | "noembed" | "noscript" => self.insert_raw_text_element(name, attributes),

            // "A start tag whose tag name is one of: "optgroup", "option""
            // "If the current node is an option element, then pop the current
            // node off the stack of open elements."
            "optgroup" | "option" => {
                if self.current_node_is("option") {
                    let _ = self.stack_of_open_elements.pop();
                }
                let _ = self.insert_html_element(name, attributes);
            }

            // "A start tag whose tag name is "math"" / "svg""
            // "Adjust MathML/SVG attributes for the token. ... Insert a foreign
            // element for the token, with MathML/SVG namespace and false."
            // "If the token has its self-closing flag set, pop the current node
            // off the stack of open elements and acknowledge the token's
            // self-closing flag."
            "svg" => self.insert_foreign_element(name, attributes, self_closing, Namespace::Svg),
            "math" => {
                self.insert_foreign_element(name, attributes, self_closing, Namespace::MathMl);
            }

            // "Any other start tag"
            // "Insert an HTML element for the token."
            _ => {
                let _ = self.insert_html_element(name, attributes);
            }
        }
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    ///
    /// "A start tag whose tag name is "li"":
    /// 1. "Initialize node to be the current node (the bottommost node of the stack)."
    /// 2. "Loop: If node is an li element, then run these substeps: Generate
    ///    implied end tags, except for li elements. ... Pop elements from the
    ///    stack of open elements until an li element has been popped from the
    ///    stack. Jump to the step labeled done below."
    /// 3. "If node is in the special category, but is not an address, div, or
    ///    p element, then jump to the step labeled done below."
    /// 4. "Otherwise, set node to the previous entry in the stack of open
    ///    elements and return to the step labeled loop."
    /// 5. "Done: If the stack of open elements has a p element in button scope,
    ///    then close a p element."
    /// 6. "Finally, insert an HTML element for the token."
    ///
    /// `dd` and `dt` run the same steps, each closing either of the two.
    fn close_list_item(&mut self, closes: &[&str], name: &str, attributes: &[Attribute]) {
        let mut open_item = None;
        for &node_id in self.stack_of_open_elements.iter().rev() {
            let Some(node_tag) = self.get_tag_name(node_id) else {
                continue;
            };
            if closes.contains(&node_tag) {
                open_item = Some(node_tag.to_string());
                break;
            }
            if Self::is_special_element(node_tag) && !matches!(node_tag, "address" | "div" | "p") {
                break;
            }
        }
        if let Some(item) = open_item {
            self.generate_implied_end_tags_excluding(Some(&item));
            self.pop_until_tag(&item);
        }
        self.close_p_if_in_button_scope();
        let _ = self.insert_html_element(name, attributes);
    }

    fn handle_in_body_end_tag(&mut self, token: &Token, name: &str) {
        match name {
            // "An end tag whose tag name is "body""
            // "If the stack of open elements does not have a body element in
            // scope, this is a parse error; ignore the token."
            // "Switch the insertion mode to "after body"."
            "body" => {
                if self.has_element_in_scope("body") {
                    self.insertion_mode = InsertionMode::AfterBody;
                } else {
                    self.parse_error("stray </body>");
                }
            }

            // "An end tag whose tag name is "html""
            // "If the stack of open elements does not have a body element in
            // scope, this is a parse error; ignore the token."
            // "Switch the insertion mode to "after body"."
            // "Reprocess the token."
            "html" => {
                if self.has_element_in_scope("body") {
                    self.insertion_mode = InsertionMode::AfterBody;
                    self.reprocess_token(token);
                } else {
                    self.parse_error("stray </html>");
                }
            }

            // "An end tag whose tag name is "template""
            "template" => self.handle_in_head_mode(token),

            // "If the stack of open elements does not have an element in scope
            // that is an HTML element with the same tag name as that of the
            // token, then this is a parse error; ignore the token."
            // "Generate implied end tags."
            // "Pop elements from the stack of open elements until an HTML
            // element with the same tag name as the token has been popped from
            // the stack."
            _ if BLOCK_END_TAGS.contains(&name) => {
                if self.has_element_in_scope(name) {
                    self.generate_implied_end_tags();
                    if !self.current_node_is(name) {
                        self.parse_error(format!("misnested </{name}>"));
                    }
                    self.pop_until_tag(name);
                } else {
                    self.parse_error(format!("stray </{name}>"));
                }
            }

            // "An end tag whose tag name is "p""
            // "If the stack of open elements does not have a p element in button
            // scope, then this is a parse error; insert an HTML element for a
            // "p" start tag token with no attributes."
            // "Close a p element."
            "p" => {
                if !self.has_element_in_button_scope("p") {
                    self.parse_error("stray </p>");
                    let _ = self.insert_html_element("p", &[]);
                }
                self.close_p_element();
            }

            // "An end tag whose tag name is "li""
            // "If the stack of open elements does not have an li element in list
            // item scope, then this is a parse error; ignore the token."
            "li" => {
                if self.has_element_in_list_item_scope("li") {
                    self.generate_implied_end_tags_excluding(Some("li"));
                    self.pop_until_tag("li");
                } else {
                    self.parse_error("stray </li>");
                }
            }

            // "An end tag whose tag name is one of: "dd", "dt""
            "dd" | "dt" => {
                if self.has_element_in_scope(name) {
                    self.generate_implied_end_tags_excluding(Some(name));
                    self.pop_until_tag(name);
                } else {
                    self.parse_error(format!("stray </{name}>"));
                }
            }

            // "An end tag whose tag name is one of: "h1", "h2", "h3", "h4", "h5", "h6""
            // "If the stack of open elements does not have an element in scope
            // that is an HTML element and whose tag name is one of "h1", "h2",
            // "h3", "h4", "h5", or "h6", then this is a parse error; ignore the
            // token."
            _ if HEADINGS.contains(&name) => {
                if self.has_any_element_in_scope(HEADINGS) {
                    self.generate_implied_end_tags();
                    self.pop_until_one_of(HEADINGS);
                } else {
                    self.parse_error(format!("stray </{name}>"));
                }
            }

            // Table parts close within the current table only.
            "table" | "tbody" | "thead" | "tfoot" | "tr" | "td" | "th" | "caption" | "colgroup" => {
                if self.has_element_in_table_scope(&[name]) {
                    self.generate_implied_end_tags();
                    self.pop_until_tag(name);
                } else {
                    self.parse_error(format!("stray </{name}>"));
                }
            }

            // "An end tag whose tag name is "br""
            // "Parse error. Drop the attributes from the token, and act as
            // described in the next entry; i.e. act as if this was a "br" start
            // tag token with no attributes, rather than the end tag token that
            // it actually is."
            "br" => {
                self.parse_error("</br> end tag");
                self.insert_void_element("br", &[]);
            }

            // "Any other end tag"
            _ => self.any_other_end_tag(name),
        }
    }

    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    fn handle_text_mode(&mut self, token: &Token) {
        match token {
            // "A character token"
            // "Insert the character."
            Token::Text { data } => self.insert_text(data),

            // "An end-of-file token"
            // "Parse error."
            // "Pop the current node off the stack of open elements."
            // "Switch the insertion mode to the original insertion mode and
            // reprocess the token."
            Token::EndOfFile => {
                self.parse_error("end of file in raw text");
                let _ = self.stack_of_open_elements.pop();
                self.insertion_mode = self
                    .original_insertion_mode
                    .take()
                    .unwrap_or(InsertionMode::InBody);
                self.reprocess_token(token);
            }

            // "Any other end tag"
            // "Pop the current node off the stack of open elements."
            // "Switch the insertion mode to the original insertion mode."
            Token::EndTag { .. } => {
                let _ = self.stack_of_open_elements.pop();
                self.insertion_mode = self
                    .original_insertion_mode
                    .take()
                    .unwrap_or(InsertionMode::InBody);
            }

            // The tokenizer only emits text and the matching end tag while in
            // a raw text state.
            Token::StartTag { .. } | Token::Comment { .. } | Token::Doctype { .. } => {
                self.parse_error("markup inside raw text");
            }
        }
    }

    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    fn handle_after_body_mode(&mut self, token: &Token) {
        match token {
            // Whitespace: "Process the token using the rules for the "in body"
            // insertion mode."
            Token::Text { data } if data.chars().all(Self::is_whitespace) => {
                self.handle_in_body_mode(token);
            }

            // "A comment token"
            // "Insert a comment as the last child of the first element in the
            // stack of open elements (the html element)."
            Token::Comment { data } => {
                let html_id = self
                    .stack_of_open_elements
                    .first()
                    .copied()
                    .unwrap_or(NodeId::ROOT);
                self.insert_comment_into(html_id, data);
            }

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error("unexpected DOCTYPE"),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "An end tag whose tag name is "html""
            // "Switch the insertion mode to "after after body"."
            Token::EndTag { name } if name == "html" => {
                self.insertion_mode = InsertionMode::AfterAfterBody;
            }

            // "An end-of-file token"
            // "Stop parsing."
            Token::EndOfFile => self.stopped = true,

            // "Anything else"
            // "Parse error. Switch the insertion mode to "in body" and
            // reprocess the token."
            _ => {
                self.parse_error("content after </body>");
                self.insertion_mode = InsertionMode::InBody;
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    fn handle_after_after_body_mode(&mut self, token: &Token) {
        match token {
            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment { data } => self.insert_comment_into(NodeId::ROOT, data),

            // "A DOCTYPE token", whitespace, "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::Doctype { .. } => self.handle_in_body_mode(token),
            Token::Text { data } if data.chars().all(Self::is_whitespace) => {
                self.handle_in_body_mode(token);
            }
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "An end-of-file token"
            // "Stop parsing."
            Token::EndOfFile => self.stopped = true,

            // "Anything else"
            // "Parse error. Switch the insertion mode to "in body" and
            // reprocess the token."
            _ => {
                self.parse_error("content after </html>");
                self.insertion_mode = InsertionMode::InBody;
                self.reprocess_token(token);
            }
        }
    }
}

// =============================================================================
// Foreign content
// =============================================================================

impl HTMLParser {
    /// [§ 13.2.6 Tree construction dispatcher](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    ///
    /// Foreign rules apply unless "the adjusted current node is an element in
    /// the HTML namespace", or it is an integration point and the token is a
    /// start tag or character token, or "the token is an end-of-file token".
    fn should_use_foreign_content_rules(&self, token: &Token) -> bool {
        if matches!(token, Token::EndOfFile) || self.insertion_mode == InsertionMode::Text {
            return false;
        }
        let Some(data) = self.current_node().and_then(|id| self.tree.as_element(id)) else {
            return false;
        };
        let integration_point = match data.namespace {
            Namespace::Html => return false,
            // "An svg element whose local name is foreignObject, desc or title"
            Namespace::Svg => matches!(data.tag_name.as_str(), "foreignObject" | "desc" | "title"),
            // "A MathML text integration point" and "annotation-xml"
            Namespace::MathMl => matches!(
                data.tag_name.as_str(),
                "mi" | "mo" | "mn" | "ms" | "mtext" | "annotation-xml"
            ),
        };
        !(integration_point && matches!(token, Token::StartTag { .. } | Token::Text { .. }))
    }

    /// [§ 13.2.6.1 Insert a foreign element](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-foreign-element)
    ///
    /// SVG tag and attribute names and MathML attribute names are restored to
    /// their camel-case form.
    /// Self-closing elements are popped at once and remember how they were
    /// written, so the serializer can write `<path/>` back.
    fn insert_foreign_element(
        &mut self,
        name: &str,
        attributes: &[Attribute],
        self_closing: bool,
        namespace: Namespace,
    ) {
        let mut attributes = attributes.to_vec();
        let element_id = match namespace {
            Namespace::Svg => {
                adjust_svg_attributes(&mut attributes);
                self.insert_element(adjust_svg_tag_name(name), &attributes, namespace)
            }
            Namespace::MathMl => {
                adjust_mathml_attributes(&mut attributes);
                self.insert_element(name, &attributes, namespace)
            }
            Namespace::Html => self.insert_element(name, &attributes, namespace),
        };
        if self_closing {
            if let Some(data) = self.tree.as_element_mut(element_id) {
                data.self_closing = true;
            }
            let _ = self.stack_of_open_elements.pop();
        }
    }

    /// [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
    fn handle_foreign_content(&mut self, token: &Token) {
        match token {
            // "Any other character token"
            // "Insert the token's character."
            Token::Text { data } => self.insert_text(data),

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error("DOCTYPE in foreign content"),

            // "A start tag whose tag name is one of: "b", "big", "blockquote",
            // "body", "br", ... "A start tag whose tag name is "font", if the
            // token has any attributes named "color", "face", or "size""
            // "Parse error."
            // "While the current node is not a MathML text integration point,
            // an HTML integration point, or an element in the HTML namespace,
            // pop elements from the stack of open elements."
            // "Reprocess the token according to the rules given in the section
            // corresponding to the current insertion mode in HTML content."
            Token::StartTag {
                name, attributes, ..
            } if FOREIGN_BREAKOUT_TAGS.contains(&name.as_str())
                || (name == "font"
                    && attributes
                        .iter()
                        .any(|a| matches!(a.name.as_str(), "color" | "face" | "size"))) =>
            {
                self.parse_error(format!("<{name}> inside foreign content"));
                while let Some(current) = self.current_node() {
                    let Some(data) = self.tree.as_element(current) else {
                        break;
                    };
                    let is_integration_point = matches!(
                        (data.namespace, data.tag_name.as_str()),
                        (Namespace::Svg, "foreignObject" | "desc" | "title")
                            | (
                                Namespace::MathMl,
                                "mi" | "mo" | "mn" | "ms" | "mtext" | "annotation-xml"
                            )
                    );
                    if data.namespace == Namespace::Html || is_integration_point {
                        break;
                    }
                    let _ = self.stack_of_open_elements.pop();
                }
                self.process_token_in_mode(token);
            }

            // "Any other start tag"
            // "If the adjusted current node is an element in the SVG namespace,
            // and the token's tag name is one of the ones in the first column of
            // the following table, change the tag name to the name given in the
            // corresponding cell in the second column."
            // "Insert a foreign element for the token, with adjusted current
            // node's namespace and false."
            Token::StartTag {
                name,
                self_closing,
                attributes,
            } => {
                let namespace = self
                    .current_node()
                    .and_then(|id| self.tree.as_element(id))
                    .map_or(Namespace::Html, |data| data.namespace);
                self.insert_foreign_element(name, attributes, *self_closing, namespace);
            }

            // "Any other end tag"
            // 1. "Initialize node to be the current node."
            // 2. "If node's tag name, converted to ASCII lowercase, is not the
            //    same as the tag name of the token, then this is a parse error."
            // 3. "Loop: If node is the topmost element in the stack of open
            //    elements, then return."
            // 4. "If node's tag name, converted to ASCII lowercase, is the same
            //    as the tag name of the token, pop elements from the stack of
            //    open elements until node has been popped from the stack, and
            //    then return."
            // 5. "Set node to the previous entry in the stack of open elements."
            // 6. "If node is not an element in the HTML namespace, return to the
            //    step labeled loop."
            // 7. "Otherwise, process the token according to the rules given in
            //    the section corresponding to the current insertion mode in HTML
            //    content."
            Token::EndTag { name } => {
                let mut i = self.stack_of_open_elements.len();
                while i > 1 {
                    i -= 1;
                    let node_id = self.stack_of_open_elements[i];
                    let Some(data) = self.tree.as_element(node_id) else {
                        continue;
                    };
                    if data.namespace == Namespace::Html {
                        self.process_token_in_mode(token);
                        return;
                    }
                    if data.tag_name.eq_ignore_ascii_case(name) {
                        self.stack_of_open_elements.truncate(i);
                        return;
                    }
                }
                self.parse_error(format!("stray </{name}> in foreign content"));
            }

            Token::EndOfFile => self.process_token_in_mode(token),
        }
    }
}
