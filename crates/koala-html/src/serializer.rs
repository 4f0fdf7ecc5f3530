//! HTML serialization.
//!
//! [§ 13.3 Serializing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments)
//!
//! Text and comments are written exactly as they were parsed. The tokenizer
//! never decodes character references in text, so writing the raw data back
//! reproduces the source. Attribute values were decoded and are escaped again
//! here.

use std::fmt;
use std::io;

use koala_dom::{DoctypeData, DomTree, ElementData, Namespace, NodeId, NodeType};

use crate::parser::VOID_ELEMENTS;

/// Serialize the whole document.
#[must_use]
pub fn serialize(tree: &DomTree) -> String {
    serialize_node(tree, tree.root())
}

/// Serialize a node and its subtree. Serializing the document node writes
/// only its children.
#[must_use]
pub fn serialize_node(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_node(tree, id, &mut out);
    out
}

/// Serialize the whole document into `writer`.
///
/// # Errors
///
/// Returns the first error reported by `writer`.
pub fn serialize_to<W: io::Write>(tree: &DomTree, writer: &mut W) -> io::Result<()> {
    let mut adapter = IoAdapter {
        inner: writer,
        error: None,
    };
    match write_node(tree, tree.root(), &mut adapter) {
        Ok(()) => Ok(()),
        Err(fmt::Error) => Err(adapter
            .error
            .unwrap_or_else(|| io::Error::other("serializer formatting error"))),
    }
}

/// Bridges [`fmt::Write`] onto an [`io::Write`], keeping the real error.
struct IoAdapter<'a, W> {
    inner: &'a mut W,
    error: Option<io::Error>,
}

impl<W: io::Write> fmt::Write for IoAdapter<'_, W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.inner.write_all(s.as_bytes()).map_err(|err| {
            self.error = Some(err);
            fmt::Error
        })
    }
}

fn write_node<W: fmt::Write>(tree: &DomTree, id: NodeId, out: &mut W) -> fmt::Result {
    let Some(node) = tree.get(id) else {
        return Ok(());
    };
    match &node.node_type {
        NodeType::Document => write_children(tree, id, out),
        NodeType::Doctype(doctype) => write_doctype(doctype, out),
        NodeType::Element(data) => write_element(tree, id, data, out),
        // "If current node is a Text node ... Otherwise, append the value of
        // current node's data IDL attribute, escaped as described below."
        //
        // The data was never unescaped, so it goes out as is.
        NodeType::Text(text) => out.write_str(text),
        // "If current node is a Comment: Append the literal string "<!--",
        // followed by the value of current node's data IDL attribute, followed
        // by the literal string "-->"."
        NodeType::Comment(data) => write!(out, "<!--{data}-->"),
    }
}

fn write_children<W: fmt::Write>(tree: &DomTree, id: NodeId, out: &mut W) -> fmt::Result {
    for &child in tree.children(id) {
        write_node(tree, child, out)?;
    }
    Ok(())
}

/// "If current node is a DocumentType: Append the literal string "<!DOCTYPE",
/// followed by a space, followed by the value of current node's name IDL
/// attribute, followed by the literal string ">"."
///
/// Public and system identifiers are kept so legacy email doctypes survive.
fn write_doctype<W: fmt::Write>(doctype: &DoctypeData, out: &mut W) -> fmt::Result {
    out.write_str("<!DOCTYPE")?;
    if !doctype.name.is_empty() {
        write!(out, " {}", doctype.name)?;
    }
    match (&doctype.public_id, &doctype.system_id) {
        (Some(public_id), Some(system_id)) => {
            out.write_str(" PUBLIC ")?;
            write_quoted_identifier(public_id, out)?;
            out.write_char(' ')?;
            write_quoted_identifier(system_id, out)?;
        }
        (Some(public_id), None) => {
            out.write_str(" PUBLIC ")?;
            write_quoted_identifier(public_id, out)?;
        }
        (None, Some(system_id)) => {
            out.write_str(" SYSTEM ")?;
            write_quoted_identifier(system_id, out)?;
        }
        (None, None) => {}
    }
    out.write_str(">")
}

/// Identifiers cannot be escaped, so one holding `"` is single-quoted.
fn write_quoted_identifier<W: fmt::Write>(id: &str, out: &mut W) -> fmt::Result {
    let quote = if id.contains('"') { '\'' } else { '"' };
    write!(out, "{quote}{id}{quote}")
}

/// "If current node is an Element: ... Append a U+003C LESS-THAN SIGN
/// character (<), followed by tagname. For each attribute that the element
/// has, append a U+0020 SPACE character, the attribute's serialized name, a
/// U+003D EQUALS SIGN character (=), a U+0022 QUOTATION MARK character ("),
/// the attribute's value, escaped as described below in attribute mode, and a
/// second U+0022 QUOTATION MARK character (")."
///
/// "If current node serializes as void, then continue on to the next child
/// node at this point."
fn write_element<W: fmt::Write>(
    tree: &DomTree,
    id: NodeId,
    data: &ElementData,
    out: &mut W,
) -> fmt::Result {
    write!(out, "<{}", data.tag_name)?;
    for attr in &data.attrs {
        write!(out, " {}=\"", attr.name)?;
        escape_attribute_value(&attr.value, out)?;
        out.write_char('"')?;
    }

    let is_foreign = data.namespace != Namespace::Html;
    if is_foreign && data.self_closing && tree.children(id).is_empty() {
        return out.write_str("/>");
    }
    out.write_char('>')?;
    if !is_foreign && VOID_ELEMENTS.contains(&data.tag_name.as_str()) {
        return Ok(());
    }

    write_children(tree, id, out)?;
    write!(out, "</{}>", data.tag_name)
}

/// [§ 13.3 Escaping a string](https://html.spec.whatwg.org/multipage/parsing.html#escapingString)
///
/// "Replace any occurrence of the "&" character by the string "&amp;"."
/// "Replace any occurrences of the U+00A0 NO-BREAK SPACE character by the
/// string "&nbsp;"."
/// "If the algorithm was invoked in the attribute mode, then replace any
/// occurrences of the """ character by the string "&quot;"."
fn escape_attribute_value<W: fmt::Write>(value: &str, out: &mut W) -> fmt::Result {
    for c in value.chars() {
        match c {
            '&' => out.write_str("&amp;")?,
            '"' => out.write_str("&quot;")?,
            '\u{00A0}' => out.write_str("&nbsp;")?,
            _ => out.write_char(c)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use koala_dom::Attributes;

    #[test]
    fn test_escape_attribute_value() {
        let mut out = String::new();
        escape_attribute_value("a & \"b\"\u{00A0}<c>", &mut out).unwrap();
        assert_eq!(out, "a &amp; &quot;b&quot;&nbsp;<c>");
    }

    #[test]
    fn test_void_and_foreign_elements() {
        let mut tree = DomTree::new();
        let br = tree.alloc(NodeType::Element(ElementData::new("br", Attributes::new())));
        tree.append_child(NodeId::ROOT, br);
        let mut path = ElementData::new("path", Attributes::new());
        path.namespace = Namespace::Svg;
        path.self_closing = true;
        let path = tree.alloc(NodeType::Element(path));
        tree.append_child(NodeId::ROOT, path);
        assert_eq!(serialize(&tree), "<br><path/>");
    }

    #[test]
    fn test_doctype_identifiers() {
        let mut out = String::new();
        let doctype = DoctypeData {
            name: "html".to_string(),
            public_id: Some("-//W3C//DTD XHTML 1.0 Transitional//EN".to_string()),
            system_id: Some("http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd".to_string()),
        };
        write_doctype(&doctype, &mut out).unwrap();
        assert_eq!(
            out,
            "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\" \
             \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd\">"
        );
    }

    #[test]
    fn test_serialize_to_reports_writer_errors() {
        struct Failing;
        impl io::Write for Failing {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        let mut tree = DomTree::new();
        let text = tree.alloc(NodeType::Text("hello".to_string()));
        tree.append_child(NodeId::ROOT, text);
        let err = serialize_to(&tree, &mut Failing).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
