//! Removing class names that only served inlined rules.

use std::collections::HashSet;

use koala_css::{Stylesheet, referenced_classes};
use koala_dom::DomTree;

/// Class names that appear in the inlinable selectors of `stylesheet`.
#[must_use]
pub fn inlined_classes(stylesheet: &Stylesheet) -> HashSet<String> {
    stylesheet
        .style_rules()
        .flat_map(|rule| rule.inlinable_selectors())
        .flat_map(|selector| referenced_classes(&selector.text))
        .collect()
}

/// Remove every class in `inlined` that `remaining_css` does not refer to.
///
/// `remaining_css` is the CSS that stays in the document after inlining.
/// A `class` attribute left with no tokens is removed.
#[allow(clippy::implicit_hasher)]
pub fn strip_redundant_classes(tree: &mut DomTree, inlined: &HashSet<String>, remaining_css: &str) {
    let still_used = referenced_classes(remaining_css);
    let redundant: HashSet<&str> = inlined
        .iter()
        .filter(|class| !still_used.contains(*class))
        .map(String::as_str)
        .collect();
    if redundant.is_empty() {
        return;
    }

    let nodes: Vec<_> = tree.elements().collect();
    let mut stripped = 0usize;
    for node in nodes {
        let Some(element) = tree.as_element_mut(node) else {
            continue;
        };
        let Some(class) = element.get_attribute("class") else {
            continue;
        };
        let kept: Vec<&str> = class
            .split_ascii_whitespace()
            .filter(|token| !redundant.contains(token))
            .collect();
        if kept.len() == class.split_ascii_whitespace().count() {
            continue;
        }
        stripped += 1;
        if kept.is_empty() {
            let _ = element.remove_attribute("class");
        } else {
            let joined = kept.join(" ");
            let _ = element.set_attribute("class", joined);
        }
    }
    tracing::debug!(elements = stripped, "stripped redundant classes");
}

#[cfg(test)]
mod tests {
    use super::*;
    use koala_css::CSSParser;

    #[test]
    fn test_inlined_classes_skip_dynamic_selectors() {
        let stylesheet =
            CSSParser::new(".a, .b:hover { x: y } div.c > .d { x: y }").parse_stylesheet();
        let mut classes: Vec<_> = inlined_classes(&stylesheet).into_iter().collect();
        classes.sort();
        assert_eq!(classes, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_strip_keeps_classes_still_referenced() {
        let (mut tree, _) =
            koala_html::parse_document(r#"<p class="a  b other">x</p><p class="a">y</p>"#);
        let inlined: HashSet<String> = ["a".to_string(), "b".to_string()].into_iter().collect();
        strip_redundant_classes(&mut tree, &inlined, ".b:hover { color: red }");
        let classes: Vec<Option<String>> = tree
            .elements()
            .filter_map(|id| tree.as_element(id))
            .filter(|e| e.is("p"))
            .map(|e| e.get_attribute("class").map(str::to_string))
            .collect();
        assert_eq!(classes, vec![Some("b other".to_string()), None]);
    }
}
