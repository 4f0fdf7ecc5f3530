//! Writing resolved declarations into `style` attributes.
//!
//! [§ 6.2 Cascade Origins](https://www.w3.org/TR/css-cascade-4/#cascading-origins)
//!
//! Declarations from the element's own `style` attribute beat every normal
//! stylesheet declaration and lose to every stylesheet `!important` one,
//! unless they are `!important` themselves. The merged attribute lists the
//! winning value of each property once, at the position where the property
//! first appeared.

use std::collections::HashMap;

use koala_common::Diagnostics;
use koala_css::{CSSParser, CascadeResult, Declaration, MatchResult, rewrite_urls};
use koala_dom::{DomTree, NodeId};
use url::Url;

/// Ordered property map where a later write replaces the value in place.
#[derive(Debug, Default)]
struct StyleMap {
    entries: Vec<(String, String, bool)>,
    positions: HashMap<String, usize>,
}

impl StyleMap {
    fn set(&mut self, name: &str, value: String, important: bool) {
        match self.positions.get(name) {
            Some(&i) => self.entries[i] = (name.to_string(), value, important),
            None => {
                let _ = self.positions.insert(name.to_string(), self.entries.len());
                self.entries.push((name.to_string(), value, important));
            }
        }
    }

    /// `name: value;` pairs separated by single spaces.
    fn serialize(&self) -> String {
        self.entries
            .iter()
            .map(|(name, value, important)| {
                if *important {
                    format!("{name}: {value} !important;")
                } else {
                    format!("{name}: {value};")
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Compute the new `style` attribute of every element the cascade matched.
///
/// Reads the tree only. The caller applies the result with
/// [`apply_styles`] once the cascade's borrows are gone.
#[must_use]
pub fn merged_styles(
    tree: &DomTree,
    cascade: &CascadeResult<'_>,
    base_url: Option<&Url>,
    diagnostics: &mut Diagnostics,
) -> Vec<(NodeId, String)> {
    let mut updates = Vec::with_capacity(cascade.len());
    for (node, resolved) in cascade.iter() {
        let Some(element) = tree.as_element(node) else {
            continue;
        };
        let inline = element
            .get_attribute("style")
            .map(|style| {
                let mut parser = CSSParser::new(style);
                let declarations = parser.parse_style_attribute();
                diagnostics.extend(parser.into_diagnostics());
                declarations
            })
            .unwrap_or_default();

        let stylesheet_value = |m: &MatchResult<'_>| match base_url {
            Some(base) => rewrite_urls(&m.declaration.value, base),
            None => m.declaration.value.clone(),
        };

        let mut map = StyleMap::default();
        for m in &resolved.normal {
            map.set(&m.declaration.name, stylesheet_value(m), false);
        }
        apply_inline(&mut map, &inline, false);
        for m in &resolved.important {
            map.set(&m.declaration.name, stylesheet_value(m), true);
        }
        apply_inline(&mut map, &inline, true);

        updates.push((node, map.serialize()));
    }
    updates
}

fn apply_inline(map: &mut StyleMap, inline: &[Declaration], important: bool) {
    for declaration in inline.iter().filter(|d| d.important == important) {
        map.set(&declaration.name, declaration.value.clone(), important);
    }
}

/// Write computed `style` attributes into the tree.
pub fn apply_styles(tree: &mut DomTree, updates: Vec<(NodeId, String)>) {
    for (node, style) in updates {
        if let Some(element) = tree.as_element_mut(node) {
            let _ = element.set_attribute("style", style);
        }
    }
}
