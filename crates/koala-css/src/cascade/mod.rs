//! CSS Cascade
//!
//! This module resolves which stylesheet declarations apply to each element
//! per [CSS Cascading and Inheritance Level 4](https://www.w3.org/TR/css-cascade-4/).
//!
//! Values are never computed or inherited. The result for an element is the
//! list of declared values that apply to it, in the order a later entry
//! overrides an earlier one.

mod index;

use std::collections::BTreeMap;

use koala_dom::{DomTree, NodeId};

use crate::parser::{Declaration, Stylesheet};
use crate::selector::Specificity;

pub use index::{IndexedSelector, RuleIndex};

/// How candidate selectors are found for each element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchStrategy {
    /// Look selectors up in a [`RuleIndex`].
    #[default]
    Indexed,
    /// Test every selector against every element.
    BruteForce,
}

/// [§ 6 Cascading](https://www.w3.org/TR/css-cascade-4/#cascading)
///
/// A declaration that applies to an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult<'s> {
    /// The declaration.
    pub declaration: &'s Declaration,
    /// The highest specificity among the rule's selectors that matched.
    pub specificity: Specificity,
    /// Position of the declaration in the stylesheet.
    pub source_index: usize,
}

/// The declarations that apply to one element, split by importance.
///
/// [§ 6.4 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
/// Each tier is sorted by specificity, then source order, so a later entry
/// for a property wins over an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedStyle<'s> {
    /// Declarations without `!important`.
    pub normal: Vec<MatchResult<'s>>,
    /// `!important` declarations.
    pub important: Vec<MatchResult<'s>>,
}

impl ResolvedStyle<'_> {
    /// True if no declaration applies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.normal.is_empty() && self.important.is_empty()
    }
}

/// Resolved styles for every element that some rule matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeResult<'s> {
    styles: BTreeMap<NodeId, ResolvedStyle<'s>>,
}

impl<'s> CascadeResult<'s> {
    /// The resolved style of `node`, if any rule matched it.
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<&ResolvedStyle<'s>> {
        self.styles.get(&node)
    }

    /// Resolved elements in node order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &ResolvedStyle<'s>)> {
        self.styles.iter().map(|(&id, style)| (id, style))
    }

    /// Number of elements with a resolved style.
    #[must_use]
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// True if no element matched any rule.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

/// Resolve the cascade using the rule index.
#[must_use]
pub fn resolve<'s>(tree: &DomTree, stylesheet: &'s Stylesheet) -> CascadeResult<'s> {
    resolve_with(tree, stylesheet, MatchStrategy::Indexed)
}

/// [§ 6 Cascading](https://www.w3.org/TR/css-cascade-4/#cascading)
/// "The cascade takes an unordered list of declared values for a given property
/// on a given element, sorts them by their declaration's precedence..."
///
/// Only selectors that can be resolved statically take part. A rule whose
/// selectors match an element more than once applies once, with the highest
/// matching specificity.
#[must_use]
pub fn resolve_with<'s>(
    tree: &DomTree,
    stylesheet: &'s Stylesheet,
    strategy: MatchStrategy,
) -> CascadeResult<'s> {
    let index = match strategy {
        MatchStrategy::Indexed => RuleIndex::new(stylesheet),
        MatchStrategy::BruteForce => RuleIndex::brute_force(stylesheet),
    };
    let mut styles = BTreeMap::new();

    for node in tree.elements() {
        let Some(element) = tree.as_element(node) else {
            continue;
        };

        // rule index -> (specificity, entry)
        let mut matched: BTreeMap<usize, (Specificity, &IndexedSelector<'s>)> = BTreeMap::new();
        for entry in index.candidates(element) {
            if !entry.selector.matches_in_tree(tree, node) {
                continue;
            }
            let specificity = entry.selector.specificity;
            let _ = matched
                .entry(entry.rule_index)
                .and_modify(|(best, _)| *best = (*best).max(specificity))
                .or_insert((specificity, entry));
        }

        let mut resolved = ResolvedStyle::default();
        for (specificity, entry) in matched.into_values() {
            for (offset, declaration) in entry.rule.declarations.iter().enumerate() {
                let result = MatchResult {
                    declaration,
                    specificity,
                    source_index: entry.first_declaration + offset,
                };
                if declaration.important {
                    resolved.important.push(result);
                } else {
                    resolved.normal.push(result);
                }
            }
        }
        if resolved.is_empty() {
            continue;
        }

        // [§ 6.4.3 Specificity](https://www.w3.org/TR/css-cascade-4/#cascade-specificity)
        // [§ 6.4.4 Order of Appearance](https://www.w3.org/TR/css-cascade-4/#cascade-order)
        // "The last declaration in document order wins."
        resolved.normal.sort_by_key(|m| (m.specificity, m.source_index));
        resolved.important.sort_by_key(|m| (m.specificity, m.source_index));
        let _ = styles.insert(node, resolved);
    }

    tracing::debug!(
        selectors = index.len(),
        elements = styles.len(),
        ?strategy,
        "resolved cascade"
    );
    CascadeResult { styles }
}
