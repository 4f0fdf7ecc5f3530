//! Rule index.
//!
//! Every selector is filed under one cheap key taken from its subject
//! compound, so an element only has to be tested against the selectors that
//! could possibly match it. Filing is conservative: a selector is only ever
//! filed under a condition its subject requires.

use std::collections::HashMap;

use koala_dom::ElementData;

use crate::parser::{StyleRule, Stylesheet};
use crate::selector::{CompoundSelector, ParsedSelector, SimpleSelector};

/// One inlinable selector of one style rule.
#[derive(Debug, Clone, Copy)]
pub struct IndexedSelector<'s> {
    /// The selector.
    pub selector: &'s ParsedSelector,
    /// The rule the selector belongs to.
    pub rule: &'s StyleRule,
    /// Position of the rule among the stylesheet's style rules.
    pub rule_index: usize,
    /// Source position of the rule's first declaration, counted over every
    /// declaration of every style rule.
    pub first_declaration: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BucketKey<'s> {
    Id(&'s str),
    Class(&'s str),
    Tag(&'s str),
    Universal,
}

/// The key a compound is filed under: its id, else its first class, else
/// its type, else nothing.
fn bucket_key(compound: &CompoundSelector) -> BucketKey<'_> {
    let simples = &compound.simple_selectors;
    simples
        .iter()
        .find_map(|s| match s {
            SimpleSelector::Id(id) => Some(BucketKey::Id(id)),
            _ => None,
        })
        .or_else(|| {
            simples.iter().find_map(|s| match s {
                SimpleSelector::Class(class) => Some(BucketKey::Class(class)),
                _ => None,
            })
        })
        .or_else(|| {
            simples.iter().find_map(|s| match s {
                SimpleSelector::Type(tag) => Some(BucketKey::Tag(tag)),
                _ => None,
            })
        })
        .unwrap_or(BucketKey::Universal)
}

/// Selectors bucketed by id, class and tag of their subject compound.
#[derive(Debug, Default)]
pub struct RuleIndex<'s> {
    entries: Vec<IndexedSelector<'s>>,
    by_id: HashMap<&'s str, Vec<usize>>,
    by_class: HashMap<&'s str, Vec<usize>>,
    by_tag: HashMap<&'s str, Vec<usize>>,
    universal: Vec<usize>,
}

impl<'s> RuleIndex<'s> {
    /// Index every inlinable selector of `stylesheet`.
    #[must_use]
    pub fn new(stylesheet: &'s Stylesheet) -> Self {
        Self::build(stylesheet, true)
    }

    /// An index that files every selector as universal, so every element is
    /// tested against every selector.
    #[must_use]
    pub fn brute_force(stylesheet: &'s Stylesheet) -> Self {
        Self::build(stylesheet, false)
    }

    fn build(stylesheet: &'s Stylesheet, bucketed: bool) -> Self {
        let mut index = Self::default();
        let mut first_declaration = 0;

        for (rule_index, rule) in stylesheet.style_rules().enumerate() {
            for selector in rule.inlinable_selectors() {
                let entry = index.entries.len();
                index.entries.push(IndexedSelector {
                    selector,
                    rule,
                    rule_index,
                    first_declaration,
                });
                let key = if bucketed {
                    bucket_key(&selector.complex.subject)
                } else {
                    BucketKey::Universal
                };
                match key {
                    BucketKey::Id(id) => index.by_id.entry(id).or_default().push(entry),
                    BucketKey::Class(class) => index.by_class.entry(class).or_default().push(entry),
                    BucketKey::Tag(tag) => index.by_tag.entry(tag).or_default().push(entry),
                    BucketKey::Universal => index.universal.push(entry),
                }
            }
            first_declaration += rule.declarations.len();
        }

        index
    }

    /// Number of indexed selectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Selectors that might match `element`, each once, in source order.
    pub fn candidates(&self, element: &ElementData) -> impl Iterator<Item = &IndexedSelector<'s>> {
        let mut found = self.universal.clone();
        if let Some(id) = element.id()
            && let Some(entries) = self.by_id.get(id)
        {
            found.extend(entries);
        }
        for class in element.classes() {
            if let Some(entries) = self.by_class.get(class) {
                found.extend(entries);
            }
        }
        if let Some(entries) = self.by_tag.get(element.tag_name.to_ascii_lowercase().as_str()) {
            found.extend(entries);
        }
        found.sort_unstable();
        found.dedup();
        found.into_iter().filter_map(|i| self.entries.get(i))
    }
}
