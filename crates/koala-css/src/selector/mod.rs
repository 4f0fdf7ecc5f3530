//! CSS Selector parsing and matching
//!
//! This module implements the static subset of
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/) an inliner can
//! resolve ahead of time. Selectors that depend on user interaction or that
//! target pseudo-elements still parse, contribute specificity, and never
//! match. Such selectors are reported as not inlinable so their rules can be
//! carried over into a `<style>` block.

mod nth;
mod parser;

use koala_dom::{DomTree, ElementData, NodeId, NodeType};
use strum_macros::EnumString;

pub use nth::Nth;
pub use parser::{SelectorError, parse_selector, parse_selector_list};

/// [§ 5 Elemental selectors](https://www.w3.org/TR/selectors-4/#elemental-selectors)
/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// A simple selector is a single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    /// "A type selector is the name of a document language element type,
    /// and represents an instance of that element type in the document tree."
    ///
    /// Stored lowercased. Examples: `div`, `td`, `h1`
    Type(String),

    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    /// "The universal selector is a single asterisk (*) and represents the
    /// qualified name of any element type."
    Universal,

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    /// "An ID selector is a hash (#, U+0023) immediately followed by the
    /// ID value, which is an identifier."
    Id(String),

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    /// "The class selector is given as a full stop (. U+002E) immediately
    /// followed by an identifier."
    Class(String),

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    ///
    /// Examples: `[href]`, `[type=text]`, `[class~=active]`, `[lang|=en]`,
    /// `[href^=https]`, `[src$=".png"]`, `[data-theme*=dark i]`
    Attribute(AttributeSelector),

    /// [§ 3.5 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
    PseudoClass(PseudoClass),

    /// [§ 3.6 Pseudo-elements](https://www.w3.org/TR/selectors-4/#pseudo-elements)
    ///
    /// `::before`, `::after`, `::first-line` and the legacy single-colon
    /// forms. There is no element to put a style attribute on, so these never
    /// match.
    PseudoElement(String),
}

/// Pseudo-classes, looked up by name ASCII case-insensitively.
///
/// Names that are not listed here (`:hover`, `:focus`, `:visited`, `:is()`,
/// and so on) parse as [`PseudoClass::Dynamic`].
#[derive(Debug, Clone, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum PseudoClass {
    /// [§ 14.1 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
    /// "The :root pseudo-class represents an element that is the root of the document."
    Root,

    /// [§ 14.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
    /// "The :empty pseudo-class represents an element that has no children
    /// except, optionally, document white space characters."
    ///
    /// Browsers still treat any text as content, and so does this matcher.
    Empty,

    /// [§ 14.4.3 :first-child](https://www.w3.org/TR/selectors-4/#the-first-child-pseudo)
    /// "The :first-child pseudo-class represents an element that is first among
    /// its inclusive siblings."
    FirstChild,

    /// [§ 14.4.4 :last-child](https://www.w3.org/TR/selectors-4/#the-last-child-pseudo)
    LastChild,

    /// [§ 14.4.5 :only-child](https://www.w3.org/TR/selectors-4/#the-only-child-pseudo)
    OnlyChild,

    /// [§ 14.5.3 :first-of-type](https://www.w3.org/TR/selectors-4/#the-first-of-type-pseudo)
    FirstOfType,

    /// [§ 14.5.4 :last-of-type](https://www.w3.org/TR/selectors-4/#the-last-of-type-pseudo)
    LastOfType,

    /// [§ 14.5.5 :only-of-type](https://www.w3.org/TR/selectors-4/#the-only-of-type-pseudo)
    OnlyOfType,

    /// [§ 14.4.1 :nth-child()](https://www.w3.org/TR/selectors-4/#the-nth-child-pseudo)
    /// "The :nth-child(An+B) pseudo-class notation represents elements that are
    /// among An+Bth elements from the list composed of their inclusive siblings"
    NthChild(Nth),

    /// [§ 14.4.2 :nth-last-child()](https://www.w3.org/TR/selectors-4/#the-nth-last-child-pseudo)
    NthLastChild(Nth),

    /// [§ 14.5.1 :nth-of-type()](https://www.w3.org/TR/selectors-4/#the-nth-of-type-pseudo)
    NthOfType(Nth),

    /// [§ 14.5.2 :nth-last-of-type()](https://www.w3.org/TR/selectors-4/#the-nth-last-of-type-pseudo)
    NthLastOfType(Nth),

    /// [§ 4.3 :not()](https://www.w3.org/TR/selectors-4/#negation)
    /// "The negation pseudo-class, :not(), is a functional pseudo-class taking
    /// a selector list as an argument. It represents an element that is not
    /// represented by its argument."
    ///
    /// Only compound selectors are accepted as arguments.
    Not(Vec<CompoundSelector>),

    /// [§ 13.3 :enabled](https://www.w3.org/TR/selectors-4/#enableddisabled)
    /// A form control without a `disabled` attribute.
    Enabled,

    /// [§ 13.3 :disabled](https://www.w3.org/TR/selectors-4/#enableddisabled)
    /// A form control with a `disabled` attribute.
    Disabled,

    /// Any other pseudo-class. These depend on user interaction, history, or
    /// features the inliner does not evaluate, and never match.
    #[strum(default)]
    Dynamic(String),
}

/// Form controls that `:enabled` and `:disabled` apply to.
const FORM_CONTROLS: &[&str] = &[
    "button", "fieldset", "input", "optgroup", "option", "select", "textarea",
];

/// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    /// Attribute name, lowercased. Attribute names match ASCII case-insensitively.
    pub name: String,
    /// How `value` is compared.
    pub operator: AttributeOperator,
    /// The value to compare against. Empty for [`AttributeOperator::Exists`].
    pub value: String,
    /// [§ 6.3 Case-sensitivity](https://www.w3.org/TR/selectors-4/#attribute-case)
    /// The `i` flag: "the attribute value ... is to be matched ASCII
    /// case-insensitively".
    pub case_insensitive: bool,
}

/// The operator of an attribute selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOperator {
    /// `[att]` "Represents an element with the att attribute, whatever the value
    /// of the attribute."
    Exists,
    /// `[att=val]` "Represents an element with the att attribute whose value is
    /// exactly 'val'."
    Equals,
    /// `[att~=val]` "a whitespace-separated list of words, one of which is
    /// exactly 'val'."
    Includes,
    /// `[att|=val]` "either being exactly 'val' or beginning with 'val'
    /// immediately followed by '-'."
    DashMatch,
    /// `[att^=val]` "begins with the prefix 'val'."
    Prefix,
    /// `[att$=val]` "ends with the suffix 'val'."
    Suffix,
    /// `[att*=val]` "contains at least one instance of the substring 'val'."
    Substring,
}

impl AttributeSelector {
    /// Check the selector against an element's attributes.
    #[must_use]
    pub fn matches(&self, element: &ElementData) -> bool {
        let Some(actual) = element.get_attribute(&self.name) else {
            return false;
        };
        let (actual, expected) = if self.case_insensitive {
            (actual.to_ascii_lowercase(), self.value.to_ascii_lowercase())
        } else {
            (actual.to_string(), self.value.clone())
        };
        match self.operator {
            AttributeOperator::Exists => true,
            AttributeOperator::Equals => actual == expected,
            // "If 'val' contains whitespace, it will never represent anything
            // (since the words are separated by spaces). Also if 'val' is the
            // empty string, it will never represent anything."
            AttributeOperator::Includes => {
                !expected.is_empty()
                    && !expected.contains(|c: char| c.is_ascii_whitespace())
                    && actual.split_ascii_whitespace().any(|w| w == expected)
            }
            AttributeOperator::DashMatch => {
                actual == expected
                    || actual
                        .strip_prefix(expected.as_str())
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            // "If 'val' is the empty string then the selector does not
            // represent anything."
            AttributeOperator::Prefix => !expected.is_empty() && actual.starts_with(&expected),
            AttributeOperator::Suffix => !expected.is_empty() && actual.ends_with(&expected),
            AttributeOperator::Substring => !expected.is_empty() && actual.contains(&expected),
        }
    }
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous
/// conditions on a single element."
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    /// The list of simple selectors that make up this compound selector.
    pub simple_selectors: Vec<SimpleSelector>,
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
///
/// "A combinator is punctuation that represents a particular kind of
/// relationship between the selectors on either side."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// [§ 16.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators)
    /// "A selector of the form 'A B' represents an element B that is an
    /// arbitrary descendant of some ancestor element A."
    Descendant,

    /// [§ 16.2 Child combinator](https://www.w3.org/TR/selectors-4/#child-combinators)
    /// "A selector of the form 'A > B' represents an element B that is
    /// a direct child of element A."
    Child,

    /// [§ 16.3 Next-sibling combinator](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators)
    /// "A selector of the form 'A + B' represents an element B that
    /// immediately follows element A, where A and B share the same parent."
    NextSibling,

    /// [§ 16.4 Subsequent-sibling combinator](https://www.w3.org/TR/selectors-4/#general-sibling-combinators)
    /// "A selector of the form 'A ~ B' represents an element B that
    /// follows element A (not necessarily immediately), where A and B share the
    /// same parent."
    SubsequentSibling,
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// "A complex selector is a chain of one or more compound selectors separated
/// by combinators."
///
/// Example: `table.body > tr td a.cta`
/// is stored as:
/// ```text
/// subject: [a.cta]
/// combinators: [(Descendant, [td]), (Descendant, [tr]), (Child, [table.body])]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// The rightmost compound selector (the subject of the selector).
    ///
    /// "The elements represented by a complex selector are the elements matched
    /// by the last compound selector in the complex selector."
    pub subject: CompoundSelector,

    /// Chain of (combinator, compound) pairs going left from the subject.
    /// Empty if this is a simple compound selector with no combinators.
    pub combinators: Vec<(Combinator, CompoundSelector)>,
}

/// [§ 17 Calculating Specificity](https://www.w3.org/TR/selectors-4/#specificity-rules)
/// "A selector's specificity is calculated for a given element as follows:
///  - count the number of ID selectors in the selector (= A)
///  - count the number of class selectors, attributes selectors, and pseudo-classes in the selector (= B)
///  - count the number of type selectors and pseudo-elements in the selector (= C)
///
/// Specificities are compared by comparing the three components in order."
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Specificity(pub u32, pub u32, pub u32);

impl Specificity {
    /// Create a new specificity with (A, B, C) components.
    #[must_use]
    pub const fn new(a: u32, b: u32, c: u32) -> Self {
        Self(a, b, c)
    }

    const fn combine(self, other: Self) -> Self {
        Self(self.0 + other.0, self.1 + other.1, self.2 + other.2)
    }
}

/// A parsed CSS selector ready for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSelector {
    /// The selector as written, trimmed.
    pub text: String,
    /// The complex selector (compound selectors with combinators).
    pub complex: ComplexSelector,
    /// The specificity of this selector.
    pub specificity: Specificity,
}

impl ParsedSelector {
    /// Check if this is a simple selector (no combinators).
    #[must_use]
    pub const fn is_simple(&self) -> bool {
        self.complex.combinators.is_empty()
    }

    /// Whether the selector can be resolved against a static tree.
    ///
    /// False when any compound, including `:not()` arguments, uses a
    /// pseudo-element or a dynamic pseudo-class.
    #[must_use]
    pub fn is_inlinable(&self) -> bool {
        self.complex.compounds().all(CompoundSelector::is_static)
    }

    /// [§ 3.1 Selector Matching](https://www.w3.org/TR/selectors-4/#match-a-selector-against-an-element)
    ///
    /// Match a selector against an element with full DOM tree context.
    #[must_use]
    pub fn matches_in_tree(&self, tree: &DomTree, node_id: NodeId) -> bool {
        compound_matches(&self.complex.subject, tree, node_id)
            && chain_matches(&self.complex.combinators, tree, node_id)
    }
}

/// Match `selector` against the element `node` of `tree`.
#[must_use]
pub fn matches(selector: &ParsedSelector, tree: &DomTree, node: NodeId) -> bool {
    selector.matches_in_tree(tree, node)
}

impl ComplexSelector {
    /// Subject first, then each compound further left.
    pub fn compounds(&self) -> impl Iterator<Item = &CompoundSelector> {
        std::iter::once(&self.subject).chain(self.combinators.iter().map(|(_, c)| c))
    }

    /// [§ 17 Calculating Specificity](https://www.w3.org/TR/selectors-4/#specificity-rules)
    ///
    /// Sum of the specificity of every compound in the chain.
    #[must_use]
    pub fn calculate_specificity(&self) -> Specificity {
        self.compounds()
            .map(CompoundSelector::specificity)
            .fold(Specificity::default(), Specificity::combine)
    }
}

impl CompoundSelector {
    /// Specificity of this compound alone.
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        let mut spec = Specificity::default();
        for simple in &self.simple_selectors {
            match simple {
                SimpleSelector::Id(_) => spec.0 += 1,
                // "The specificity of an :is(), :not(), or :has() pseudo-class is
                // replaced by the specificity of the most specific complex selector
                // in its selector list argument."
                SimpleSelector::PseudoClass(PseudoClass::Not(list)) => {
                    let most = list
                        .iter()
                        .map(Self::specificity)
                        .max()
                        .unwrap_or_default();
                    spec = spec.combine(most);
                }
                SimpleSelector::Class(_)
                | SimpleSelector::Attribute(_)
                | SimpleSelector::PseudoClass(_) => spec.1 += 1,
                SimpleSelector::Type(_) | SimpleSelector::PseudoElement(_) => spec.2 += 1,
                // "ignore the universal selector"
                SimpleSelector::Universal => {}
            }
        }
        spec
    }

    /// False for pseudo-elements and dynamic pseudo-classes, at any depth.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.simple_selectors.iter().all(|simple| match simple {
            SimpleSelector::PseudoElement(_)
            | SimpleSelector::PseudoClass(PseudoClass::Dynamic(_)) => false,
            SimpleSelector::PseudoClass(PseudoClass::Not(list)) => list.iter().all(Self::is_static),
            _ => true,
        })
    }
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
///
/// Walk the chain right to left. Descendant and subsequent-sibling
/// combinators try every candidate, so a failure further left retries with
/// the next ancestor or sibling instead of giving up on the first match.
fn chain_matches(chain: &[(Combinator, CompoundSelector)], tree: &DomTree, node: NodeId) -> bool {
    let Some(((combinator, compound), rest)) = chain.split_first() else {
        return true;
    };
    let step = |candidate: NodeId| {
        compound_matches(compound, tree, candidate) && chain_matches(rest, tree, candidate)
    };
    match combinator {
        Combinator::Descendant => tree.ancestors(node).any(step),
        Combinator::Child => tree.parent(node).is_some_and(step),
        Combinator::NextSibling => previous_element_sibling(tree, node).is_some_and(step),
        Combinator::SubsequentSibling => tree
            .preceding_siblings(node)
            .filter(|&s| tree.as_element(s).is_some())
            .any(step),
    }
}

/// Every simple selector in the compound must match the element.
fn compound_matches(compound: &CompoundSelector, tree: &DomTree, node: NodeId) -> bool {
    let Some(element) = tree.as_element(node) else {
        return false;
    };
    compound
        .simple_selectors
        .iter()
        .all(|simple| simple_matches(simple, tree, node, element))
}

fn simple_matches(simple: &SimpleSelector, tree: &DomTree, node: NodeId, element: &ElementData) -> bool {
    match simple {
        // "A type selector written in the style sheet as an identifier represents
        // an element in the document tree with the same qualified name as the identifier."
        SimpleSelector::Type(name) => element.tag_name.eq_ignore_ascii_case(name),
        SimpleSelector::Universal => true,
        SimpleSelector::Id(id) => element.id() == Some(id.as_str()),
        SimpleSelector::Class(class) => element.has_class(class),
        SimpleSelector::Attribute(attr) => attr.matches(element),
        SimpleSelector::PseudoClass(pc) => pseudo_class_matches(pc, tree, node, element),
        SimpleSelector::PseudoElement(_) => false,
    }
}

/// [§ 3.5 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
fn pseudo_class_matches(pc: &PseudoClass, tree: &DomTree, node: NodeId, element: &ElementData) -> bool {
    let same_type = |other: &ElementData| other.tag_name.eq_ignore_ascii_case(&element.tag_name);
    match pc {
        // "In HTML, this is the html element."
        PseudoClass::Root => tree.document_element() == Some(node),

        // Comments do not count as content, any text does.
        PseudoClass::Empty => tree.children(node).iter().all(|&c| {
            matches!(
                tree.get(c).map(|n| &n.node_type),
                Some(NodeType::Comment(_))
            )
        }),

        PseudoClass::FirstChild => element_position(tree.preceding_siblings(node), tree, |_| true) == 1,
        PseudoClass::LastChild => element_position(tree.following_siblings(node), tree, |_| true) == 1,
        PseudoClass::OnlyChild => {
            element_position(tree.preceding_siblings(node), tree, |_| true) == 1
                && element_position(tree.following_siblings(node), tree, |_| true) == 1
        }
        PseudoClass::FirstOfType => element_position(tree.preceding_siblings(node), tree, same_type) == 1,
        PseudoClass::LastOfType => element_position(tree.following_siblings(node), tree, same_type) == 1,
        PseudoClass::OnlyOfType => {
            element_position(tree.preceding_siblings(node), tree, same_type) == 1
                && element_position(tree.following_siblings(node), tree, same_type) == 1
        }
        PseudoClass::NthChild(nth) => {
            nth.matches(element_position(tree.preceding_siblings(node), tree, |_| true))
        }
        PseudoClass::NthLastChild(nth) => {
            nth.matches(element_position(tree.following_siblings(node), tree, |_| true))
        }
        PseudoClass::NthOfType(nth) => {
            nth.matches(element_position(tree.preceding_siblings(node), tree, same_type))
        }
        PseudoClass::NthLastOfType(nth) => {
            nth.matches(element_position(tree.following_siblings(node), tree, same_type))
        }

        PseudoClass::Not(list) => !list.iter().any(|c| compound_matches(c, tree, node)),

        PseudoClass::Enabled => {
            FORM_CONTROLS.contains(&element.tag_name.as_str()) && element.get_attribute("disabled").is_none()
        }
        PseudoClass::Disabled => {
            FORM_CONTROLS.contains(&element.tag_name.as_str()) && element.get_attribute("disabled").is_some()
        }

        PseudoClass::Dynamic(_) => false,
    }
}

/// 1-based position of an element among the siblings that pass `filter`,
/// counted from the side `siblings` walks towards.
fn element_position<'t>(
    siblings: impl Iterator<Item = NodeId>,
    tree: &'t DomTree,
    filter: impl Fn(&'t ElementData) -> bool,
) -> usize {
    1 + siblings
        .filter_map(|s| tree.as_element(s))
        .filter(|&e| filter(e))
        .count()
}

/// [§ 16.3 Next-sibling combinator](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators)
///
/// Text and comment nodes are skipped: "non-element nodes (e.g. text between
/// elements) are ignored when considering the adjacency of elements."
fn previous_element_sibling(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    tree.preceding_siblings(node)
        .find(|&sibling| tree.as_element(sibling).is_some())
}
