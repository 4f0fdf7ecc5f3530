//! Recoverable parse diagnostics.
//!
//! Parsers in the inliner never abort on malformed markup or CSS. Instead they
//! skip the offending construct and record a [`PartialParseWarning`] in a
//! [`Diagnostics`] list owned by the current inlining call. Every warning is
//! also emitted as a `tracing` event so callers can observe them without
//! holding on to the list.
//!
//! Deduplication is per list: the same message from the same component is
//! recorded once. There is no process-wide state.

use std::collections::HashSet;
use std::fmt;

use strum_macros::Display;

/// The pipeline stage that produced a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Component {
    /// HTML tokenizer or tree builder.
    #[strum(serialize = "HTML")]
    Html,
    /// CSS tokenizer or parser.
    #[strum(serialize = "CSS")]
    Css,
    /// Selector parsing.
    #[strum(serialize = "Selector")]
    Selector,
    /// Stylesheet collection and merging.
    #[strum(serialize = "Inliner")]
    Inliner,
}

/// A rule, declaration or token that was skipped during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialParseWarning {
    /// Where the warning came from.
    pub component: Component,
    /// Human readable description.
    pub message: String,
}

impl fmt::Display for PartialParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.component, self.message)
    }
}

/// Ordered, deduplicated collection of warnings for one inlining call.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    warnings: Vec<PartialParseWarning>,
    seen: HashSet<(Component, String)>,
}

impl Diagnostics {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning unless an identical one was already recorded.
    pub fn warn(&mut self, component: Component, message: impl Into<String>) {
        let message = message.into();
        if !self.seen.insert((component, message.clone())) {
            return;
        }
        tracing::debug!(%component, %message, "partial parse warning");
        self.warnings.push(PartialParseWarning { component, message });
    }

    /// Append every warning from `other`, keeping deduplication.
    pub fn extend(&mut self, other: Self) {
        for warning in other.warnings {
            self.warn(warning.component, warning.message);
        }
    }

    /// Iterate warnings in the order they were recorded.
    pub fn iter(&self) -> impl Iterator<Item = &PartialParseWarning> {
        self.warnings.iter()
    }

    /// Number of recorded warnings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    /// True when nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Consume the list, returning the warnings.
    #[must_use]
    pub fn into_vec(self) -> Vec<PartialParseWarning> {
        self.warnings
    }
}
