//! Common utilities for the Koala CSS inliner.
//!
//! This crate provides shared infrastructure used by all inliner components:
//! - **Diagnostics** - per-call collection of recoverable parse warnings
//! - **URL resolution** - joining relative references against a base URL
//! - **Networking** - `data:` URL decoding and blocking HTTP fetches for
//!   linked stylesheets

pub mod diagnostics;
pub mod net;
pub mod url;

pub use diagnostics::{Component, Diagnostics, PartialParseWarning};
