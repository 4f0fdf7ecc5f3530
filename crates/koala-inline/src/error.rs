//! Errors surfaced to callers.
//!
//! Malformed HTML and CSS never fail an inlining call; those problems are
//! reported as warnings. Only undecodable input, a failed stylesheet load
//! and write errors abort, and then no output is produced.

use std::{io, str::Utf8Error};

use koala_common::net::NetError;
use thiserror::Error;

/// Failure of a whole inlining call.
#[derive(Debug, Error)]
pub enum InlineError {
    /// The input bytes are not valid UTF-8.
    #[error("input is not valid UTF-8: {0}")]
    Decode(#[from] Utf8Error),
    /// A linked stylesheet could not be loaded.
    #[error("failed to load stylesheet {href}: {source}")]
    RemoteStylesheet {
        /// The resolved address that was requested.
        href: String,
        /// Why loading failed.
        source: LoadError,
    },
    /// Writing the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Failure reported by a [`crate::StylesheetLoader`].
#[derive(Debug, Error)]
pub enum LoadError {
    /// Fetching or decoding the resource failed.
    #[error(transparent)]
    Net(#[from] NetError),
    /// The loader has no stylesheet for this address.
    #[error("stylesheet not available: {0}")]
    Unavailable(String),
}
