//! Error types for sfcgraph operations.
//!
//! This module provides the main error type [`SfcGraphError`] which wraps
//! the conditions that abort a conversion as a whole. Failures confined to
//! a single sequence are reported per sequence instead, see
//! [`SequenceFailure`](crate::SequenceFailure).

use std::io;

use thiserror::Error;

use sfcgraph_parser::error::ParseError;

/// The main error type for sfcgraph operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the source text next to the structured
/// diagnostics so that callers can render them with source excerpts.
#[derive(Debug, Error)]
pub enum SfcGraphError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Export error: {0}")]
    Export(#[from] crate::export::Error),
}

impl SfcGraphError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
