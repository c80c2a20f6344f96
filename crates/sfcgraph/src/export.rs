//! Diagram export.
//!
//! The [`drawio`] module builds draw.io documents from laid-out sequences
//! and writes them to disk.

pub mod drawio;

use std::{io, path::PathBuf};

use quick_xml::errors::serialize::SeError;
use thiserror::Error;

/// Errors raised while producing an output file.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to serialize diagram: {0}")]
    Serialize(#[from] SeError),

    #[error("failed to write `{}`: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
