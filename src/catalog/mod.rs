//! gettext PO catalog reading and writing.
//!
//! - `reader`: parses a previously written catalog back into a positioned store
//! - `writer`: renders a store with its header and encodes it to disk

use std::path::PathBuf;

use encoding_rs::Encoding;
use thiserror::Error;

mod escape;
mod reader;
mod writer;

pub use reader::{parse_catalog, read_catalog};
pub use writer::{CatalogHeader, render_catalog, write_catalog};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Unknown encoding label '{0}'")]
    UnknownEncoding(String),

    #[error("{}:{line}: {message}", path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{} is not valid {encoding}", path.display())]
    Undecodable {
        path: PathBuf,
        encoding: &'static str,
    },

    #[error("Catalog for {} contains text that cannot be encoded as {encoding}", path.display())]
    Unencodable {
        path: PathBuf,
        encoding: &'static str,
    },

    #[error("Failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Look up a WHATWG encoding label such as `UTF-8` or `latin1`.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding, CatalogError> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| CatalogError::UnknownEncoding(label.to_string()))
}
