use std::path::PathBuf;

use thiserror::Error;

use crate::core::{eval::EvalError, rules::RuleError};

/// Fatal errors of an extraction run. Any of them aborts before a catalog is written.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to set language for parser: {0}")]
    LanguageSetup(#[from] tree_sitter::LanguageError),

    #[error("Failed to parse {path}")]
    ParseFailed { path: String },

    #[error("{path}:{line}: syntax error")]
    Syntax { path: String, line: usize },

    #[error("Source root does not exist: {}", .0.display())]
    MissingSourceRoot(PathBuf),

    #[error("Failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Evaluation {
        path: String,
        #[source]
        source: EvalError,
    },

    #[error("Invalid extraction rule: {0}")]
    Rules(#[from] RuleError),
}
