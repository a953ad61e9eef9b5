//! Extraction engine.
//!
//! ## Module Structure
//!
//! - `ast`: owned Java syntax model the rest of the engine works on
//! - `parsers`: tree-sitter based Java parser producing `ast`
//! - `rules`: translatable method and annotation rules
//! - `eval`: constant expression evaluator
//! - `scan`: call/annotation scanner
//! - `store`: deduplicating message store
//! - `sync`: reconciliation with the previous catalog
//! - `file_scanner`: source file discovery
//! - `context`: the end-to-end pipeline

pub mod ast;
pub mod context;
pub mod error;
pub mod eval;
pub mod file_scanner;
pub mod parsers;
pub mod rules;
pub mod scan;
pub mod store;
pub mod sync;

pub use context::{ExtractContext, ExtractOutcome};
pub use error::ExtractError;
