//! Source parsers.
//!
//! - `java`: Java source parser (tree-sitter-java, lowered into `core::ast`)

pub mod java;
