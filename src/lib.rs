//! glotpot - gettext message extraction for Java
//!
//! glotpot is a CLI tool and library that scans Java sources for translatable
//! calls and annotations, folds their compile-time constant text, and keeps a
//! gettext PO template in sync across runs.
//!
//! ## Module Structure
//!
//! - `catalog`: PO catalog reader and writer
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and parsing
//! - `core`: Extraction engine (parser, evaluator, scanner, store, synchronizer)
//! - `utils`: Shared utility functions

pub mod catalog;
pub mod cli;
pub mod config;
pub mod core;
pub mod utils;
