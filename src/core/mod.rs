//! Extraction engine.
//!
//! ## Module Structure
//!
//! - `context`: `ExtractContext`, configuration plus parallel per-file extraction
//! - `file_scanner`: include/ignore scanning of source files
//! - `parsers`: swc TSX parsing
//! - `collect`: imports, component aliases and lexical scopes of a file
//! - `evaluate`: static expression evaluation
//! - `icu`: ICU MessageFormat parser and variable codec
//! - `extract`: tree building, `<Static>` resolution and unit emission
//! - `data`: locations, sanitized trees and translation units

pub mod collect;
pub mod context;
pub mod data;
pub mod evaluate;
pub mod extract;
pub mod file_scanner;
pub mod icu;
pub mod parsers;

pub use context::{ExtractContext, ExtractResult};
pub use data::{DataFormat, Metadata, SanitizedValue, SourceLocation, TranslationUnit, UnitSource};
pub use extract::{ExtractOptions, FileExtraction, StaticResolver, extract_source};
