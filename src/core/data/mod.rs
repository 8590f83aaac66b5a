//! Core data types used across the extraction pipeline.
//!
//! ## Module Structure
//!
//! - `sanitized`: The hashable JSX tree (`SanitizedValue`)
//! - `source`: Source code location types (`SourceLocation`)
//! - `update`: Translation units and their metadata

pub mod sanitized;
pub mod source;
pub mod update;

pub use sanitized::{SanitizedElement, SanitizedValue};
pub use source::{SourceLocation, source_line_at};
pub use update::{DataFormat, Metadata, TranslationUnit, UnitSource, sha256_hex};
