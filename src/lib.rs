//! jsxlate - translation unit extraction for JSX
//!
//! jsxlate finds translation markers (`<T>`) and string translation calls
//! (`t("...")`, `msg("...")`) in TSX/JSX sources and turns them into
//! hashable translation units: sanitized JSX trees or ICU MessageFormat
//! strings. Content that could change at runtime is reported instead of
//! extracted.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and parsing
//! - `core`: Extraction engine
//! - `issues`: Diagnostic types
//! - `utils`: Shared utility functions

pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
pub mod utils;
