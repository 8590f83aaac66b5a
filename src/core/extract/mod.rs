//! Extraction: from a parsed file to translation units.
//!
//! ## Module Structure
//!
//! - `file_extractor`: per-file visitor that finds markers and string calls
//! - `emitter`: one marker to its units, with `<Static>` expansion
//! - `tree_builder`: marker children to a `SanitizedValue` tree
//! - `static_resolver`: cross-file resolution of functions used in `<Static>`
//! - `shape`: whitespace normalization, slot filling, minification
//! - `metadata`: `id`, `context` and `maxChars`
//! - `strings`: `t(..)` and `msg(..)` calls
//! - `host`: import resolution and file reading for the resolver

pub mod emitter;
pub mod file_extractor;
pub mod host;
pub mod metadata;
pub mod shape;
pub mod static_resolver;
pub mod strings;
pub mod tree_builder;

pub use file_extractor::{FileExtraction, extract_source};
pub use host::{FsHost, ModuleHost};
pub use static_resolver::StaticResolver;

use crate::config::{Config, default_html_content_props, default_packages};

/// Settings the extractor reads from the configuration.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Import sources whose exports are recognized.
    pub packages: Vec<String>,
    /// Props kept on pass-through elements.
    pub html_content_props: Vec<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            packages: default_packages(),
            html_content_props: default_html_content_props(),
        }
    }
}

impl ExtractOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            packages: config.packages.clone(),
            html_content_props: config.html_content_props.clone(),
        }
    }
}
