//! Per-file binding information gathered before tree building.
//!
//! - `imports`: import and re-export declarations
//! - `aliases`: local names of translation components (`GTT` -> `T`)
//! - `scope`: lexical scopes for shadowing and function lookup

pub mod aliases;
pub mod imports;
pub mod scope;

pub use aliases::{ComponentAliases, ComponentRole};
pub use imports::{
    FileImports, ImportInfo, ReExport, collect_imports, collect_re_exports, find_import,
};
pub use scope::{
    Binding, FunctionBody, FunctionDef, ScopeFrame, ScopeStack, extract_binding_names,
};
