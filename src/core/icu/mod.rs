//! ICU MessageFormat support: parsing and variable placeholders.

mod codec;
pub mod parser;

pub use codec::{
    VAR_NAME_KEY, VAR_SELECTOR, decode_var, decode_vars, declare_var, index_vars,
    is_placeholder_selector,
};
pub use parser::{IcuNode, IcuOption, IcuParseError, parse};
