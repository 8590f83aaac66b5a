//! `id`, `context` and `maxChars`, as marker attributes or string-call options.

use swc_ecma_ast::{Expr, JSXAttrOrSpread, JSXAttrValue, Lit};

use crate::core::data::Metadata;
use crate::core::evaluate::{static_string_value, str_value};
use crate::core::extract::tree_builder::{FileContext, attr_expr, attr_name, jsx_attrs};
use crate::issues::{Diagnostics, Rule};

/// A recognized metadata field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    Id,
    Context,
    MaxChars,
}

impl MetadataField {
    pub fn from_attr(name: &str) -> Option<Self> {
        match name {
            "id" => Some(MetadataField::Id),
            "context" => Some(MetadataField::Context),
            "maxChars" => Some(MetadataField::MaxChars),
            _ => None,
        }
    }

    /// Option keys of string calls may carry a `$` prefix: `{ $id: "home" }`.
    pub fn from_option_key(key: &str) -> Option<Self> {
        Self::from_attr(key.strip_prefix('$').unwrap_or(key))
    }

    pub fn name(self) -> &'static str {
        match self {
            MetadataField::Id => "id",
            MetadataField::Context => "context",
            MetadataField::MaxChars => "maxChars",
        }
    }
}

/// Value given for a metadata field.
pub enum FieldValue<'a> {
    /// Plain string attribute, `id="home"`.
    Text(String),
    Expr(&'a Expr),
    /// Attribute without a value, `<T id>`.
    Missing,
}

/// Store `value` on `metadata`, or explain why it was rejected.
pub fn set_field(
    metadata: &mut Metadata,
    field: MetadataField,
    value: FieldValue,
) -> Result<(), String> {
    match field {
        MetadataField::Id | MetadataField::Context => {
            let text = match value {
                FieldValue::Text(text) => Some(text),
                FieldValue::Expr(expr) => static_string_value(expr),
                FieldValue::Missing => None,
            }
            .ok_or_else(|| format!("`{}` must be a static string", field.name()))?;
            if field == MetadataField::Id {
                metadata.id = Some(text);
            } else {
                metadata.context = Some(text);
            }
        }
        MetadataField::MaxChars => {
            let max_chars = match value {
                FieldValue::Expr(expr) => static_u32(expr),
                _ => None,
            }
            .ok_or_else(|| "`maxChars` must be a static non-negative integer".to_string())?;
            metadata.max_chars = Some(max_chars);
        }
    }
    Ok(())
}

/// Numeric literal that fits a `u32`, through parentheses.
fn static_u32(expr: &Expr) -> Option<u32> {
    match expr {
        Expr::Lit(Lit::Num(num)) => {
            let value = num.value;
            let in_range = value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&value);
            in_range.then_some(value as u32)
        }
        Expr::Paren(paren) => static_u32(&paren.expr),
        _ => None,
    }
}

/// Read the metadata attributes of a marker, reporting non-static values.
pub fn marker_metadata(
    attrs: &[JSXAttrOrSpread],
    file: &FileContext,
    diagnostics: &mut Diagnostics,
) -> Metadata {
    let mut metadata = Metadata::default();
    for attr in jsx_attrs(attrs) {
        let Some(field) = MetadataField::from_attr(&attr_name(&attr.name)) else {
            continue;
        };
        let value = match &attr.value {
            Some(JSXAttrValue::Str(s)) => FieldValue::Text(str_value(s)),
            Some(value) => match attr_expr(value) {
                Some(expr) => FieldValue::Expr(expr),
                None => FieldValue::Missing,
            },
            None => FieldValue::Missing,
        };
        if let Err(message) = set_field(&mut metadata, field, value) {
            diagnostics.push(file.diagnostic(Rule::InvalidMetadata, attr.span.lo, message));
        }
    }
    metadata
}
