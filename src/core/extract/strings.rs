//! String translation calls: `t("...")` from `useGT`/`getGT`, and `msg("...")`.

use swc_common::Spanned;
use swc_ecma_ast::{CallExpr, Expr, Prop, PropName, PropOrSpread};

use crate::core::data::{DataFormat, Metadata, TranslationUnit, UnitSource};
use crate::core::evaluate::{is_static_value, static_string_value, str_value};
use crate::core::extract::metadata::{FieldValue, MetadataField, set_field};
use crate::core::extract::tree_builder::FileContext;
use crate::core::icu;
use crate::issues::{Diagnostics, Rule};

/// Extract the ICU unit of a string translation call.
///
/// The message must be a static string that parses as ICU MessageFormat. Its
/// `_gt_` placeholders are numbered in the emitted source.
pub fn extract_string_call(
    call: &CallExpr,
    file: &FileContext,
    diagnostics: &mut Diagnostics,
) -> Option<TranslationUnit> {
    let callee = file.snippet(call.callee.span());
    let message = call.args.first()?;

    let value = match (&message.spread, static_string_value(&message.expr)) {
        (None, Some(value)) => value,
        _ => {
            let source = file.snippet(message.expr.span());
            let message_text = if message.spread.is_none() && is_static_value(&message.expr) {
                format!(
                    "message passed to `{}` interpolates values at runtime, use ICU variables instead: `{}`",
                    callee, source
                )
            } else {
                format!("message passed to `{}` could change at runtime: `{}`", callee, source)
            };
            diagnostics.push(file.diagnostic(
                Rule::DynamicString,
                message.expr.span().lo,
                message_text,
            ));
            return None;
        }
    };

    if let Err(err) = icu::parse(&value) {
        diagnostics.push(file.diagnostic(
            Rule::InvalidIcu,
            message.expr.span().lo,
            format!("message passed to `{}` is not valid ICU MessageFormat: {}", callee, err),
        ));
        return None;
    }

    let mut metadata = Metadata {
        file_paths: vec![file.path.to_string()],
        ..Default::default()
    };
    let mut valid = true;
    if let Some(options) = call.args.get(1)
        && let Expr::Object(object) = &*options.expr
    {
        for prop in &object.props {
            let PropOrSpread::Prop(prop) = prop else {
                continue;
            };
            let shorthand;
            let (key, value) = match &**prop {
                Prop::KeyValue(kv) => (prop_key(&kv.key), &*kv.value),
                Prop::Shorthand(ident) => {
                    shorthand = Expr::Ident(ident.clone());
                    (Some(ident.sym.to_string()), &shorthand)
                }
                _ => continue,
            };
            let Some(field) = key.as_deref().and_then(MetadataField::from_option_key) else {
                continue;
            };
            if let Err(reason) = set_field(&mut metadata, field, FieldValue::Expr(value)) {
                diagnostics.push(file.diagnostic(Rule::InvalidMetadata, value.span().lo, reason));
                valid = false;
            }
        }
    }

    valid.then(|| {
        TranslationUnit::new(
            DataFormat::Icu,
            UnitSource::Icu(icu::index_vars(&value)),
            metadata,
        )
    })
}

fn prop_key(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => Some(str_value(s)),
        _ => None,
    }
}
