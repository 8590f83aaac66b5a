//! Turns one translation marker into translation units.

use swc_ecma_ast::JSXElement;

use crate::core::data::{
    DataFormat, Metadata, SanitizedValue, TranslationUnit, UnitSource, sha256_hex,
};
use crate::core::extract::metadata::marker_metadata;
use crate::core::extract::shape::{fill_slots, minify, normalize_whitespace, slot_combinations};
use crate::core::extract::static_resolver::StaticResolver;
use crate::core::extract::tree_builder::{BuildScope, TreeBuilder, UnwrappedExpr, tag_name};
use crate::issues::{Diagnostics, Rule};

/// Units and diagnostics produced by one marker.
#[derive(Debug, Default)]
pub struct MarkerEmission {
    pub units: Vec<TranslationUnit>,
    pub diagnostics: Diagnostics,
}

/// Build, validate and emit the content of a top-level marker.
///
/// Any error, whether in the metadata or anywhere in the tree, suppresses
/// every unit of this marker. Without `<Static>` regions there is one unit;
/// otherwise one per distinct combination of slot alternatives.
pub fn emit_marker(
    resolver: &StaticResolver,
    marker: &JSXElement,
    cx: &BuildScope,
) -> MarkerEmission {
    let mut diagnostics = Diagnostics::default();
    let metadata = marker_metadata(&marker.opening.attrs, &cx.file, &mut diagnostics);

    let mut builder = TreeBuilder::new(resolver);
    let children = builder.build_children(&marker.children, cx);
    let TreeBuilder {
        unwrapped,
        slots,
        diagnostics: built,
        ..
    } = builder;
    diagnostics.extend(built);

    if !unwrapped.is_empty() {
        let message = unwrapped_message(&tag_name(&marker.opening.name), &unwrapped);
        diagnostics.push(cx.file.diagnostic(Rule::UnwrappedExpression, marker.span.lo, message));
    }
    if diagnostics.has_errors() {
        return MarkerEmission {
            units: Vec::new(),
            diagnostics,
        };
    }

    let Some(base) = normalize_whitespace(SanitizedValue::List(children)) else {
        return MarkerEmission {
            units: Vec::new(),
            diagnostics,
        };
    };

    let mut units: Vec<TranslationUnit> = Vec::new();
    for combination in slot_combinations(&slots) {
        let Some(source) = minify(SanitizedValue::List(fill_slots(&base, &combination))) else {
            continue;
        };
        let static_id = (!slots.is_empty())
            .then(|| sha256_hex(&serde_json::to_string(&combination).unwrap_or_default()));
        let unit = TranslationUnit::new(
            DataFormat::Jsx,
            UnitSource::Jsx(source),
            Metadata {
                static_id,
                file_paths: vec![cx.file.path.to_string()],
                ..metadata.clone()
            },
        );
        if !units.iter().any(|existing| existing.source == unit.source) {
            units.push(unit);
        }
    }

    MarkerEmission { units, diagnostics }
}

fn unwrapped_message(marker: &str, unwrapped: &[UnwrappedExpr]) -> String {
    let sources: Vec<&str> = unwrapped.iter().map(|u| u.source.as_str()).collect();
    let mut message = format!(
        "<{}> has children that could change at runtime: {}",
        marker,
        sources.join(", ")
    );
    if unwrapped.iter().any(|u| u.meaningful) {
        message.push_str(
            "; concatenate into a single string literal, or wrap the dynamic part in <Var>",
        );
    }
    message
}
