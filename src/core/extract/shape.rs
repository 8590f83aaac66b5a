//! Whitespace normalization, Static slot filling and minification of built trees.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::core::data::{SanitizedElement, SanitizedValue};

/// Content produced by one alternative of a `<Static>` region, spliced in place of its slot.
pub type Alternative = Vec<SanitizedValue>;

/// Only spaces and tabs are whitespace to JSX; `&nbsp;` and other Unicode
/// spaces are content.
const JSX_WHITESPACE: [char; 2] = [' ', '\t'];

static INLINE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\t ]+").expect("valid whitespace regex"));

/// Apply JSX text whitespace rules to raw text.
///
/// Lines are split on line terminators. Every line but the first loses its
/// leading spaces and tabs and every line but the last its trailing ones.
/// Lines left empty are dropped, the rest are joined with a single space, and
/// runs of spaces and tabs collapse to one space.
pub fn normalize_jsx_text(raw: &str) -> String {
    let lines: Vec<&str> = raw.split(['\n', '\r']).collect();
    let last = lines.len().saturating_sub(1);
    let kept: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let line = if index > 0 {
                line.trim_start_matches(JSX_WHITESPACE)
            } else {
                line
            };
            if index < last {
                line.trim_end_matches(JSX_WHITESPACE)
            } else {
                line
            }
        })
        .filter(|line| !line.is_empty())
        .collect();
    INLINE_WHITESPACE
        .replace_all(&kept.join(" "), " ")
        .into_owned()
}

/// Normalize every `Text` node in a tree, removing text that becomes empty.
///
/// `Static` values are left exactly as evaluated. Lists are not collapsed here
/// so slot positions survive until [`fill_slots`].
pub fn normalize_whitespace(value: SanitizedValue) -> Option<SanitizedValue> {
    match value {
        SanitizedValue::Text(raw) => {
            let text = normalize_jsx_text(&raw);
            (!text.is_empty()).then_some(SanitizedValue::Text(text))
        }
        SanitizedValue::List(items) => Some(SanitizedValue::List(
            items.into_iter().filter_map(normalize_whitespace).collect(),
        )),
        SanitizedValue::Element(element) => {
            let props = element
                .props
                .into_iter()
                .filter_map(|(key, value)| normalize_whitespace(value).map(|value| (key, value)))
                .collect();
            Some(SanitizedValue::Element(SanitizedElement {
                kind: element.kind,
                props,
            }))
        }
        other @ (SanitizedValue::Static(_) | SanitizedValue::Slot(_)) => Some(other),
    }
}

/// Normalize the content of an alternative on its own.
pub fn normalize_alternative(alternative: Alternative) -> Alternative {
    alternative
        .into_iter()
        .filter_map(normalize_whitespace)
        .collect()
}

/// Add alternatives not already present, keeping first-seen order.
pub fn union_into(target: &mut Vec<Alternative>, more: Vec<Alternative>) {
    for alternative in more {
        if !target.contains(&alternative) {
            target.push(alternative);
        }
    }
}

/// Concatenate one alternative from each part, for every choice of alternatives.
///
/// A part with no alternatives makes the whole product empty.
pub fn product(parts: Vec<Vec<Alternative>>) -> Vec<Alternative> {
    parts.into_iter().fold(vec![Vec::new()], |prefixes, options| {
        let mut next = Vec::new();
        for prefix in &prefixes {
            for option in &options {
                let mut combined = prefix.clone();
                combined.extend(option.iter().cloned());
                union_into(&mut next, vec![combined]);
            }
        }
        next
    })
}

/// Every way of picking one alternative per slot, first slot varying slowest.
pub fn slot_combinations(slots: &[Vec<Alternative>]) -> Vec<Vec<&Alternative>> {
    slots.iter().fold(vec![Vec::new()], |prefixes, alternatives| {
        prefixes
            .iter()
            .flat_map(|prefix| {
                alternatives.iter().map(move |alternative| {
                    let mut combination = prefix.clone();
                    combination.push(alternative);
                    combination
                })
            })
            .collect()
    })
}

/// Replace every `Slot(i)` with the content of `combination[i]`.
///
/// Slot content is spliced into the surrounding children rather than nested,
/// so `["Message: ", Slot(0)]` with `["yes"]` becomes `["Message: ", "yes"]`.
pub fn fill_slots(value: &SanitizedValue, combination: &[&Alternative]) -> Vec<SanitizedValue> {
    match value {
        SanitizedValue::Slot(index) => combination
            .get(*index)
            .map(|alternative| alternative.to_vec())
            .unwrap_or_default(),
        SanitizedValue::List(items) => vec![SanitizedValue::List(
            items
                .iter()
                .flat_map(|item| fill_slots(item, combination))
                .collect(),
        )],
        SanitizedValue::Element(element) => {
            let props: IndexMap<String, SanitizedValue> = element
                .props
                .iter()
                .map(|(key, value)| {
                    let mut filled = fill_slots(value, combination);
                    let value = if filled.len() == 1 {
                        filled.remove(0)
                    } else {
                        SanitizedValue::List(filled)
                    };
                    (key.clone(), value)
                })
                .collect();
            vec![SanitizedValue::Element(SanitizedElement {
                kind: element.kind.clone(),
                props,
            })]
        }
        SanitizedValue::Text(_) | SanitizedValue::Static(_) => vec![value.clone()],
    }
}

/// Canonical shape: nested lists flatten, one-element lists unwrap, empty values disappear.
pub fn minify(value: SanitizedValue) -> Option<SanitizedValue> {
    match value {
        SanitizedValue::List(items) => {
            let mut flat = Vec::with_capacity(items.len());
            for item in items.into_iter().filter_map(minify) {
                match item {
                    SanitizedValue::List(inner) => flat.extend(inner),
                    other => flat.push(other),
                }
            }
            SanitizedValue::from_children(flat)
        }
        SanitizedValue::Element(element) => {
            let props = element
                .props
                .into_iter()
                .filter_map(|(key, value)| minify(value).map(|value| (key, value)))
                .collect();
            Some(SanitizedValue::Element(SanitizedElement {
                kind: element.kind,
                props,
            }))
        }
        other => Some(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> SanitizedValue {
        SanitizedValue::Text(s.to_string())
    }

    fn element(kind: &str, children: SanitizedValue) -> SanitizedValue {
        let mut props = IndexMap::new();
        props.insert("children".to_string(), children);
        SanitizedValue::element(kind, props)
    }

    #[test]
    fn test_single_line_text_is_kept() {
        assert_eq!(normalize_jsx_text("Hello "), "Hello ");
        assert_eq!(normalize_jsx_text(" Hello"), " Hello");
        assert_eq!(normalize_jsx_text("a  \t b"), "a b");
    }

    #[test]
    fn test_multiline_text_is_trimmed_and_joined() {
        assert_eq!(normalize_jsx_text("\n    Hello\n    world\n  "), "Hello world");
        assert_eq!(normalize_jsx_text("Hello\n  "), "Hello");
        assert_eq!(normalize_jsx_text("\n   "), "");
        assert_eq!(normalize_jsx_text("  one  \n\n  two  "), " one two ");
    }

    #[test]
    fn test_non_breaking_space_is_content() {
        assert_eq!(normalize_jsx_text("\n    \u{a0}Hello\n"), "\u{a0}Hello");
        assert_eq!(normalize_jsx_text("\n \u{a0}\n "), "\u{a0}");
        assert_eq!(normalize_jsx_text("Hi\u{a0}\n  there"), "Hi\u{a0} there");
    }

    #[test]
    fn test_normalize_tree_drops_indentation_only_text() {
        let tree = SanitizedValue::List(vec![
            text("\n  "),
            element("b", text("\n    bold\n  ")),
            text("\n"),
            SanitizedValue::Static("  kept  ".into()),
        ]);
        let normalized = normalize_whitespace(tree).unwrap();
        assert_eq!(
            normalized,
            SanitizedValue::List(vec![
                element("b", text("bold")),
                SanitizedValue::Static("  kept  ".into()),
            ])
        );
    }

    #[test]
    fn test_fill_slots_splices_alternatives() {
        let tree = SanitizedValue::List(vec![text("Message: "), SanitizedValue::Slot(0)]);
        let yes: Alternative = vec![SanitizedValue::Static("yes".into())];
        let filled = fill_slots(&tree, &[&yes]);
        let minified = minify(SanitizedValue::List(filled)).unwrap();
        assert_eq!(
            minified,
            SanitizedValue::List(vec![text("Message: "), SanitizedValue::Static("yes".into())])
        );
    }

    #[test]
    fn test_empty_slot_disappears() {
        let tree = element("p", SanitizedValue::List(vec![text("Hi"), SanitizedValue::Slot(0)]));
        let empty: Alternative = Vec::new();
        let filled = minify(SanitizedValue::List(fill_slots(&tree, &[&empty]))).unwrap();
        assert_eq!(filled, element("p", text("Hi")));
    }

    #[test]
    fn test_product_multiplies_and_dedupes() {
        let a = vec![vec![text("a")], vec![text("b")]];
        let c = vec![vec![text("c")], vec![text("d")]];
        let result = product(vec![a.clone(), c]);
        assert_eq!(result.len(), 4);
        assert_eq!(result[1], vec![text("a"), text("d")]);

        assert_eq!(product(vec![a.clone(), a]).len(), 4);
        assert!(product(vec![vec![]]).is_empty());
        assert_eq!(product(vec![]), vec![Vec::<SanitizedValue>::new()]);
    }

    #[test]
    fn test_slot_combinations_order() {
        let slots = vec![
            vec![vec![text("x")], vec![text("y")]],
            vec![vec![text("1")], vec![text("2")]],
        ];
        let combinations = slot_combinations(&slots);
        assert_eq!(combinations.len(), 4);
        assert_eq!(combinations[1], vec![&slots[0][0], &slots[1][1]]);
        assert_eq!(slot_combinations(&[]).len(), 1);
    }

    #[test]
    fn test_minify_removes_empty_children() {
        let tree = element("br", SanitizedValue::List(vec![]));
        let SanitizedValue::Element(el) = minify(tree).unwrap() else {
            panic!("expected element");
        };
        assert!(el.props.is_empty());
    }
}
