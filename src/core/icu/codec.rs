//! Embedding arbitrary text inside ICU `select` placeholders.
//!
//! A declared variable looks like
//! `{_gt_, select, other {<escaped text>} _gt_var_name {<escaped name>}}`.
//! Translators see a placeholder they must keep, while the original text
//! survives any ICU-aware pipeline untouched. Decoding renders the placeholder
//! through the ICU parser, so it is the exact inverse of the escaping.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::parser::{IcuNode, parse, render};

/// Selector of a not-yet-indexed placeholder.
pub const VAR_SELECTOR: &str = "_gt_";

/// Option key carrying the variable's display name.
pub const VAR_NAME_KEY: &str = "_gt_var_name";

/// `_gt_` or an indexed `_gt_<N>`, and nothing that merely contains it.
static PLACEHOLDER_SELECTOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^_gt_[0-9]*$").expect("valid placeholder regex"));

/// Characters that must be quoted to be literal inside a select option.
///
/// `#` is only special inside plural options, so it is left alone.
const ICU_SYNTAX_CHARS: [char; 4] = ['{', '}', '<', '>'];

/// Wrap `text` in a placeholder, optionally recording a variable name.
///
/// # Examples
///
/// ```
/// use jsxlate::core::icu::declare_var;
///
/// assert_eq!(declare_var("Alice", None), "{_gt_, select, other {Alice}}");
/// assert_eq!(
///     declare_var("{x}", Some("user")),
///     "{_gt_, select, other {'{x}'} _gt_var_name {user}}"
/// );
/// ```
pub fn declare_var(text: &str, name: Option<&str>) -> String {
    let mut out = format!(
        "{{{}, select, other {{{}}}",
        VAR_SELECTOR,
        escape_literal(text)
    );
    if let Some(name) = name {
        out.push_str(&format!(" {} {{{}}}", VAR_NAME_KEY, escape_literal(name)));
    }
    out.push('}');
    out
}

/// Recover the original text of a single placeholder.
///
/// The placeholder is rendered with its selector set to `other`. Input that
/// doesn't parse is returned unchanged.
pub fn decode_var(encoded: &str) -> String {
    match parse(encoded) {
        Ok(nodes) => render(&nodes, &placeholder_value),
        Err(_) => encoded.to_string(),
    }
}

/// Number every `_gt_` placeholder in document order, starting at 1.
///
/// Placeholders nested inside plural or select options are numbered where they
/// appear in the text. Selectors that only contain `_gt_` (`_gt_user`,
/// `user_gt_`) and `_gt_` in plain text are left alone. Input that doesn't
/// parse is returned unchanged.
pub fn index_vars(icu: &str) -> String {
    let Ok(nodes) = parse(icu) else {
        return icu.to_string();
    };

    let mut selector_spans = Vec::new();
    collect_unindexed_selectors(&nodes, &mut selector_spans);

    let replacements = selector_spans
        .into_iter()
        .enumerate()
        .map(|(index, span)| (span, format!("{}{}", VAR_SELECTOR, index + 1)))
        .collect::<Vec<_>>();
    splice(icu, &replacements)
}

/// Replace every placeholder with its literal content, indexed or not.
///
/// Only the placeholder spans are rewritten; everything else, including real
/// `{name}` arguments, is copied from the input byte for byte.
pub fn decode_vars(icu: &str) -> String {
    let Ok(nodes) = parse(icu) else {
        return icu.to_string();
    };

    let mut replacements = Vec::new();
    collect_placeholders(&nodes, &mut replacements);
    splice(icu, &replacements)
}

/// Whether a select argument name is a placeholder selector.
pub fn is_placeholder_selector(name: &str) -> bool {
    PLACEHOLDER_SELECTOR.is_match(name)
}

fn placeholder_value(name: &str) -> Option<String> {
    is_placeholder_selector(name).then(|| "other".to_string())
}

/// Quote the run between the first and last ICU syntax character, doubling
/// apostrophes everywhere.
fn escape_literal(text: &str) -> String {
    let (Some(first), Some(last)) = (
        text.find(ICU_SYNTAX_CHARS),
        text.rfind(ICU_SYNTAX_CHARS),
    ) else {
        return text.replace('\'', "''");
    };
    // Syntax characters are ASCII, so the run ends one byte after `last`.
    let (prefix, rest) = text.split_at(first);
    let (run, suffix) = rest.split_at(last + 1 - first);
    format!(
        "{}'{}'{}",
        prefix.replace('\'', "''"),
        run.replace('\'', "''"),
        suffix.replace('\'', "''")
    )
}

fn collect_unindexed_selectors(nodes: &[IcuNode], out: &mut Vec<Range<usize>>) {
    for node in nodes {
        match node {
            IcuNode::Select {
                name, name_span, ..
            } if name == VAR_SELECTOR => {
                out.push(name_span.clone());
            }
            IcuNode::Select { options, .. } | IcuNode::Plural { options, .. } => {
                for option in options {
                    collect_unindexed_selectors(&option.value, out);
                }
            }
            _ => {}
        }
    }
}

fn collect_placeholders(nodes: &[IcuNode], out: &mut Vec<(Range<usize>, String)>) {
    for node in nodes {
        match node {
            IcuNode::Select {
                name,
                options,
                span,
                ..
            } if is_placeholder_selector(name) => {
                if let Some(other) = options.iter().find(|option| option.key == "other") {
                    out.push((span.clone(), render(&other.value, &placeholder_value)));
                }
            }
            IcuNode::Select { options, .. } | IcuNode::Plural { options, .. } => {
                for option in options {
                    collect_placeholders(&option.value, out);
                }
            }
            _ => {}
        }
    }
}

/// Rebuild `src`, substituting non-overlapping ranges given in ascending order.
fn splice(src: &str, replacements: &[(Range<usize>, String)]) -> String {
    let mut out = String::with_capacity(src.len());
    let mut cursor = 0;
    for (range, replacement) in replacements {
        out.push_str(&src[cursor..range.start]);
        out.push_str(replacement);
        cursor = range.end;
    }
    out.push_str(&src[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ADVERSARIAL: &[&str] = &[
        "",
        "plain text",
        "it's",
        "''",
        "'",
        "{",
        "}",
        "{}",
        "}{",
        "{name}",
        "'{name}'",
        "{'",
        "'{",
        "x'{y}'z",
        "{''x",
        "a < b > c",
        "<b>bold</b>",
        "#",
        "###",
        "# of items: #",
        "{count, plural, one {#} other {##}}",
        "_gt_",
        "{_gt_, select, other {nested}}",
        "{_gt_1, select, other {x}}",
        "emoji 🎉 {with} 'quotes' and 日本語",
        "  leading and trailing  ",
        "line\nbreak",
    ];

    #[test]
    fn test_round_trip_adversarial_inputs() {
        for input in ADVERSARIAL {
            assert_eq!(decode_var(&declare_var(input, None)), *input, "input: {:?}", input);
            assert_eq!(
                decode_var(&declare_var(input, Some("name {x}"))),
                *input,
                "named input: {:?}",
                input
            );
        }
    }

    #[test]
    fn test_declare_var_format() {
        assert_eq!(declare_var("Alice", None), "{_gt_, select, other {Alice}}");
        assert_eq!(declare_var("it's", None), "{_gt_, select, other {it''s}}");
        assert_eq!(
            declare_var("Bob", Some("user")),
            "{_gt_, select, other {Bob} _gt_var_name {user}}"
        );
    }

    #[test]
    fn test_hashes_are_not_escaped() {
        assert_eq!(declare_var("###", None), "{_gt_, select, other {###}}");
        assert_eq!(declare_var("#1 #2", None), "{_gt_, select, other {#1 #2}}");
    }

    #[test]
    fn test_syntax_run_is_quoted_once() {
        assert_eq!(
            declare_var("a {b} c {d} e", None),
            "{_gt_, select, other {a '{b} c {d}' e}}"
        );
        assert_eq!(declare_var("x'{", None), "{_gt_, select, other {x'''{'}}");
    }

    #[test]
    fn test_index_vars_document_order() {
        let input = "Hello {_gt_, select, other {Alice}} and \
                     {count, plural, one {{_gt_, select, other {x}}} other {{_gt_, select, other {y}}}}";
        let expected = "Hello {_gt_1, select, other {Alice}} and \
                        {count, plural, one {{_gt_2, select, other {x}}} other {{_gt_3, select, other {y}}}}";
        assert_eq!(index_vars(input), expected);
    }

    #[test]
    fn test_index_vars_ignores_lookalikes() {
        let input = "_gt_ says {_gt_user, select, other {u}} {user_gt_, select, other {v}} \
                     {_gt_, select, other {_gt_}}";
        let expected = "_gt_ says {_gt_user, select, other {u}} {user_gt_, select, other {v}} \
                        {_gt_1, select, other {_gt_}}";
        assert_eq!(index_vars(input), expected);
    }

    #[test]
    fn test_index_vars_leaves_invalid_input() {
        assert_eq!(index_vars("{_gt_, select, other {x}"), "{_gt_, select, other {x}");
        assert_eq!(index_vars("no placeholders"), "no placeholders");
    }

    #[test]
    fn test_decode_vars_splices_only_placeholders() {
        let input = "Hi {_gt_1, select, other {Bob '{'x'}'}},   \
                     you have {n, plural, one {# item} other {# items}} {name}";
        let expected = "Hi Bob {x},   you have {n, plural, one {# item} other {# items}} {name}";
        assert_eq!(decode_vars(input), expected);
    }

    #[test]
    fn test_decode_vars_unindexed_and_named() {
        let input = format!("A {} B {}", declare_var("x{y}", Some("v")), declare_var("z", None));
        assert_eq!(decode_vars(&input), "A x{y} B z");
    }

    #[test]
    fn test_decode_vars_keeps_non_placeholder_selects() {
        let input = "{_gt_user, select, other {u}} {g, select, male {He} other {They}}";
        assert_eq!(decode_vars(input), input);
    }

    #[test]
    fn test_decode_vars_inverts_index_vars() {
        let original = format!(
            "{} of {{n, plural, one {{{}}} other {{{}}}}}",
            declare_var("a#b", None),
            declare_var("'one'", None),
            declare_var("{many}", None)
        );
        let indexed = index_vars(&original);
        assert_eq!(decode_vars(&indexed), decode_vars(&original));
        assert_eq!(
            decode_vars(&indexed),
            "a#b of {n, plural, one {'one'} other {{many}}}"
        );
    }

    #[test]
    fn test_is_placeholder_selector() {
        assert!(is_placeholder_selector("_gt_"));
        assert!(is_placeholder_selector("_gt_12"));
        assert!(!is_placeholder_selector("_gt_user"));
        assert!(!is_placeholder_selector("user_gt_"));
        assert!(!is_placeholder_selector("x_gt_1"));
    }
}
