//! Compile-time evaluation of expressions.
//!
//! Decides whether an expression is constant at analysis time and, if so,
//! produces its canonical string value. String concatenation and templates
//! with substitutions are never static, even when every operand is a literal;
//! such content must be wrapped in a variable component.

use swc_ecma_ast::{BinaryOp, Expr, Lit, Str, Tpl, UnaryOp};

use crate::utils::contains_alphanumeric;

/// Evaluate an expression, returning its canonical string value if it is static.
///
/// | Expression | Value |
/// |---|---|
/// | `"text"` | `text`, verbatim |
/// | `` `text` `` (no substitutions) | raw `text`, escapes left as written |
/// | `3.14`, `-5` | `3.14`, `-5` |
/// | `true` / `false` | `true` / `false` |
/// | `null` | `null` |
/// | `(expr)` | value of `expr` |
///
/// Everything else is dynamic, including `"a" + "b"` and `` `a${"b"}` ``.
pub fn evaluate(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(Lit::Str(s)) => Some(str_value(s)),
        Expr::Lit(Lit::Num(num)) => Some(js_number_to_string(num.value)),
        Expr::Lit(Lit::Bool(b)) => Some(b.value.to_string()),
        Expr::Lit(Lit::Null(_)) => Some("null".to_string()),
        Expr::Tpl(tpl) => evaluate_template(tpl),
        Expr::Paren(paren) => evaluate(&paren.expr),
        Expr::Unary(unary) if unary.op == UnaryOp::Minus => match &*unary.arg {
            Expr::Lit(Lit::Num(num)) => Some(js_number_to_string(-num.value)),
            _ => None,
        },
        _ => None,
    }
}

/// Whether the expression is of a kind that can ever carry a constant payload.
///
/// True for string, numeric and template literals, even templates with
/// substitutions. Callers use it to decide whether full evaluation is worth
/// attempting; it says nothing about the evaluation result.
pub fn is_static_value(expr: &Expr) -> bool {
    match expr {
        Expr::Lit(Lit::Str(_)) | Expr::Lit(Lit::Num(_)) | Expr::Tpl(_) => true,
        Expr::Paren(paren) => is_static_value(&paren.expr),
        _ => false,
    }
}

/// Value of a string literal or substitution-free template, through parentheses.
///
/// Narrower than [`evaluate`]: numbers, booleans and `null` are rejected. Used
/// where only text is acceptable, such as `id`, `context` and function returns.
pub fn static_string_value(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(Lit::Str(s)) => Some(str_value(s)),
        Expr::Tpl(tpl) => evaluate_template(tpl),
        Expr::Paren(paren) => static_string_value(&paren.expr),
        _ => None,
    }
}

/// Whether an expression carries text worth translating.
///
/// Strings and templates are meaningful when they contain a letter or digit.
/// A `+` is meaningful when both operands are; this is the only place the check
/// looks through an operator that is never static.
pub fn is_meaningful_expr(expr: &Expr) -> bool {
    match expr {
        Expr::Bin(bin) if bin.op == BinaryOp::Add => {
            is_meaningful_expr(&bin.left) && is_meaningful_expr(&bin.right)
        }
        Expr::Paren(paren) => is_meaningful_expr(&paren.expr),
        Expr::Tpl(tpl) => tpl
            .quasis
            .iter()
            .any(|quasi| contains_alphanumeric(&quasi.raw)),
        _ => evaluate(expr).is_some_and(|value| contains_alphanumeric(&value)),
    }
}

/// Value of a string literal. Lone surrogates are replaced rather than dropped.
pub fn str_value(s: &Str) -> String {
    match s.value.as_str() {
        Some(value) => value.to_string(),
        None => s.value.to_string_lossy().into_owned(),
    }
}

fn evaluate_template(tpl: &Tpl) -> Option<String> {
    if !tpl.exprs.is_empty() {
        return None;
    }
    tpl.quasis.first().map(|quasi| quasi.raw.to_string())
}

/// Render a number the way JavaScript's `String(n)` does.
pub fn js_number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{}", n);
    }
    let exponential = format!("{:e}", n);
    match exponential.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
        _ => exponential,
    }
}
