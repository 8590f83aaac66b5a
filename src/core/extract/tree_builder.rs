//! JSX tree builder: classifies the content of a translation marker into a
//! [`SanitizedValue`] tree.
//!
//! Text stays raw, recognized components collapse to their own props, other
//! elements pass through with their tag name, and every `<Static>` region
//! becomes a [`SanitizedValue::Slot`] whose alternatives are resolved through
//! the static function resolver. Dynamic expressions that are not wrapped in a
//! variable component are recorded in [`TreeBuilder::unwrapped`] for the
//! emitter to report.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use swc_common::{BytePos, SourceMap, SourceMapper, Span, Spanned};
use swc_ecma_ast::{
    Expr, JSXAttr, JSXAttrName, JSXAttrOrSpread, JSXAttrValue, JSXElement, JSXElementChild,
    JSXElementName, JSXExpr, JSXFragment, JSXObject,
};

use crate::core::collect::{ComponentAliases, ComponentRole, FileImports, ScopeStack};
use crate::core::data::{SanitizedValue, SourceLocation, source_line_at};
use crate::core::evaluate::{evaluate, is_meaningful_expr, static_string_value, str_value};
use crate::core::extract::shape::{Alternative, normalize_alternative, product, union_into};
use crate::core::extract::static_resolver::{DeclarationKey, StaticResolver};
use crate::issues::{Diagnostic, Diagnostics, Rule};

static PLURAL_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(zero|one|two|few|many|other|singular|plural|dual|[=_]\d+)$")
        .expect("valid plural key regex")
});

/// Per-file information the builder needs to classify tags and report problems.
#[derive(Clone, Copy)]
pub struct FileContext<'a> {
    pub path: &'a str,
    pub source_map: &'a SourceMap,
    pub imports: &'a FileImports,
    pub aliases: &'a ComponentAliases,
}

impl FileContext<'_> {
    pub fn diagnostic(&self, rule: Rule, pos: BytePos, message: impl Into<String>) -> Diagnostic {
        Diagnostic::new(rule, SourceLocation::lookup(self.path, self.source_map, pos), message)
            .with_source_line(source_line_at(self.source_map, pos))
    }

    /// Source text of a span, as written.
    pub fn snippet(&self, span: Span) -> String {
        self.source_map.span_to_snippet(span).unwrap_or_default()
    }
}

/// The file and lexical scope a node is built in.
#[derive(Clone)]
pub struct BuildScope<'a> {
    pub file: FileContext<'a>,
    pub scope: ScopeStack,
}

/// A dynamic expression found where translatable content was expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnwrappedExpr {
    /// Source text of the expression container, braces included.
    pub source: String,
    /// Whether the expression carries text, e.g. `{"Hello " + "world"}`.
    pub meaningful: bool,
}

/// Builds the tree for one marker.
///
/// A builder is single-use: the emitter reads `unwrapped`, `slots` and
/// `diagnostics` once the marker's children are built.
pub struct TreeBuilder<'r> {
    pub(super) resolver: &'r StaticResolver,
    /// Functions being inlined, outermost first.
    pub(super) call_stack: Vec<DeclarationKey>,
    pub unwrapped: Vec<UnwrappedExpr>,
    /// Alternatives for each `<Static>` slot, indexed by slot number.
    pub slots: Vec<Vec<Alternative>>,
    pub diagnostics: Diagnostics,
}

impl<'r> TreeBuilder<'r> {
    pub fn new(resolver: &'r StaticResolver) -> Self {
        Self {
            resolver,
            call_stack: Vec::new(),
            unwrapped: Vec::new(),
            slots: Vec::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    /// Fresh builder for JSX returned by an inlined function, sharing the call stack.
    pub(super) fn nested(&self) -> Self {
        Self {
            call_stack: self.call_stack.clone(),
            ..Self::new(self.resolver)
        }
    }

    pub fn build_children(
        &mut self,
        children: &[JSXElementChild],
        cx: &BuildScope,
    ) -> Vec<SanitizedValue> {
        children
            .iter()
            .filter_map(|child| self.build_child(child, cx))
            .collect()
    }

    fn build_child(&mut self, child: &JSXElementChild, cx: &BuildScope) -> Option<SanitizedValue> {
        match child {
            JSXElementChild::JSXText(text) => Some(SanitizedValue::Text(text.value.to_string())),
            JSXElementChild::JSXExprContainer(container) => match &container.expr {
                JSXExpr::JSXEmptyExpr(_) => None,
                JSXExpr::Expr(expr) => self.build_expression(expr, container.span, cx),
            },
            JSXElementChild::JSXElement(element) => self.build_element(element, cx),
            JSXElementChild::JSXFragment(fragment) => Some(self.build_fragment(fragment, cx)),
            JSXElementChild::JSXSpreadChild(spread) => {
                Some(self.record_unwrapped(&spread.expr, spread.span, cx))
            }
        }
    }

    /// Content of an expression container; `span` covers the braces.
    fn build_expression(
        &mut self,
        expr: &Expr,
        span: Span,
        cx: &BuildScope,
    ) -> Option<SanitizedValue> {
        match expr {
            Expr::JSXElement(element) => self.build_element(element, cx),
            Expr::JSXFragment(fragment) => Some(self.build_fragment(fragment, cx)),
            Expr::Paren(paren)
                if matches!(&*paren.expr, Expr::JSXElement(_) | Expr::JSXFragment(_)) =>
            {
                self.build_expression(&paren.expr, span, cx)
            }
            _ => match evaluate(expr) {
                Some(value) => Some(SanitizedValue::Static(value)),
                None => Some(self.record_unwrapped(expr, span, cx)),
            },
        }
    }

    /// Record a dynamic expression and fall back to its source text.
    fn record_unwrapped(&mut self, expr: &Expr, span: Span, cx: &BuildScope) -> SanitizedValue {
        let source = cx.file.snippet(span);
        self.unwrapped.push(UnwrappedExpr {
            source: source.clone(),
            meaningful: is_meaningful_expr(expr),
        });
        SanitizedValue::Static(source)
    }

    pub fn build_element(
        &mut self,
        element: &JSXElement,
        cx: &BuildScope,
    ) -> Option<SanitizedValue> {
        match tag_role(&element.opening.name, &cx.file, &cx.scope) {
            Some(ComponentRole::T) => {
                self.diagnostics.push(cx.file.diagnostic(
                    Rule::NestedMarker,
                    element.span.lo,
                    "translation marker nested inside another marker; its content belongs to the outer one",
                ));
                // Kept as a `T` element of the outer tree, so its boundary
                // survives in the outer unit.
                Some(self.build_pass_through(ComponentRole::T.as_str().to_string(), element, cx))
            }
            Some(role) if role.is_variable() => Some(self.build_variable(role, element)),
            Some(role @ (ComponentRole::Branch | ComponentRole::Plural)) => {
                Some(self.build_branching(role, element, cx))
            }
            Some(ComponentRole::Static) => self.build_static(element, cx),
            _ => Some(self.build_pass_through(tag_name(&element.opening.name), element, cx)),
        }
    }

    pub fn build_fragment(&mut self, fragment: &JSXFragment, cx: &BuildScope) -> SanitizedValue {
        let mut props = IndexMap::new();
        let children = self.build_children(&fragment.children, cx);
        if let Some(children) = SanitizedValue::from_children(children) {
            props.insert("children".to_string(), children);
        }
        SanitizedValue::element("", props)
    }

    /// Unrecognized element: tag name, static HTML content props and children.
    fn build_pass_through(
        &mut self,
        kind: String,
        element: &JSXElement,
        cx: &BuildScope,
    ) -> SanitizedValue {
        let html_content_props = &self.resolver.options().html_content_props;
        let mut props = IndexMap::new();
        for attr in jsx_attrs(&element.opening.attrs) {
            let name = attr_name(&attr.name);
            if !html_content_props.contains(&name) {
                continue;
            }
            if let Some(value) = attr.value.as_ref().and_then(attr_string) {
                props.insert(name, SanitizedValue::Static(value));
            }
        }
        let children = self.build_children(&element.children, cx);
        if let Some(children) = SanitizedValue::from_children(children) {
            props.insert("children".to_string(), children);
        }
        SanitizedValue::element(kind, props)
    }

    /// Var, Num, Currency and DateTime keep their defined props and nothing else.
    fn build_variable(&mut self, role: ComponentRole, element: &JSXElement) -> SanitizedValue {
        let allowed: &[&str] = match role {
            ComponentRole::Currency => &["name", "currency"],
            _ => &["name"],
        };
        let mut props = IndexMap::new();
        for attr in jsx_attrs(&element.opening.attrs) {
            let name = attr_name(&attr.name);
            if !allowed.contains(&name.as_str()) {
                continue;
            }
            if let Some(value) = attr.value.as_ref().and_then(attr_evaluated) {
                props.insert(name, SanitizedValue::Static(value));
            }
        }
        SanitizedValue::element(role.as_str(), props)
    }

    fn build_branching(
        &mut self,
        role: ComponentRole,
        element: &JSXElement,
        cx: &BuildScope,
    ) -> SanitizedValue {
        let mut props = IndexMap::new();
        for attr in jsx_attrs(&element.opening.attrs) {
            let name = attr_name(&attr.name);
            let is_payload = match role {
                ComponentRole::Branch => name != "branch",
                _ => PLURAL_KEY.is_match(&name),
            };
            if !is_payload {
                continue;
            }
            let Some(value) = &attr.value else {
                continue;
            };
            if let Some(payload) = self.build_payload(value, cx) {
                props.insert(name, payload);
            }
        }
        let children = self.build_children(&element.children, cx);
        if let Some(children) = SanitizedValue::from_children(children) {
            props.insert("children".to_string(), children);
        }
        SanitizedValue::element(role.as_str(), props)
    }

    /// Branch and Plural payloads are built like children.
    fn build_payload(&mut self, value: &JSXAttrValue, cx: &BuildScope) -> Option<SanitizedValue> {
        match value {
            JSXAttrValue::Str(s) => Some(SanitizedValue::Static(str_value(s))),
            JSXAttrValue::JSXExprContainer(container) => match &container.expr {
                JSXExpr::JSXEmptyExpr(_) => None,
                JSXExpr::Expr(expr) => self.build_expression(expr, container.span, cx),
            },
            JSXAttrValue::JSXElement(element) => self.build_element(element, cx),
            JSXAttrValue::JSXFragment(fragment) => Some(self.build_fragment(fragment, cx)),
        }
    }

    /// A `<Static>` region becomes a slot; `None` when any child is invalid.
    fn build_static(&mut self, element: &JSXElement, cx: &BuildScope) -> Option<SanitizedValue> {
        let mut parts = Vec::new();
        for child in &element.children {
            match child {
                JSXElementChild::JSXText(text) if text.value.trim().is_empty() => {
                    parts.push(vec![vec![SanitizedValue::Text(text.value.to_string())]]);
                }
                JSXElementChild::JSXExprContainer(container) => match &container.expr {
                    JSXExpr::JSXEmptyExpr(_) => {}
                    JSXExpr::Expr(expr) => parts.push(self.static_child_alternatives(expr, cx)?),
                },
                other => {
                    self.invalid_static_child(other.span(), cx);
                    return None;
                }
            }
        }

        let mut alternatives = Vec::new();
        union_into(
            &mut alternatives,
            product(parts).into_iter().map(normalize_alternative).collect(),
        );
        if alternatives.is_empty() {
            alternatives.push(Vec::new());
        }
        self.slots.push(alternatives);
        Some(SanitizedValue::Slot(self.slots.len() - 1))
    }

    /// Alternatives of one `<Static>` expression child.
    fn static_child_alternatives(
        &mut self,
        expr: &Expr,
        cx: &BuildScope,
    ) -> Option<Vec<Alternative>> {
        match expr {
            Expr::Paren(paren) => self.static_child_alternatives(&paren.expr, cx),
            Expr::Call(call) => Some(self.call_alternatives(call, cx)),
            Expr::Await(await_expr) => match &*await_expr.arg {
                Expr::Call(call) => Some(self.call_alternatives(call, cx)),
                _ => {
                    self.invalid_static_child(expr.span(), cx);
                    None
                }
            },
            Expr::Cond(cond) => {
                let mut alternatives = self.static_child_alternatives(&cond.cons, cx)?;
                union_into(&mut alternatives, self.static_child_alternatives(&cond.alt, cx)?);
                Some(alternatives)
            }
            _ => match evaluate(expr) {
                Some(value) => Some(vec![vec![SanitizedValue::Static(value)]]),
                None => {
                    self.invalid_static_child(expr.span(), cx);
                    None
                }
            },
        }
    }

    fn invalid_static_child(&mut self, span: Span, cx: &BuildScope) {
        self.diagnostics.push(cx.file.diagnostic(
            Rule::InvalidStaticChild,
            span.lo,
            format!(
                "<Static> children must be function calls or static values, found `{}`",
                cx.file.snippet(span).trim()
            ),
        ));
    }
}

/// Role of a JSX tag, unless a local binding shadows the alias.
pub fn tag_role(
    name: &JSXElementName,
    file: &FileContext,
    scope: &ScopeStack,
) -> Option<ComponentRole> {
    match name {
        JSXElementName::Ident(ident) => {
            if scope.is_bound(&ident.sym) {
                return None;
            }
            file.aliases.role_of(&ident.sym)
        }
        JSXElementName::JSXMemberExpr(member) => match &member.obj {
            JSXObject::Ident(obj) if !scope.is_bound(&obj.sym) => {
                file.aliases.role_of_member(&obj.sym, &member.prop.sym)
            }
            _ => None,
        },
        JSXElementName::JSXNamespacedName(_) => None,
    }
}

/// Tag name as written: `div`, `UI.Card`, `svg:path`.
pub fn tag_name(name: &JSXElementName) -> String {
    fn object_name(object: &JSXObject) -> String {
        match object {
            JSXObject::Ident(ident) => ident.sym.to_string(),
            JSXObject::JSXMemberExpr(member) => {
                format!("{}.{}", object_name(&member.obj), member.prop.sym)
            }
        }
    }
    match name {
        JSXElementName::Ident(ident) => ident.sym.to_string(),
        JSXElementName::JSXMemberExpr(member) => {
            format!("{}.{}", object_name(&member.obj), member.prop.sym)
        }
        JSXElementName::JSXNamespacedName(ns) => format!("{}:{}", ns.ns.sym, ns.name.sym),
    }
}

/// Plain attributes, skipping spreads.
pub fn jsx_attrs(attrs: &[JSXAttrOrSpread]) -> impl Iterator<Item = &JSXAttr> {
    attrs.iter().filter_map(|attr| match attr {
        JSXAttrOrSpread::JSXAttr(attr) => Some(attr),
        JSXAttrOrSpread::SpreadElement(_) => None,
    })
}

pub fn attr_name(name: &JSXAttrName) -> String {
    match name {
        JSXAttrName::Ident(ident) => ident.sym.to_string(),
        JSXAttrName::JSXNamespacedName(ns) => format!("{}:{}", ns.ns.sym, ns.name.sym),
    }
}

/// Expression inside an attribute container, if any.
pub fn attr_expr(value: &JSXAttrValue) -> Option<&Expr> {
    match value {
        JSXAttrValue::JSXExprContainer(container) => match &container.expr {
            JSXExpr::Expr(expr) => Some(expr),
            JSXExpr::JSXEmptyExpr(_) => None,
        },
        _ => None,
    }
}

/// `title="x"` or `title={"x"}`; strings only.
pub fn attr_string(value: &JSXAttrValue) -> Option<String> {
    match value {
        JSXAttrValue::Str(s) => Some(str_value(s)),
        _ => attr_expr(value).and_then(static_string_value),
    }
}

/// Like [`attr_string`] but also accepts numbers, booleans and `null`.
fn attr_evaluated(value: &JSXAttrValue) -> Option<String> {
    match value {
        JSXAttrValue::Str(s) => Some(str_value(s)),
        _ => attr_expr(value).and_then(evaluate),
    }
}
