//! Lexical scopes for identifier resolution.
//!
//! Each function body and block gets one [`ScopeFrame`], built up front by
//! hoisting every declaration in it. Frames are immutable once pushed, so a
//! [`ScopeStack`] can be cheaply snapshotted and handed to the static function
//! resolver, which resolves a function's own calls in the scope the function
//! was declared in.

use std::collections::HashMap;
use std::sync::Arc;

use swc_common::Span;
use swc_ecma_ast::{
    ArrowExpr, BlockStmt, BlockStmtOrExpr, Callee, Decl, DefaultDecl, Expr, Function,
    ModuleDecl, ModuleItem, ObjectPatProp, Pat, Stmt, VarDeclarator,
};

use crate::core::collect::aliases::{ComponentAliases, ComponentRole};

/// Body of a function that may be inlined into a `<Static>` region.
#[derive(Debug, Clone)]
pub enum FunctionBody {
    Block(BlockStmt),
    Expr(Box<Expr>),
}

/// An owned copy of a function declaration or function-valued variable.
#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: String,
    /// Span of the function itself; tells apart same-named functions of one file.
    pub span: Span,
    pub params: Vec<Pat>,
    pub body: FunctionBody,
}

impl FunctionDef {
    /// `None` for body-less overload signatures.
    pub fn from_function(name: impl Into<String>, function: &Function) -> Option<Self> {
        let body = function.body.as_ref()?;
        Some(Self {
            name: name.into(),
            span: function.span,
            params: function.params.iter().map(|param| param.pat.clone()).collect(),
            body: FunctionBody::Block(body.clone()),
        })
    }

    pub fn from_arrow(name: impl Into<String>, arrow: &ArrowExpr) -> Self {
        let body = match &*arrow.body {
            BlockStmtOrExpr::BlockStmt(block) => FunctionBody::Block(block.clone()),
            BlockStmtOrExpr::Expr(expr) => FunctionBody::Expr(expr.clone()),
        };
        Self {
            name: name.into(),
            span: arrow.span,
            params: arrow.params.clone(),
            body,
        }
    }

    /// `name = () => ..` or `name = function () { .. }`, looking through parentheses.
    pub fn from_initializer(name: &str, init: &Expr) -> Option<Self> {
        match init {
            Expr::Arrow(arrow) => Some(Self::from_arrow(name, arrow)),
            Expr::Fn(fn_expr) => Self::from_function(name, &fn_expr.function),
            Expr::Paren(paren) => Self::from_initializer(name, &paren.expr),
            _ => None,
        }
    }

    /// Frame holding the parameters and the hoisted top-level body declarations.
    pub fn body_frame(&self, aliases: &ComponentAliases) -> ScopeFrame {
        let stmts = match &self.body {
            FunctionBody::Block(block) => Some(block.stmts.as_slice()),
            FunctionBody::Expr(_) => None,
        };
        ScopeFrame::for_function(&self.params, stmts, aliases)
    }
}

/// What a name is bound to in a scope.
#[derive(Debug, Clone)]
pub enum Binding {
    /// A function that `<Static>` may inline.
    Function(Arc<FunctionDef>),
    /// A string translator from `useGT()` or `await getGT()`.
    Translator,
    /// Anything else; shadows outer bindings and component aliases.
    Local,
}

/// Bindings declared directly in one function body or block.
#[derive(Debug, Default)]
pub struct ScopeFrame {
    bindings: HashMap<String, Binding>,
}

impl ScopeFrame {
    pub fn with_params(params: &[Pat]) -> Self {
        let mut frame = Self::default();
        for name in params.iter().flat_map(extract_binding_names) {
            frame.insert(name, Binding::Local);
        }
        frame
    }

    /// Parameters plus the declarations hoisted from a function body.
    pub fn for_function(params: &[Pat], body: Option<&[Stmt]>, aliases: &ComponentAliases) -> Self {
        let mut frame = Self::with_params(params);
        if let Some(stmts) = body {
            frame.hoist_statements(stmts, aliases);
        }
        frame
    }

    /// Top-level declarations of a module, including exported ones.
    ///
    /// `export default function` and `export default () => ..` are bound
    /// under `default`.
    pub fn for_module(items: &[ModuleItem], aliases: &ComponentAliases) -> Self {
        let mut frame = Self::default();
        for item in items {
            match item {
                ModuleItem::Stmt(stmt) => frame.hoist_statement(stmt, aliases),
                ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => {
                    frame.hoist_decl(&export.decl, aliases)
                }
                ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(export)) => {
                    if let DefaultDecl::Fn(fn_expr) = &export.decl
                        && let Some(def) = FunctionDef::from_function("default", &fn_expr.function)
                    {
                        let def = Arc::new(def);
                        if let Some(ident) = &fn_expr.ident {
                            frame.insert(ident.sym.to_string(), Binding::Function(def.clone()));
                        }
                        frame.insert("default".to_string(), Binding::Function(def));
                    }
                }
                ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(export)) => {
                    if let Some(def) = FunctionDef::from_initializer("default", &export.expr) {
                        frame.insert("default".to_string(), Binding::Function(Arc::new(def)));
                    }
                }
                ModuleItem::ModuleDecl(_) => {}
            }
        }
        frame
    }

    /// Block of statements (function body, `if` branch, loop body, ...).
    pub fn for_block(stmts: &[Stmt], aliases: &ComponentAliases) -> Self {
        let mut frame = Self::default();
        frame.hoist_statements(stmts, aliases);
        frame
    }

    pub fn insert(&mut self, name: String, binding: Binding) {
        self.bindings.insert(name, binding);
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    fn hoist_statements(&mut self, stmts: &[Stmt], aliases: &ComponentAliases) {
        for stmt in stmts {
            self.hoist_statement(stmt, aliases);
        }
    }

    fn hoist_statement(&mut self, stmt: &Stmt, aliases: &ComponentAliases) {
        if let Stmt::Decl(decl) = stmt {
            self.hoist_decl(decl, aliases);
        }
    }

    fn hoist_decl(&mut self, decl: &Decl, aliases: &ComponentAliases) {
        match decl {
            Decl::Fn(fn_decl) => {
                let name = fn_decl.ident.sym.to_string();
                let binding = match FunctionDef::from_function(name.clone(), &fn_decl.function) {
                    Some(def) => Binding::Function(Arc::new(def)),
                    None => Binding::Local,
                };
                self.insert(name, binding);
            }
            Decl::Var(var) => {
                for declarator in &var.decls {
                    self.hoist_declarator(declarator, aliases);
                }
            }
            Decl::Class(class) => self.insert(class.ident.sym.to_string(), Binding::Local),
            _ => {}
        }
    }

    fn hoist_declarator(&mut self, declarator: &VarDeclarator, aliases: &ComponentAliases) {
        if let Pat::Ident(ident) = &declarator.name
            && let Some(init) = &declarator.init
        {
            let name = ident.id.sym.to_string();
            if let Some(def) = FunctionDef::from_initializer(&name, init) {
                self.insert(name, Binding::Function(Arc::new(def)));
                return;
            }
            if is_translator_init(init, aliases) {
                self.insert(name, Binding::Translator);
                return;
            }
        }
        for name in extract_binding_names(&declarator.name) {
            self.insert(name, Binding::Local);
        }
    }
}

/// `useGT()` or `await getGT()` through a recognized alias.
fn is_translator_init(init: &Expr, aliases: &ComponentAliases) -> bool {
    let call = match init {
        Expr::Call(call) => call,
        Expr::Await(await_expr) => match &*await_expr.arg {
            Expr::Call(call) => call,
            _ => return false,
        },
        Expr::Paren(paren) => return is_translator_init(&paren.expr, aliases),
        _ => return false,
    };
    let Callee::Expr(callee) = &call.callee else {
        return false;
    };
    let role = match &**callee {
        Expr::Ident(ident) => aliases.role_of(&ident.sym),
        Expr::Member(member) => match (&*member.obj, member.prop.as_ident()) {
            (Expr::Ident(obj), Some(prop)) => aliases.role_of_member(&obj.sym, &prop.sym),
            _ => None,
        },
        _ => None,
    };
    matches!(role, Some(ComponentRole::UseGT | ComponentRole::GetGT))
}

/// Stack of frames, innermost last.
#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    frames: Vec<Arc<ScopeFrame>>,
}

impl ScopeStack {
    pub fn new(root: ScopeFrame) -> Self {
        Self::from_shared(Arc::new(root))
    }

    /// Stack rooted at a frame shared with other stacks, such as a cached module frame.
    pub fn from_shared(root: Arc<ScopeFrame>) -> Self {
        Self { frames: vec![root] }
    }

    /// Enter a function body or block.
    pub fn enter(&mut self, frame: ScopeFrame) {
        self.frames.push(Arc::new(frame));
    }

    /// Leave the innermost frame. The root frame is never popped.
    pub fn exit(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Innermost binding of `name`, with the depth of the frame that declares it.
    pub fn lookup(&self, name: &str) -> Option<(usize, &Binding)> {
        self.frames
            .iter()
            .enumerate()
            .rev()
            .find_map(|(depth, frame)| frame.get(name).map(|binding| (depth, binding)))
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// The frames visible from the frame at `depth`, i.e. where a binding found
    /// at that depth was declared.
    pub fn visible_at(&self, depth: usize) -> ScopeStack {
        Self {
            frames: self.frames[..=depth.min(self.frames.len().saturating_sub(1))].to_vec(),
        }
    }

    #[cfg(test)]
    fn depth(&self) -> usize {
        self.frames.len()
    }
}

/// Extract all identifier names from a pattern (handles destructuring).
/// Supports: simple ident, object destructuring, array destructuring,
/// default values, rest patterns, and renamed destructuring.
pub fn extract_binding_names(pat: &Pat) -> Vec<String> {
    match pat {
        Pat::Ident(ident) => vec![ident.id.sym.to_string()],
        Pat::Object(obj) => obj
            .props
            .iter()
            .flat_map(|prop| match prop {
                ObjectPatProp::KeyValue(kv) => extract_binding_names(&kv.value),
                ObjectPatProp::Assign(assign) => vec![assign.key.sym.to_string()],
                ObjectPatProp::Rest(rest) => extract_binding_names(&rest.arg),
            })
            .collect(),
        Pat::Array(arr) => arr
            .elems
            .iter()
            .flatten()
            .flat_map(extract_binding_names)
            .collect(),
        Pat::Assign(assign) => extract_binding_names(&assign.left),
        Pat::Rest(rest) => extract_binding_names(&rest.arg),
        _ => vec![],
    }
}
