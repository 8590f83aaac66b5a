//! Cross-file resolution of functions called inside `<Static>`.
//!
//! A call is resolved to the function it names: a declaration in an enclosing
//! scope, or an import that leads, possibly through re-exports, to a function in
//! another file. The function's `return` statements are then turned into
//! alternatives: strings, JSX built by a nested [`TreeBuilder`], or the
//! alternatives of further calls.
//!
//! Remote files and remote function results are cached in the shared
//! [`StaticResolver`], so a helper used from many call sites is read, parsed
//! and resolved once per run.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use swc_common::{BytePos, Spanned};
use swc_ecma_ast::{CallExpr, Callee, Expr, MemberExpr, ReturnStmt, Stmt};

use crate::core::collect::{
    Binding, ComponentAliases, FileImports, FunctionBody, FunctionDef, ReExport, ScopeFrame,
    ScopeStack, collect_imports, collect_re_exports, find_import,
};
use crate::core::data::SanitizedValue;
use crate::core::evaluate::static_string_value;
use crate::core::extract::ExtractOptions;
use crate::core::extract::host::ModuleHost;
use crate::core::extract::shape::{Alternative, fill_slots, slot_combinations, union_into};
use crate::core::extract::tree_builder::{BuildScope, FileContext, TreeBuilder};
use crate::core::parsers::jsx::{ParsedJSX, parse_jsx_source};
use crate::issues::{Diagnostics, Rule};
use crate::utils::normalize_path_str;

/// `(normalized file path, exported name)`, the cache key of a remote function.
pub type FunctionKey = (String, String);

/// `(normalized file path, start of the function)`, identifying one declaration
/// on the inlining call stack.
pub type DeclarationKey = (String, BytePos);

/// A parsed file with the binding information resolution needs.
pub struct ParsedFile {
    pub path: String,
    pub parsed: ParsedJSX,
    pub imports: FileImports,
    pub re_exports: Vec<ReExport>,
    pub aliases: ComponentAliases,
    pub module_frame: Arc<ScopeFrame>,
}

impl ParsedFile {
    pub fn new(path: impl Into<String>, parsed: ParsedJSX, packages: &[String]) -> Self {
        let imports = collect_imports(&parsed.module);
        let re_exports = collect_re_exports(&parsed.module);
        let aliases = ComponentAliases::from_imports(&imports, packages);
        let module_frame = Arc::new(ScopeFrame::for_module(&parsed.module.body, &aliases));
        Self {
            path: path.into(),
            parsed,
            imports,
            re_exports,
            aliases,
            module_frame,
        }
    }

    pub fn context(&self) -> FileContext<'_> {
        FileContext {
            path: &self.path,
            source_map: &self.parsed.source_map,
            imports: &self.imports,
            aliases: &self.aliases,
        }
    }

    /// Scope stack holding only this file's top-level bindings.
    pub fn module_scope(&self) -> ScopeStack {
        ScopeStack::from_shared(self.module_frame.clone())
    }
}

/// What a remote function produced, with the diagnostics found on the way.
///
/// Diagnostics are replayed into every call site that hits the cache.
#[derive(Debug)]
pub struct FunctionContent {
    pub alternatives: Vec<Alternative>,
    pub diagnostics: Diagnostics,
}

/// Import resolution, remote file parsing and function memoization, shared by
/// every file of a run.
pub struct StaticResolver {
    host: Arc<dyn ModuleHost>,
    options: ExtractOptions,
    verbose: bool,
    import_paths: RwLock<HashMap<(String, String), Option<String>>>,
    parsed_files: RwLock<HashMap<String, Option<Arc<ParsedFile>>>>,
    functions: RwLock<HashMap<FunctionKey, Option<Arc<FunctionContent>>>>,
}

impl StaticResolver {
    pub fn new(host: Arc<dyn ModuleHost>, options: ExtractOptions) -> Self {
        Self {
            host,
            options,
            verbose: false,
            import_paths: RwLock::default(),
            parsed_files: RwLock::default(),
            functions: RwLock::default(),
        }
    }

    /// Print notes about unreadable files and unresolved imports to stderr.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Resolve an import specifier to a normalized path, cached by `(from_file, specifier)`.
    pub fn resolve_import(&self, from_file: &str, specifier: &str) -> Option<String> {
        let key = (from_file.to_string(), specifier.to_string());
        if let Some(cached) = read(&self.import_paths).get(&key) {
            return cached.clone();
        }
        let resolved = self
            .host
            .resolve_import(from_file, specifier)
            .map(|path| normalize_path_str(&path));
        if resolved.is_none() && self.verbose {
            eprintln!("note: cannot resolve import '{}' from {}", specifier, from_file);
        }
        write(&self.import_paths).insert(key, resolved.clone());
        resolved
    }

    /// Read and parse a file once. Unreadable or unparsable files are `None`.
    pub fn parsed_file(&self, path: &str) -> Option<Arc<ParsedFile>> {
        if let Some(cached) = read(&self.parsed_files).get(path) {
            return cached.clone();
        }
        let loaded = self.load_file(path);
        write(&self.parsed_files)
            .entry(path.to_string())
            .or_insert(loaded)
            .clone()
    }

    fn load_file(&self, path: &str) -> Option<Arc<ParsedFile>> {
        let code = match self.host.read_file(path) {
            Ok(code) => code,
            Err(err) => {
                if self.verbose {
                    eprintln!("note: cannot read {}: {}", path, err);
                }
                return None;
            }
        };
        match parse_jsx_source(code, path) {
            Ok(parsed) => Some(Arc::new(ParsedFile::new(path, parsed, &self.options.packages))),
            Err(err) => {
                if self.verbose {
                    eprintln!("note: cannot parse {}: {}", path, err);
                }
                None
            }
        }
    }

    /// `Some(None)` when the function was searched for and not found.
    fn cached_function(&self, key: &FunctionKey) -> Option<Option<Arc<FunctionContent>>> {
        read(&self.functions).get(key).cloned()
    }

    fn store_function(&self, key: FunctionKey, content: Option<Arc<FunctionContent>>) {
        write(&self.functions).entry(key).or_insert(content);
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Outcome of looking up a called function.
enum Lookup {
    Found(Vec<Alternative>),
    NotFound,
    /// The function is already being inlined further up the call stack.
    Recursive,
}

impl TreeBuilder<'_> {
    /// Alternatives produced by calling a function inside `<Static>`.
    ///
    /// Never empty: an unresolved or recursive call contributes one empty alternative.
    pub(super) fn call_alternatives(
        &mut self,
        call: &CallExpr,
        cx: &BuildScope,
    ) -> Vec<Alternative> {
        let lookup = match &call.callee {
            Callee::Expr(callee) => match &**callee {
                Expr::Ident(ident) => self.lookup_identifier(&ident.sym, cx),
                Expr::Member(member) => self.lookup_namespace_member(member, cx),
                _ => Lookup::NotFound,
            },
            _ => Lookup::NotFound,
        };

        let mut alternatives = match lookup {
            Lookup::Found(alternatives) => alternatives,
            Lookup::NotFound => {
                self.diagnostics.push(cx.file.diagnostic(
                    Rule::UnresolvedFunction,
                    call.span.lo,
                    format!(
                        "cannot resolve `{}` used inside <Static>; it contributes no content",
                        cx.file.snippet(call.callee.span())
                    ),
                ));
                Vec::new()
            }
            Lookup::Recursive => {
                self.diagnostics.push(cx.file.diagnostic(
                    Rule::RecursiveStaticCall,
                    call.span.lo,
                    format!(
                        "`{}` is called recursively from a function used inside <Static>",
                        cx.file.snippet(call.callee.span())
                    ),
                ));
                Vec::new()
            }
        };
        if alternatives.is_empty() {
            alternatives.push(Vec::new());
        }
        alternatives
    }

    fn lookup_identifier(&mut self, name: &str, cx: &BuildScope) -> Lookup {
        match cx.scope.lookup(name) {
            Some((depth, Binding::Function(def))) => {
                let def = def.clone();
                let scope = cx.scope.visible_at(depth);
                self.enter_function(&def, scope, cx.file)
            }
            Some(_) => Lookup::NotFound,
            None => match find_import(cx.file.imports, name) {
                Some(import) if import.imported_name != "*" => {
                    let mut trail = Vec::new();
                    self.follow_import(
                        cx.file.path,
                        &import.module_path,
                        &import.imported_name,
                        &mut trail,
                    )
                }
                _ => Lookup::NotFound,
            },
        }
    }

    /// `helpers.getLabel()` where `helpers` is a namespace import.
    fn lookup_namespace_member(&mut self, member: &MemberExpr, cx: &BuildScope) -> Lookup {
        let (Expr::Ident(object), Some(prop)) = (&*member.obj, member.prop.as_ident()) else {
            return Lookup::NotFound;
        };
        if cx.scope.is_bound(&object.sym) {
            return Lookup::NotFound;
        }
        match find_import(cx.file.imports, &object.sym) {
            Some(import) if import.imported_name == "*" => {
                let mut trail = Vec::new();
                self.follow_import(cx.file.path, &import.module_path, &prop.sym, &mut trail)
            }
            _ => Lookup::NotFound,
        }
    }

    fn follow_import(
        &mut self,
        from_file: &str,
        specifier: &str,
        export_name: &str,
        trail: &mut Vec<FunctionKey>,
    ) -> Lookup {
        match self.resolver.resolve_import(from_file, specifier) {
            Some(path) => self.remote_function(&path, export_name, trail),
            None => Lookup::NotFound,
        }
    }

    /// Resolve `name` as exported by the file at `path`.
    ///
    /// `trail` holds the exports being followed in this chain, so circular
    /// re-exports end instead of looping.
    fn remote_function(&mut self, path: &str, name: &str, trail: &mut Vec<FunctionKey>) -> Lookup {
        let key = (path.to_string(), name.to_string());
        if let Some(cached) = self.resolver.cached_function(&key) {
            return match cached {
                Some(content) => {
                    self.diagnostics.extend(content.diagnostics.clone());
                    Lookup::Found(content.alternatives.clone())
                }
                None => Lookup::NotFound,
            };
        }
        if trail.contains(&key) {
            return Lookup::NotFound;
        }
        let Some(file) = self.resolver.parsed_file(path) else {
            self.resolver.store_function(key, None);
            return Lookup::NotFound;
        };

        trail.push(key.clone());
        let outer = std::mem::take(&mut self.diagnostics);
        let lookup = self.search_file(&file, name, trail);
        let diagnostics = std::mem::replace(&mut self.diagnostics, outer);
        trail.pop();

        match lookup {
            Lookup::Found(alternatives) => {
                self.diagnostics.extend(diagnostics.clone());
                // A cycle depends on the call stack it was reached from.
                let hit_cycle = diagnostics
                    .errors
                    .iter()
                    .any(|error| error.rule == Rule::RecursiveStaticCall);
                if !hit_cycle {
                    let content = FunctionContent {
                        alternatives: alternatives.clone(),
                        diagnostics,
                    };
                    self.resolver.store_function(key, Some(Arc::new(content)));
                }
                Lookup::Found(alternatives)
            }
            Lookup::NotFound => {
                self.resolver.store_function(key, None);
                Lookup::NotFound
            }
            Lookup::Recursive => {
                self.diagnostics.extend(diagnostics);
                Lookup::Recursive
            }
        }
    }

    /// A top-level function of the file, or the first re-export that leads to one.
    fn search_file(
        &mut self,
        file: &ParsedFile,
        name: &str,
        trail: &mut Vec<FunctionKey>,
    ) -> Lookup {
        if let Some(Binding::Function(def)) = file.module_frame.get(name) {
            let def = def.clone();
            return self.enter_function(&def, file.module_scope(), file.context());
        }

        for re_export in &file.re_exports {
            let lookup = match re_export {
                ReExport::Star { module_path } if name != "default" => {
                    self.follow_import(&file.path, module_path, name, trail)
                }
                ReExport::Named {
                    exported_name,
                    local_name,
                    module_path: Some(module_path),
                } if exported_name == name => {
                    self.follow_import(&file.path, module_path, local_name, trail)
                }
                ReExport::Named {
                    exported_name,
                    local_name,
                    module_path: None,
                } if exported_name == name => {
                    if local_name != name
                        && matches!(file.module_frame.get(local_name), Some(Binding::Function(_)))
                    {
                        self.remote_function(&file.path, local_name, trail)
                    } else {
                        match find_import(&file.imports, local_name) {
                            Some(import) if import.imported_name != "*" => self.follow_import(
                                &file.path,
                                &import.module_path,
                                &import.imported_name,
                                trail,
                            ),
                            _ => Lookup::NotFound,
                        }
                    }
                }
                _ => Lookup::NotFound,
            };
            if !matches!(lookup, Lookup::NotFound) {
                return lookup;
            }
        }
        Lookup::NotFound
    }

    /// Inline a function body in `scope`, the scope the function was declared in.
    fn enter_function(
        &mut self,
        def: &FunctionDef,
        mut scope: ScopeStack,
        file: FileContext<'_>,
    ) -> Lookup {
        let key = (normalize_path_str(file.path), def.span.lo);
        if self.call_stack.contains(&key) {
            return Lookup::Recursive;
        }
        scope.enter(def.body_frame(file.aliases));
        let cx = BuildScope { file, scope };
        self.call_stack.push(key);
        let alternatives = self.function_alternatives(def, &cx);
        self.call_stack.pop();
        Lookup::Found(alternatives)
    }

    fn function_alternatives(&mut self, def: &FunctionDef, cx: &BuildScope) -> Vec<Alternative> {
        match &def.body {
            FunctionBody::Expr(expr) => self.return_alternatives(expr, cx),
            FunctionBody::Block(block) => {
                let mut returns = Vec::new();
                collect_returns(&block.stmts, &mut returns);
                let mut alternatives = Vec::new();
                for ret in returns {
                    match &ret.arg {
                        Some(arg) => {
                            union_into(&mut alternatives, self.return_alternatives(arg, cx))
                        }
                        None => self.invalid_return(ret.span.lo, "return", cx),
                    }
                }
                alternatives
            }
        }
    }

    fn return_alternatives(&mut self, expr: &Expr, cx: &BuildScope) -> Vec<Alternative> {
        match expr {
            Expr::Paren(paren) => self.return_alternatives(&paren.expr, cx),
            Expr::Call(call) => self.call_alternatives(call, cx),
            Expr::Await(await_expr) if matches!(&*await_expr.arg, Expr::Call(_)) => {
                self.return_alternatives(&await_expr.arg, cx)
            }
            Expr::Cond(cond) => {
                let mut alternatives = self.return_alternatives(&cond.cons, cx);
                union_into(&mut alternatives, self.return_alternatives(&cond.alt, cx));
                alternatives
            }
            Expr::JSXElement(_) | Expr::JSXFragment(_) => self.jsx_alternatives(expr, cx),
            _ => match static_string_value(expr) {
                Some(value) => vec![vec![SanitizedValue::Static(value)]],
                None => {
                    let source = cx.file.snippet(expr.span());
                    self.invalid_return(expr.span().lo, &source, cx);
                    Vec::new()
                }
            },
        }
    }

    /// Returned JSX is built as if it were written inside the `<Static>` itself.
    fn jsx_alternatives(&mut self, expr: &Expr, cx: &BuildScope) -> Vec<Alternative> {
        let mut nested = self.nested();
        let tree = match expr {
            Expr::JSXElement(element) => nested.build_element(element, cx),
            Expr::JSXFragment(fragment) => Some(nested.build_fragment(fragment, cx)),
            _ => None,
        };
        let TreeBuilder {
            unwrapped,
            slots,
            diagnostics,
            ..
        } = nested;
        self.diagnostics.extend(diagnostics);

        if !unwrapped.is_empty() {
            let sources: Vec<&str> = unwrapped.iter().map(|u| u.source.as_str()).collect();
            self.diagnostics.push(cx.file.diagnostic(
                Rule::UnwrappedExpression,
                expr.span().lo,
                format!(
                    "function used inside <Static> returns children that could change at runtime: {}",
                    sources.join(", ")
                ),
            ));
            return Vec::new();
        }
        let Some(tree) = tree else {
            return Vec::new();
        };

        let mut alternatives = Vec::new();
        for combination in slot_combinations(&slots) {
            union_into(&mut alternatives, vec![fill_slots(&tree, &combination)]);
        }
        alternatives
    }

    fn invalid_return(&mut self, pos: BytePos, source: &str, cx: &BuildScope) {
        self.diagnostics.push(cx.file.diagnostic(
            Rule::InvalidStaticReturn,
            pos,
            format!(
                "invalid return value for a function used inside <Static>: `{}`",
                source
            ),
        ));
    }
}

/// `return` statements of a function body, not descending into nested functions.
fn collect_returns<'a>(stmts: &'a [Stmt], returns: &mut Vec<&'a ReturnStmt>) {
    for stmt in stmts {
        collect_stmt_returns(stmt, returns);
    }
}

fn collect_stmt_returns<'a>(stmt: &'a Stmt, returns: &mut Vec<&'a ReturnStmt>) {
    match stmt {
        Stmt::Return(ret) => returns.push(ret),
        Stmt::Block(block) => collect_returns(&block.stmts, returns),
        Stmt::If(if_stmt) => {
            collect_stmt_returns(&if_stmt.cons, returns);
            if let Some(alt) = &if_stmt.alt {
                collect_stmt_returns(alt, returns);
            }
        }
        Stmt::Try(try_stmt) => {
            collect_returns(&try_stmt.block.stmts, returns);
            if let Some(handler) = &try_stmt.handler {
                collect_returns(&handler.body.stmts, returns);
            }
            if let Some(finalizer) = &try_stmt.finalizer {
                collect_returns(&finalizer.stmts, returns);
            }
        }
        Stmt::Switch(switch) => {
            for case in &switch.cases {
                collect_returns(&case.cons, returns);
            }
        }
        Stmt::Labeled(labeled) => collect_stmt_returns(&labeled.body, returns),
        Stmt::While(s) => collect_stmt_returns(&s.body, returns),
        Stmt::DoWhile(s) => collect_stmt_returns(&s.body, returns),
        Stmt::For(s) => collect_stmt_returns(&s.body, returns),
        Stmt::ForIn(s) => collect_stmt_returns(&s.body, returns),
        Stmt::ForOf(s) => collect_stmt_returns(&s.body, returns),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extract::extract_source;
    use crate::core::test_support::{MemoryHost, parse_module};

    fn returns_of(code: &str) -> usize {
        let module = parse_module(code);
        let body = module.body[0]
            .as_stmt()
            .and_then(|stmt| stmt.as_decl())
            .and_then(|decl| decl.as_fn_decl())
            .and_then(|decl| decl.function.body.clone())
            .unwrap();
        let mut returns = Vec::new();
        collect_returns(&body.stmts, &mut returns);
        returns.len()
    }

    #[test]
    fn test_collect_returns_skips_nested_functions() {
        let count = returns_of(
            r#"function pick(x) {
                if (x) { return "a"; } else if (y) return "b";
                switch (x) { case 1: return "c"; default: break; }
                try { return "d"; } catch { return "e"; } finally {}
                const inner = () => { return "nested"; };
                function other() { return "nested"; }
                return "f";
            }"#,
        );
        assert_eq!(count, 6);
    }

    #[test]
    fn test_functions_on_a_cycle_are_not_cached() {
        let host = MemoryHost::new()
            .with_file(
                "src/x.ts",
                r#"import { b } from "./y";
                export function a() { return b(); }"#,
            )
            .with_file(
                "src/y.ts",
                r#"import { a } from "./x";
                export function b() { return a(); }"#,
            )
            .with_file("src/z.ts", "export function c() { return 'plain'; }");
        let resolver = StaticResolver::new(host.clone().into_shared(), ExtractOptions::default());

        let extraction = extract_source(
            "src/page.tsx",
            r#"import { T, Static } from "gt-next";
            import { a } from "./x";
            import { c } from "./z";
            export const Page = () => <T><Static>{a()}</Static> <Static>{c()}</Static></T>;"#
                .to_string(),
            &resolver,
        );
        assert_eq!(extraction.diagnostics.errors.len(), 1);

        let key = |path: &str, name: &str| (path.to_string(), name.to_string());
        assert!(resolver.cached_function(&key("src/x.ts", "a")).is_none());
        assert!(resolver.cached_function(&key("src/y.ts", "b")).is_none());
        assert!(matches!(
            resolver.cached_function(&key("src/z.ts", "c")),
            Some(Some(_))
        ));
    }

    #[test]
    fn test_files_and_imports_are_cached() {
        let host = MemoryHost::new()
            .with_file("src/labels.ts", "export function label() { return 'x'; }");
        let resolver = StaticResolver::new(host.clone().into_shared(), ExtractOptions::default());

        let first = resolver.resolve_import("src/page.tsx", "./labels");
        let second = resolver.resolve_import("src/page.tsx", "./labels");
        assert_eq!(first.as_deref(), Some("src/labels.ts"));
        assert_eq!(first, second);

        assert!(resolver.parsed_file("src/labels.ts").is_some());
        assert!(resolver.parsed_file("src/labels.ts").is_some());
        assert_eq!(host.reads("src/labels.ts"), 1);

        assert!(resolver.parsed_file("src/missing.ts").is_none());
        assert!(resolver.parsed_file("src/missing.ts").is_none());
        assert_eq!(host.reads("src/missing.ts"), 1);
    }
}
