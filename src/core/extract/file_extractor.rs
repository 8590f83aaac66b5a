//! Single-pass extraction of one source file.
//!
//! The visitor keeps a lexical [`ScopeStack`] as it walks functions and
//! blocks, so component aliases and string translators are recognized only
//! where they are not shadowed. Every top-level translation marker is handed
//! to the emitter; string translation calls go to the ICU path.

use swc_ecma_ast::{
    ArrowExpr, BlockStmt, BlockStmtOrExpr, CallExpr, Callee, Expr, Function, JSXElement,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::core::collect::{Binding, ComponentRole, ScopeFrame, ScopeStack};
use crate::core::data::{SourceLocation, TranslationUnit};
use crate::core::extract::emitter::emit_marker;
use crate::core::extract::static_resolver::{ParsedFile, StaticResolver};
use crate::core::extract::strings::extract_string_call;
use crate::core::extract::tree_builder::{BuildScope, FileContext, tag_role};
use crate::core::parsers::jsx::parse_jsx_source;
use crate::issues::{Diagnostic, Diagnostics, Rule};

/// Everything extracted from one file.
#[derive(Debug, Default)]
pub struct FileExtraction {
    pub file_path: String,
    /// Units in source order.
    pub units: Vec<TranslationUnit>,
    pub diagnostics: Diagnostics,
}

impl FileExtraction {
    /// Result for a file that could not be read or parsed.
    pub fn failed(file_path: &str, message: impl Into<String>) -> Self {
        let mut diagnostics = Diagnostics::default();
        diagnostics.push(Diagnostic::new(
            Rule::ParseError,
            SourceLocation::file(file_path),
            message,
        ));
        Self {
            file_path: file_path.to_string(),
            units: Vec::new(),
            diagnostics,
        }
    }
}

/// Parse `code` and extract its translation units.
pub fn extract_source(file_path: &str, code: String, resolver: &StaticResolver) -> FileExtraction {
    let parsed = match parse_jsx_source(code, file_path) {
        Ok(parsed) => parsed,
        Err(err) => return FileExtraction::failed(file_path, format!("failed to parse: {}", err)),
    };
    let file = ParsedFile::new(file_path, parsed, &resolver.options().packages);
    if file.aliases.is_empty() {
        return FileExtraction {
            file_path: file_path.to_string(),
            ..Default::default()
        };
    }

    let mut extractor = FileExtractor {
        resolver,
        file: file.context(),
        scope: file.module_scope(),
        inside_marker: false,
        units: Vec::new(),
        diagnostics: Diagnostics::default(),
    };
    file.parsed.module.visit_with(&mut extractor);

    FileExtraction {
        file_path: file_path.to_string(),
        units: extractor.units,
        diagnostics: extractor.diagnostics,
    }
}

struct FileExtractor<'a> {
    resolver: &'a StaticResolver,
    file: FileContext<'a>,
    scope: ScopeStack,
    /// Inside a marker that was already emitted; nested markers are part of it.
    inside_marker: bool,
    units: Vec<TranslationUnit>,
    diagnostics: Diagnostics,
}

impl FileExtractor<'_> {
    /// `t(..)` for a translator in scope, or `msg(..)` through an alias.
    fn is_string_translation(&self, call: &CallExpr) -> bool {
        let Callee::Expr(callee) = &call.callee else {
            return false;
        };
        match &**callee {
            Expr::Ident(ident) => match self.scope.lookup(&ident.sym) {
                Some((_, binding)) => matches!(binding, Binding::Translator),
                None => self.file.aliases.role_of(&ident.sym) == Some(ComponentRole::Msg),
            },
            Expr::Member(member) => match (&*member.obj, member.prop.as_ident()) {
                (Expr::Ident(object), Some(prop)) if !self.scope.is_bound(&object.sym) => {
                    self.file.aliases.role_of_member(&object.sym, &prop.sym)
                        == Some(ComponentRole::Msg)
                }
                _ => false,
            },
            _ => false,
        }
    }

    fn emit(&mut self, marker: &JSXElement) {
        let cx = BuildScope {
            file: self.file,
            scope: self.scope.clone(),
        };
        let emission = emit_marker(self.resolver, marker, &cx);
        self.units.extend(emission.units);
        self.diagnostics.extend(emission.diagnostics);
    }
}

impl Visit for FileExtractor<'_> {
    fn visit_function(&mut self, function: &Function) {
        let body = function.body.as_ref().map(|body| body.stmts.as_slice());
        let params: Vec<_> = function.params.iter().map(|param| param.pat.clone()).collect();
        self.scope
            .enter(ScopeFrame::for_function(&params, body, self.file.aliases));
        function.params.visit_with(self);
        if let Some(body) = &function.body {
            body.stmts.visit_with(self);
        }
        self.scope.exit();
    }

    fn visit_arrow_expr(&mut self, arrow: &ArrowExpr) {
        let body = match &*arrow.body {
            BlockStmtOrExpr::BlockStmt(block) => Some(block.stmts.as_slice()),
            BlockStmtOrExpr::Expr(_) => None,
        };
        self.scope
            .enter(ScopeFrame::for_function(&arrow.params, body, self.file.aliases));
        arrow.params.visit_with(self);
        match &*arrow.body {
            BlockStmtOrExpr::BlockStmt(block) => block.stmts.visit_with(self),
            BlockStmtOrExpr::Expr(expr) => expr.visit_with(self),
        }
        self.scope.exit();
    }

    fn visit_block_stmt(&mut self, block: &BlockStmt) {
        self.scope
            .enter(ScopeFrame::for_block(&block.stmts, self.file.aliases));
        block.visit_children_with(self);
        self.scope.exit();
    }

    fn visit_jsx_element(&mut self, element: &JSXElement) {
        let is_marker = !self.inside_marker
            && tag_role(&element.opening.name, &self.file, &self.scope) == Some(ComponentRole::T);
        if !is_marker {
            element.visit_children_with(self);
            return;
        }

        self.emit(element);
        self.inside_marker = true;
        element.visit_children_with(self);
        self.inside_marker = false;
    }

    fn visit_call_expr(&mut self, call: &CallExpr) {
        if self.is_string_translation(call)
            && let Some(unit) = extract_string_call(call, &self.file, &mut self.diagnostics)
        {
            self.units.push(unit);
        }
        call.visit_children_with(self);
    }
}
