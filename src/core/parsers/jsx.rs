use anyhow::{Result, anyhow};
use std::sync::Arc;
use swc_common::{FileName, Globals, SourceMap};
use swc_ecma_ast::Module;
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};

/// A parsed source file together with the map used to locate its spans.
pub struct ParsedJSX {
    pub module: Module,
    pub source_map: Arc<SourceMap>,
}

/// Parse JSX/TSX source code string into an AST.
///
/// Every file gets its own `SourceMap`, so parsing is safe to run in parallel
/// and positions from different files never share an offset space.
pub fn parse_jsx_source(code: String, file_path: &str) -> Result<ParsedJSX> {
    use swc_common::GLOBALS;

    let source_map = Arc::new(SourceMap::default());

    // Wrap in GLOBALS.set() for thread safety
    GLOBALS.set(&Globals::new(), || {
        let source_file = source_map.new_source_file(FileName::Real(file_path.into()).into(), code);

        let syntax = Syntax::Typescript(TsSyntax {
            tsx: true,
            ..Default::default()
        });

        let mut parser = Parser::new(syntax, StringInput::from(&*source_file), None);

        let module = parser
            .parse_module()
            .map_err(|e| anyhow!("Failed to parse tsx string: {:?}", e))?;

        Ok(ParsedJSX { module, source_map })
    })
}
