//! Import and re-export declarations of a single file.

use swc_ecma_ast::{
    ExportSpecifier, ImportDecl, ImportSpecifier, Module, ModuleDecl, ModuleExportName,
    ModuleItem,
};

/// Import statement information for cross-file resolution.
///
/// ```typescript
/// import { T as GTT } from "gt-next";       // local "GTT", imported "T"
/// import getLabel from "./labels";          // local "getLabel", imported "default"
/// import * as GT from "gt-react";           // local "GT", imported "*"
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportInfo {
    /// Local name in the importing file.
    pub local_name: String,
    /// Original exported name, `"default"` for default imports, `"*"` for namespaces.
    pub imported_name: String,
    /// Import source as written.
    pub module_path: String,
}

/// All imports for a single file, in declaration order.
pub type FileImports = Vec<ImportInfo>;

/// A name this file exports on behalf of another binding.
///
/// ```typescript
/// export * from "./helpers";                 // star, module "./helpers"
/// export { label as title } from "./labels"; // exported "title", local "label"
/// export { greet };                          // exported "greet", local "greet", no module
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReExport {
    Star {
        module_path: String,
    },
    Named {
        exported_name: String,
        local_name: String,
        module_path: Option<String>,
    },
}

/// Find the import that binds `local_name`.
pub fn find_import<'a>(imports: &'a FileImports, local_name: &str) -> Option<&'a ImportInfo> {
    imports.iter().find(|import| import.local_name == local_name)
}

/// Collect every top-level import declaration.
pub fn collect_imports(module: &Module) -> FileImports {
    let mut imports = FileImports::new();
    for item in &module.body {
        if let ModuleItem::ModuleDecl(ModuleDecl::Import(decl)) = item {
            collect_import(decl, &mut imports);
        }
    }
    imports
}

fn collect_import(node: &ImportDecl, imports: &mut FileImports) {
    if node.type_only {
        return;
    }
    let Some(module_path) = node.src.value.as_str() else {
        return;
    };
    for specifier in &node.specifiers {
        let (local_name, imported_name) = match specifier {
            ImportSpecifier::Named(named) => {
                if named.is_type_only {
                    continue;
                }
                let local_name = named.local.sym.to_string();
                let imported_name = named
                    .imported
                    .as_ref()
                    .map(export_name)
                    .unwrap_or_else(|| local_name.clone());
                (local_name, imported_name)
            }
            ImportSpecifier::Default(default) => {
                (default.local.sym.to_string(), "default".to_string())
            }
            ImportSpecifier::Namespace(ns) => (ns.local.sym.to_string(), "*".to_string()),
        };
        imports.push(ImportInfo {
            local_name,
            imported_name,
            module_path: module_path.to_string(),
        });
    }
}

/// Collect `export * from`, `export { .. } from` and local `export { .. }` lists.
pub fn collect_re_exports(module: &Module) -> Vec<ReExport> {
    let mut re_exports = Vec::new();
    for item in &module.body {
        let ModuleItem::ModuleDecl(decl) = item else {
            continue;
        };
        match decl {
            ModuleDecl::ExportAll(all) if !all.type_only => {
                if let Some(path) = all.src.value.as_str() {
                    re_exports.push(ReExport::Star {
                        module_path: path.to_string(),
                    });
                }
            }
            ModuleDecl::ExportNamed(named) if !named.type_only => {
                let module_path = named
                    .src
                    .as_ref()
                    .and_then(|src| src.value.as_str())
                    .map(str::to_string);
                for specifier in &named.specifiers {
                    match specifier {
                        ExportSpecifier::Named(spec) if !spec.is_type_only => {
                            let local_name = export_name(&spec.orig);
                            let exported_name = spec
                                .exported
                                .as_ref()
                                .map(export_name)
                                .unwrap_or_else(|| local_name.clone());
                            re_exports.push(ReExport::Named {
                                exported_name,
                                local_name,
                                module_path: module_path.clone(),
                            });
                        }
                        ExportSpecifier::Namespace(ns) => {
                            if let Some(path) = &module_path {
                                re_exports.push(ReExport::Named {
                                    exported_name: export_name(&ns.name),
                                    local_name: "*".to_string(),
                                    module_path: Some(path.clone()),
                                });
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
    re_exports
}

fn export_name(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::Ident(ident) => ident.sym.to_string(),
        ModuleExportName::Str(s) => s.value.to_string_lossy().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::parse_module;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collect_imports() {
        let module = parse_module(
            r#"
            import { T, Var as V } from "gt-next";
            import getLabel from "./labels";
            import * as GT from "gt-react/client";
            import type { Props } from "./types";
            "#,
        );
        let imports = collect_imports(&module);

        assert_eq!(imports.len(), 4);
        assert_eq!(imports[0].local_name, "T");
        assert_eq!(imports[0].imported_name, "T");
        assert_eq!(imports[1].local_name, "V");
        assert_eq!(imports[1].imported_name, "Var");
        assert_eq!(imports[2].imported_name, "default");
        assert_eq!(imports[2].module_path, "./labels");
        assert_eq!(imports[3].local_name, "GT");
        assert_eq!(imports[3].imported_name, "*");
        assert_eq!(find_import(&imports, "V").map(|i| i.imported_name.as_str()), Some("Var"));
        assert!(find_import(&imports, "Props").is_none());
    }

    #[test]
    fn test_collect_re_exports() {
        let module = parse_module(
            r#"
            import { greet } from "./greet";
            export * from "./helpers";
            export { label as title } from "./labels";
            export { greet };
            "#,
        );
        let re_exports = collect_re_exports(&module);

        assert_eq!(
            re_exports,
            vec![
                ReExport::Star {
                    module_path: "./helpers".into()
                },
                ReExport::Named {
                    exported_name: "title".into(),
                    local_name: "label".into(),
                    module_path: Some("./labels".into()),
                },
                ReExport::Named {
                    exported_name: "greet".into(),
                    local_name: "greet".into(),
                    module_path: None,
                },
            ]
        );
    }
}
