//! Map local identifiers to the translation component roles they stand for.

use std::collections::{HashMap, HashSet};

use crate::core::collect::imports::FileImports;

/// Exports of a translation package the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentRole {
    /// Translation marker.
    T,
    Var,
    Num,
    Currency,
    DateTime,
    Branch,
    Plural,
    Static,
    /// Hook returning a string translator.
    UseGT,
    /// Async getter returning a string translator.
    GetGT,
    /// Marks a string for translation outside components.
    Msg,
}

impl ComponentRole {
    pub fn from_export_name(name: &str) -> Option<Self> {
        Some(match name {
            "T" => ComponentRole::T,
            "Var" => ComponentRole::Var,
            "Num" => ComponentRole::Num,
            "Currency" => ComponentRole::Currency,
            "DateTime" => ComponentRole::DateTime,
            "Branch" => ComponentRole::Branch,
            "Plural" => ComponentRole::Plural,
            "Static" => ComponentRole::Static,
            "useGT" => ComponentRole::UseGT,
            "getGT" => ComponentRole::GetGT,
            "msg" => ComponentRole::Msg,
            _ => return None,
        })
    }

    /// Canonical name, used as the `type` of recognized components.
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentRole::T => "T",
            ComponentRole::Var => "Var",
            ComponentRole::Num => "Num",
            ComponentRole::Currency => "Currency",
            ComponentRole::DateTime => "DateTime",
            ComponentRole::Branch => "Branch",
            ComponentRole::Plural => "Plural",
            ComponentRole::Static => "Static",
            ComponentRole::UseGT => "useGT",
            ComponentRole::GetGT => "getGT",
            ComponentRole::Msg => "msg",
        }
    }

    /// Var, Num, Currency and DateTime.
    pub fn is_variable(self) -> bool {
        matches!(
            self,
            ComponentRole::Var
                | ComponentRole::Num
                | ComponentRole::Currency
                | ComponentRole::DateTime
        )
    }
}

/// Local names bound to translation package exports in one file.
#[derive(Debug, Clone, Default)]
pub struct ComponentAliases {
    /// `import { T as GTT }` gives `GTT -> T`.
    named: HashMap<String, ComponentRole>,
    /// `import * as GT` makes `GT.T` resolve.
    namespaces: HashSet<String>,
}

impl ComponentAliases {
    /// Build the alias map from a file's imports, keeping only recognized packages.
    ///
    /// Subpath imports count: `gt-next/client` belongs to `gt-next`.
    pub fn from_imports(imports: &FileImports, packages: &[String]) -> Self {
        let mut aliases = Self::default();
        for import in imports {
            if !is_recognized_package(&import.module_path, packages) {
                continue;
            }
            if import.imported_name == "*" {
                aliases.namespaces.insert(import.local_name.clone());
            } else if let Some(role) = ComponentRole::from_export_name(&import.imported_name) {
                aliases.named.insert(import.local_name.clone(), role);
            }
        }
        aliases
    }

    /// Role bound to a plain identifier.
    pub fn role_of(&self, local_name: &str) -> Option<ComponentRole> {
        self.named.get(local_name).copied()
    }

    /// Role of `namespace.member`.
    pub fn role_of_member(&self, namespace: &str, member: &str) -> Option<ComponentRole> {
        if self.namespaces.contains(namespace) {
            ComponentRole::from_export_name(member)
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.namespaces.is_empty()
    }
}

fn is_recognized_package(module_path: &str, packages: &[String]) -> bool {
    packages.iter().any(|package| {
        module_path == package
            || module_path
                .strip_prefix(package.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collect::imports::collect_imports;
    use crate::core::test_support::parse_module;

    fn packages() -> Vec<String> {
        vec!["gt-next".to_string(), "gt-react".to_string()]
    }

    #[test]
    fn test_aliases_from_imports() {
        let module = parse_module(
            r#"
            import { T as GTT, Var, useGT } from "gt-next";
            import { Static } from "gt-react/client";
            import { T as Other } from "some-other-lib";
            import * as GT from "gt-next/server";
            "#,
        );
        let aliases = ComponentAliases::from_imports(&collect_imports(&module), &packages());

        assert_eq!(aliases.role_of("GTT"), Some(ComponentRole::T));
        assert_eq!(aliases.role_of("Var"), Some(ComponentRole::Var));
        assert_eq!(aliases.role_of("useGT"), Some(ComponentRole::UseGT));
        assert_eq!(aliases.role_of("Static"), Some(ComponentRole::Static));
        assert_eq!(aliases.role_of("Other"), None);
        assert_eq!(aliases.role_of("T"), None);
        assert_eq!(aliases.role_of_member("GT", "Plural"), Some(ComponentRole::Plural));
        assert_eq!(aliases.role_of_member("GT", "Unknown"), None);
        assert_eq!(aliases.role_of_member("Other", "T"), None);
    }

    #[test]
    fn test_package_prefix_must_end_at_segment() {
        assert!(is_recognized_package("gt-next", &packages()));
        assert!(is_recognized_package("gt-next/client", &packages()));
        assert!(!is_recognized_package("gt-nextra", &packages()));
    }

    #[test]
    fn test_variable_roles() {
        assert!(ComponentRole::Currency.is_variable());
        assert!(!ComponentRole::Branch.is_variable());
        assert_eq!(ComponentRole::DateTime.as_str(), "DateTime");
    }
}
