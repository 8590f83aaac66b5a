use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use rayon::prelude::*;

use crate::{
    config::{CONFIG_FILE_NAME, Config, load_config},
    core::{
        data::TranslationUnit,
        extract::{
            ExtractOptions, FileExtraction, FsHost, ModuleHost, StaticResolver, extract_source,
        },
        file_scanner::{ScanOptions, scan_files},
    },
    utils::normalize_path,
};

/// Everything extracted in one run.
#[derive(Debug, Default)]
pub struct ExtractResult {
    /// Per-file results, sorted by path.
    pub files: Vec<FileExtraction>,
}

impl ExtractResult {
    /// All units in file order, then source order.
    pub fn units(&self) -> impl Iterator<Item = &TranslationUnit> {
        self.files.iter().flat_map(|file| file.units.iter())
    }

    pub fn error_count(&self) -> usize {
        self.files.iter().map(|f| f.diagnostics.errors.len()).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.files.iter().map(|f| f.diagnostics.warnings.len()).sum()
    }
}

/// Configuration, the files to process and the resolver shared by all of them.
///
/// Configuration priority:
/// 1. `--source-root` decides where `.jsxlaterc.json` is looked up
/// 2. `.jsxlaterc.json`
/// 3. built-in defaults
pub struct ExtractContext {
    pub config: Config,
    /// Directory the config was looked up from.
    pub root_dir: PathBuf,
    /// Source files to extract, sorted.
    pub files: BTreeSet<String>,
    pub verbose: bool,
    resolver: StaticResolver,
}

impl ExtractContext {
    /// Load configuration and scan source files under `source_root`.
    pub fn new(source_root: Option<&Path>, verbose: bool) -> Result<Self> {
        Self::with_host(source_root, verbose, Arc::new(FsHost))
    }

    /// Like [`ExtractContext::new`], resolving cross-file functions through `host`.
    pub fn with_host(
        source_root: Option<&Path>,
        verbose: bool,
        host: Arc<dyn ModuleHost>,
    ) -> Result<Self> {
        let root_dir = source_root.map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        let config_result = load_config(&root_dir)?;
        if verbose && !config_result.from_file {
            eprintln!("note: no {} found, using default configuration", CONFIG_FILE_NAME);
        }
        let config = config_result.config;

        let mut scan_root = normalize_path(&root_dir.join(&config.source_root));
        if scan_root.as_os_str().is_empty() {
            scan_root = PathBuf::from(".");
        }
        let scan_result = scan_files(
            &scan_root,
            &ScanOptions {
                includes: &config.includes,
                ignores: &config.ignores,
                ignore_test_files: config.ignore_test_files,
                verbose,
            },
        );
        if scan_result.skipped_count > 0 {
            eprintln!(
                "warning: {} path(s) skipped due to access errors{}",
                scan_result.skipped_count,
                if verbose { "" } else { " (use -v for details)" }
            );
        }

        let resolver =
            StaticResolver::new(host, ExtractOptions::from_config(&config)).with_verbose(verbose);

        Ok(Self {
            config,
            root_dir,
            files: scan_result.files,
            verbose,
            resolver,
        })
    }

    /// Extract every scanned file in parallel.
    ///
    /// A file that cannot be read or parsed yields a file-scoped error and
    /// does not affect the others.
    pub fn extract(&self) -> ExtractResult {
        let mut files: Vec<FileExtraction> = self
            .files
            .par_iter()
            .map(|file_path| match std::fs::read_to_string(file_path) {
                Ok(code) => extract_source(file_path, code, &self.resolver),
                Err(e) => FileExtraction::failed(file_path, format!("failed to read file: {}", e)),
            })
            .collect();
        files.sort_by(|a, b| a.file_path.cmp(&b.file_path));

        if self.verbose {
            for file in &files {
                let file_errors = file.diagnostics.errors.iter();
                for error in file_errors.filter(|e| e.location.is_file_scoped()) {
                    eprintln!("note: skipped {}: {}", error.location, error.message);
                }
            }
        }

        ExtractResult { files }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;
    use crate::issues::Rule;

    #[test]
    fn test_extracts_all_files_in_path_order() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(
            src.join("b.tsx"),
            r#"import { T } from "gt-next";
            export const B = () => <T>Bee</T>;"#,
        )
        .unwrap();
        fs::write(
            src.join("a.tsx"),
            r#"import { T } from "gt-next";
            export const A = () => <T>Ay</T>;"#,
        )
        .unwrap();
        fs::write(src.join("broken.tsx"), "const = <").unwrap();

        let ctx = ExtractContext::new(Some(dir.path()), false).unwrap();
        assert_eq!(ctx.files.len(), 3);

        let result = ctx.extract();
        let paths: Vec<_> = result
            .files
            .iter()
            .map(|f| Path::new(&f.file_path).file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(paths, vec!["a.tsx", "b.tsx", "broken.tsx"]);

        let sources: Vec<_> = result
            .units()
            .map(|unit| serde_json::to_string(&unit.source).unwrap())
            .collect();
        assert_eq!(sources, vec![r#""Ay""#, r#""Bee""#]);

        assert_eq!(result.error_count(), 1);
        assert_eq!(result.files[2].diagnostics.errors[0].rule, Rule::ParseError);
    }

    #[test]
    fn test_config_packages_are_used() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "includes": ["app"], "packages": ["@acme/i18n"] }"#,
        )
        .unwrap();
        let app = dir.path().join("app");
        fs::create_dir_all(&app).unwrap();
        fs::write(
            app.join("page.tsx"),
            r#"import { T } from "@acme/i18n/client";
            import { T as Other } from "gt-next";
            export const A = () => <><T>Mine</T><Other>Not mine</Other></>;"#,
        )
        .unwrap();

        let ctx = ExtractContext::new(Some(dir.path()), false).unwrap();
        let result = ctx.extract();
        assert_eq!(result.units().count(), 1);
        assert_eq!(result.warning_count(), 0);
    }
}
