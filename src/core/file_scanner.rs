use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use colored::Colorize;
use glob::{Pattern, glob};
use walkdir::WalkDir;

use crate::config::TEST_FILE_PATTERNS;

const SCRIPT_EXTENSIONS: [&str; 4] = ["tsx", "ts", "jsx", "js"];

/// Patterns without `*` or `?` are literal paths, so `app/[locale]` needs no escaping.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Source files found under the scan roots.
pub struct ScanResult {
    /// Sorted, so extraction output does not depend on directory order.
    pub files: BTreeSet<String>,
    /// Paths that could not be accessed.
    pub skipped_count: usize,
}

/// Options controlling which files are scanned.
pub struct ScanOptions<'a> {
    pub includes: &'a [String],
    pub ignores: &'a [String],
    pub ignore_test_files: bool,
    pub verbose: bool,
}

fn warn(verbose: bool, message: std::fmt::Arguments) {
    if verbose {
        eprintln!("{} {}", "warning:".bold().yellow(), message);
    }
}

pub fn scan_files(base_dir: &Path, options: &ScanOptions) -> ScanResult {
    let mut literal_ignores: Vec<PathBuf> = Vec::new();
    let mut ignore_globs: Vec<Pattern> = Vec::new();

    for pattern in options.ignores {
        if !is_glob_pattern(pattern) {
            literal_ignores.push(base_dir.join(pattern));
            continue;
        }
        match Pattern::new(pattern) {
            Ok(compiled) => ignore_globs.push(compiled),
            Err(e) => warn(
                options.verbose,
                format_args!("Invalid ignore pattern '{}': {}", pattern, e),
            ),
        }
    }
    if options.ignore_test_files {
        ignore_globs.extend(TEST_FILE_PATTERNS.iter().filter_map(|p| Pattern::new(p).ok()));
    }

    let mut files = BTreeSet::new();
    let mut skipped_count = 0;

    for dir in scan_roots(base_dir, options) {
        for entry in WalkDir::new(dir) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    skipped_count += 1;
                    warn(options.verbose, format_args!("Cannot access path: {}", e));
                    continue;
                }
            };
            let path = entry.path();
            let path_str = path.to_string_lossy();

            if literal_ignores.iter().any(|ignore| path.starts_with(ignore))
                || ignore_globs.iter().any(|p| p.matches(&path_str))
            {
                continue;
            }
            if path.is_file() && is_script_file(path) {
                files.insert(path_str.into_owned());
            }
        }
    }

    ScanResult {
        files,
        skipped_count,
    }
}

/// Directories named by `includes`, or the base directory when there are none.
fn scan_roots(base_dir: &Path, options: &ScanOptions) -> Vec<PathBuf> {
    if options.includes.is_empty() {
        return vec![base_dir.to_path_buf()];
    }

    let mut roots = Vec::new();
    for include in options.includes {
        let path = base_dir.join(include);
        if !is_glob_pattern(include) {
            if path.exists() {
                roots.push(path);
            } else {
                warn(
                    options.verbose,
                    format_args!("Include path does not exist: {}", path.display()),
                );
            }
            continue;
        }
        match glob(&path.to_string_lossy()) {
            Ok(entries) => roots.extend(entries.flatten().filter(|entry| entry.is_dir())),
            Err(e) => warn(
                options.verbose,
                format_args!("Invalid glob pattern '{}': {}", include, e),
            ),
        }
    }
    roots
}

fn is_script_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext))
}
