//! Filesystem access used by cross-file function resolution.

use std::io;
use std::path::Path;

use crate::utils::normalize_path;

const SCRIPT_EXTENSIONS: [&str; 4] = ["ts", "tsx", "js", "jsx"];

/// Import resolution and file reading for the static function resolver.
///
/// Injected so tests can serve files from memory and count reads.
pub trait ModuleHost: Send + Sync {
    /// Resolve `specifier` as imported from `from_file` to a readable path.
    fn resolve_import(&self, from_file: &str, specifier: &str) -> Option<String>;

    fn read_file(&self, path: &str) -> io::Result<String>;
}

/// Resolves relative imports against the real filesystem.
///
/// Bare package specifiers (`react`, `@/lib/x`) are not resolved.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsHost;

impl ModuleHost for FsHost {
    fn resolve_import(&self, from_file: &str, specifier: &str) -> Option<String> {
        resolve_relative_import(from_file, specifier, |path| Path::new(path).is_file())
    }

    fn read_file(&self, path: &str) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Try the specifier as written, then with each script extension, then as a
/// directory with an `index` file.
pub fn resolve_relative_import(
    from_file: &str,
    specifier: &str,
    exists: impl Fn(&str) -> bool,
) -> Option<String> {
    if !specifier.starts_with('.') {
        return None;
    }
    let base_dir = Path::new(from_file).parent()?;
    let resolved = normalize_path(&base_dir.join(specifier));

    let has_script_extension = resolved
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext));
    if has_script_extension {
        let candidate = resolved.to_string_lossy().into_owned();
        if exists(&candidate) {
            return Some(candidate);
        }
    }

    let mut candidates = Vec::new();
    for ext in SCRIPT_EXTENSIONS {
        let mut file = resolved.clone().into_os_string();
        file.push(format!(".{}", ext));
        candidates.push(Path::new(&file).to_path_buf());
    }
    for ext in SCRIPT_EXTENSIONS {
        candidates.push(resolved.join(format!("index.{}", ext)));
    }

    candidates
        .into_iter()
        .map(|path| path.to_string_lossy().into_owned())
        .find(|path| exists(path))
}
