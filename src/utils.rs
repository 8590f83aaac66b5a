//! Common utility functions shared across the codebase.

use std::path::{Component, Path, PathBuf};

/// Checks if the text contains at least one Unicode letter or digit.
///
/// Returns false for empty strings, whitespace-only or punctuation-only text.
///
/// # Examples
///
/// ```
/// use jsxlate::utils::contains_alphanumeric;
///
/// assert!(contains_alphanumeric("Hello"));
/// assert!(contains_alphanumeric("你好"));
/// assert!(contains_alphanumeric("123"));
/// assert!(!contains_alphanumeric("   \n\t   "));
/// assert!(!contains_alphanumeric("---"));
/// assert!(!contains_alphanumeric(""));
/// ```
pub fn contains_alphanumeric(text: &str) -> bool {
    text.chars().any(|c| c.is_alphanumeric())
}

/// Lexically normalize a path: drop `.` segments and fold `..` into its parent.
///
/// Does not touch the filesystem, so it also works for paths that don't exist.
/// Used to give every file a single identity in resolver caches.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// `normalize_path` for string paths, returning a `String`.
pub fn normalize_path_str(path: &str) -> String {
    normalize_path(Path::new(path))
        .to_string_lossy()
        .into_owned()
}
