use swc_common::{BytePos, SourceMap};

/// Pure position information in source code files (TSX/JSX/TS/JS).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLocation {
    pub file_path: String,
    /// 1-indexed line, `0` for file-scoped diagnostics.
    pub line: usize,
    /// 1-indexed display column, `0` for file-scoped diagnostics.
    pub col: usize,
}

impl SourceLocation {
    pub fn new(file_path: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            file_path: file_path.into(),
            line,
            col,
        }
    }

    /// Location that refers to a whole file (parse and read failures).
    pub fn file(file_path: impl Into<String>) -> Self {
        Self::new(file_path, 0, 0)
    }

    /// Look up the location of a byte position in a parsed file.
    pub fn lookup(file_path: &str, source_map: &SourceMap, pos: BytePos) -> Self {
        let loc = source_map.lookup_char_pos(pos);
        Self::new(file_path, loc.line, loc.col_display + 1)
    }

    pub fn is_file_scoped(&self) -> bool {
        self.line == 0
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_file_scoped() {
            write!(f, "{}", self.file_path)
        } else {
            write!(f, "{}:{}:{}", self.file_path, self.line, self.col)
        }
    }
}

/// Fetch the full source line containing `pos`, for report context.
pub fn source_line_at(source_map: &SourceMap, pos: BytePos) -> String {
    let loc = source_map.lookup_char_pos(pos);
    loc.file
        .get_line(loc.line - 1)
        .map(|cow| cow.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_location_new() {
        let loc = SourceLocation::new("./src/app.tsx", 10, 5);
        assert_eq!(loc.file_path, "./src/app.tsx");
        assert_eq!(loc.line, 10);
        assert_eq!(loc.col, 5);
        assert_eq!(loc.to_string(), "./src/app.tsx:10:5");
    }

    #[test]
    fn test_file_scoped_location_display() {
        let loc = SourceLocation::file("./src/broken.tsx");
        assert!(loc.is_file_scoped());
        assert_eq!(loc.to_string(), "./src/broken.tsx");
    }
}
