//! Small helpers shared by the rewriter and the output layer.

use std::path::Path;

/// Converts byte offsets into 1-indexed line numbers.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte index of the start of each line.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Builds the index by scanning the text for newlines.
    #[must_use]
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        // '\n' is always a single byte in UTF-8
        for (i, byte) in source.as_bytes().iter().enumerate() {
            if *byte == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Line number (1-indexed) containing the given byte offset.
    #[must_use]
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        }
    }
}

/// Normalizes a path for CLI display.
///
/// - Converts backslashes to forward slashes
/// - Strips a leading "./"
///
/// # Examples
/// ```
/// use std::path::Path;
/// use kvmigrate::utils::normalize_display_path;
///
/// assert_eq!(normalize_display_path(Path::new("./supabase/index.tsx")), "supabase/index.tsx");
/// ```
#[must_use]
pub fn normalize_display_path(path: &Path) -> String {
    let s = path.to_string_lossy();
    let clean = s.trim_start_matches(r"\\?\");
    let normalized = clean.replace('\\', "/");
    normalized
        .strip_prefix("./")
        .unwrap_or(&normalized)
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_of() {
        let index = LineIndex::new("a\nbb\n\nccc");
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(1), 1);
        assert_eq!(index.line_of(2), 2);
        assert_eq!(index.line_of(5), 3);
        assert_eq!(index.line_of(6), 4);
        assert_eq!(index.line_of(8), 4);
    }

    #[test]
    fn test_normalize_display_path_backslashes() {
        assert_eq!(
            normalize_display_path(Path::new(r".\server\index.tsx")),
            "server/index.tsx"
        );
    }
}
