//! Byte-range safe text rewriter.
//!
//! Substitutions are collected against the original buffer and applied in a
//! single pass, so every edit refers to offsets in the text as it was read.
//!
//! # Usage
//!
//! ```
//! use kvmigrate::fix::{ByteRangeRewriter, Edit};
//!
//! let source = "await kv.get(key)";
//! let mut rewriter = ByteRangeRewriter::new(source);
//! rewriter.add_edit(Edit::new(6, 8, "kvWithRetry"));
//! let fixed = rewriter.apply().expect("should apply");
//! assert_eq!(fixed, "await kvWithRetry.get(key)");
//! ```

use thiserror::Error;

/// A single edit operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Start byte offset (inclusive)
    pub start_byte: usize,
    /// End byte offset (exclusive)
    pub end_byte: usize,
    /// Replacement content
    pub replacement: String,
}

impl Edit {
    /// Create a new edit
    #[must_use]
    pub fn new(start_byte: usize, end_byte: usize, replacement: impl Into<String>) -> Self {
        Self {
            start_byte,
            end_byte,
            replacement: replacement.into(),
        }
    }

    /// Check if this edit overlaps with another
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start_byte < other.end_byte && other.start_byte < self.end_byte
    }
}

/// Error during rewriting
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    /// Two edits claim the same bytes
    #[error("overlapping edits at bytes {first_start} and {second_start}")]
    OverlappingEdits {
        /// Start of the earlier edit
        first_start: usize,
        /// Start of the later, overlapping edit
        second_start: usize,
    },
    /// Edit range is out of bounds
    #[error("edit {start_byte}..{end_byte} out of bounds for source length {source_len}")]
    OutOfBounds {
        /// Start byte of the edit
        start_byte: usize,
        /// End byte of the edit
        end_byte: usize,
        /// Length of the source
        source_len: usize,
    },
    /// Edit boundary falls inside a multi-byte character
    #[error("edit boundary at byte {offset} is not a character boundary")]
    NotCharBoundary {
        /// Offending offset
        offset: usize,
    },
}

/// Safe text rewriter using byte ranges
///
/// Edits are sorted once and stitched together front to back, which keeps the
/// original offsets valid and makes overlap detection a linear scan.
#[derive(Debug, Clone)]
pub struct ByteRangeRewriter {
    source: String,
    edits: Vec<Edit>,
}

impl ByteRangeRewriter {
    /// Create a new rewriter for the given source
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            edits: Vec::new(),
        }
    }

    /// Add an edit to the pending list
    pub fn add_edit(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    /// Check if there are any pending edits
    #[must_use]
    pub fn has_edits(&self) -> bool {
        !self.edits.is_empty()
    }

    fn check_sorted(&self, sorted: &[&Edit]) -> Result<(), RewriteError> {
        for edit in sorted {
            if edit.start_byte > edit.end_byte || edit.end_byte > self.source.len() {
                return Err(RewriteError::OutOfBounds {
                    start_byte: edit.start_byte,
                    end_byte: edit.end_byte,
                    source_len: self.source.len(),
                });
            }
            for offset in [edit.start_byte, edit.end_byte] {
                if !self.source.is_char_boundary(offset) {
                    return Err(RewriteError::NotCharBoundary { offset });
                }
            }
        }

        for pair in sorted.windows(2) {
            if pair[0].overlaps(pair[1]) {
                return Err(RewriteError::OverlappingEdits {
                    first_start: pair[0].start_byte,
                    second_start: pair[1].start_byte,
                });
            }
        }

        Ok(())
    }

    /// Apply all edits and return the modified source
    ///
    /// # Errors
    /// Returns error if edits overlap or are out of bounds
    pub fn apply(self) -> Result<String, RewriteError> {
        let mut sorted: Vec<&Edit> = self.edits.iter().collect();
        sorted.sort_by_key(|e| (e.start_byte, e.end_byte));
        self.check_sorted(&sorted)?;

        let grown: usize = sorted.iter().map(|e| e.replacement.len()).sum();
        let mut result = String::with_capacity(self.source.len() + grown);
        let mut cursor = 0;
        for edit in sorted {
            result.push_str(&self.source[cursor..edit.start_byte]);
            result.push_str(&edit.replacement);
            cursor = edit.end_byte;
        }
        result.push_str(&self.source[cursor..]);

        Ok(result)
    }
}
