//! Shared fix module for source rewriting.
//!
//! The core component is `ByteRangeRewriter`, which applies
//! edits using byte offsets into the original text.

mod rewriter;

pub use rewriter::{ByteRangeRewriter, Edit, RewriteError};
