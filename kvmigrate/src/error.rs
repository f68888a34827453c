//! Error types for the migration library.

use crate::fix::RewriteError;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T, E = MigrateError> = std::result::Result<T, E>;

/// Everything that can go wrong while migrating a file.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// The target path does not exist or cannot be read.
    #[error("file not found: {}", path.display())]
    NotFound {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying read error.
        #[source]
        source: std::io::Error,
    },

    /// The target exists but is not UTF-8 text.
    #[error("file is not valid UTF-8: {}", path.display())]
    InvalidEncoding {
        /// Path that was read.
        path: PathBuf,
    },

    /// Persisting the rewritten content failed.
    #[error("error writing {}: {source}", path.display())]
    Io {
        /// Path being written.
        path: PathBuf,
        /// Underlying write error.
        #[source]
        source: std::io::Error,
    },

    /// A rule definition cannot be used.
    #[error("invalid rule '{label}': {reason}")]
    InvalidRule {
        /// Label of the offending rule.
        label: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A configuration file could not be loaded.
    #[error("invalid configuration {}: {message}", path.display())]
    Config {
        /// Configuration file path.
        path: PathBuf,
        /// Read or parse error message.
        message: String,
    },

    /// The collected substitutions could not be applied.
    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

impl MigrateError {
    /// Short machine-readable name of the error kind, used in JSON output.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::InvalidEncoding { .. } => "invalid_encoding",
            Self::Io { .. } => "io_error",
            Self::InvalidRule { .. } => "invalid_rule",
            Self::Config { .. } => "config_error",
            Self::Rewrite(_) => "rewrite_error",
        }
    }
}
