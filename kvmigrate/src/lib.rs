//! Core library for the kvmigrate source migration tool.
//!
//! Rewrites `await kv.<method>(` calls into `await kvWithRetry.<method>(`
//! (or any configured receiver/wrapper pair), reports per-method counts and
//! replaces the file atomically. Running it twice changes nothing the second time.

#![allow(clippy::map_unwrap_or, clippy::items_after_statements)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Module defining the command-line interface arguments.
pub mod cli;

/// Module for loading `.kvmigrate.toml` configuration.
pub mod config;

/// Module containing default receivers, methods and file names.
pub mod constants;

/// Module handling argument parsing, dispatch and exit codes.
pub mod entry_point;

/// Module defining the library error type.
pub mod error;

/// Module containing the byte-range rewriter.
pub mod fix;

/// Module applying rules to text and files.
pub mod migrate;

/// Module for colored header and banner output.
pub mod output;

/// Module defining per-run substitution counts.
pub mod report;

/// Module defining rewrite rules and rule sets.
pub mod rules;

/// Module containing line indexing and path display helpers.
pub mod utils;

pub use error::{MigrateError, Result};
pub use migrate::{migrate_file, rewrite_text, MigrateOptions, MigrationOutcome, MigrationStatus};
pub use report::RewriteReport;
pub use rules::{RewriteRule, RuleSet, RuleSpec};
