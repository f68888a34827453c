//! The rewriter: applies a rule set to a file and reports what changed.

use crate::error::{MigrateError, Result};
use crate::fix::{ByteRangeRewriter, Edit};
use crate::report::RewriteReport;
use crate::rules::RuleSet;
use crate::utils::{normalize_display_path, LineIndex};

use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Options for a migration run.
#[derive(Debug, Default, Clone, Copy)]
pub struct MigrateOptions {
    /// Compute and print the report without touching the file.
    pub dry_run: bool,
    /// Print every substitution with its line number.
    pub verbose: bool,
}

/// What happened to the target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationStatus {
    /// Substitutions were made and the file was replaced.
    Written,
    /// Substitutions were found but the run was a dry run.
    DryRun,
    /// Nothing matched; the file is already migrated.
    NoOp,
}

/// Result of migrating one file.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationOutcome {
    /// Display form of the target path.
    pub path: String,
    /// What happened to the file.
    pub status: MigrationStatus,
    /// Substitution counts.
    pub report: RewriteReport,
}

/// Applies every rule to `text` and returns the new text with its report.
///
/// Matches are collected against the original text for all rules before any
/// substitution happens, so the outcome does not depend on rule order.
///
/// # Errors
///
/// Returns [`MigrateError::Rewrite`] if matches of different rules overlap.
pub fn rewrite_text(rules: &RuleSet, text: &str) -> Result<(String, RewriteReport)> {
    let index = LineIndex::new(text);
    let mut report = RewriteReport::new(rules);
    let mut rewriter = ByteRangeRewriter::new(text);

    for (rule_index, rule) in rules.rules().iter().enumerate() {
        for (start, end) in rule.find_ranges(text) {
            report.record(rule_index, index.line_of(start));
            rewriter.add_edit(Edit::new(start, end, rule.replacement()));
        }
    }

    if !rewriter.has_edits() {
        return Ok((text.to_owned(), report));
    }
    Ok((rewriter.apply()?, report))
}

/// Reads `path`, rewrites it with `rules` and replaces it atomically.
///
/// Progress is written to `writer`. A file with no matches is reported as
/// already migrated and left untouched.
///
/// # Errors
///
/// The error is an [`anyhow::Error`]. File failures carry a [`MigrateError`]
/// that callers can recover with `downcast_ref`:
///
/// - [`MigrateError::NotFound`] if the file cannot be read; nothing is written.
/// - [`MigrateError::InvalidEncoding`] if the file is not UTF-8; nothing is written.
/// - [`MigrateError::Io`] if writing the new content fails; the original is kept.
///
/// A failure of `writer` itself is returned as a plain [`std::io::Error`] and
/// does not downcast to [`MigrateError`].
pub fn migrate_file<W: Write>(
    path: &Path,
    rules: &RuleSet,
    options: MigrateOptions,
    writer: W,
) -> anyhow::Result<MigrationOutcome> {
    migrate_file_with(path, rules, options, writer, write_atomic)
}

fn migrate_file_with<W, F>(
    path: &Path,
    rules: &RuleSet,
    options: MigrateOptions,
    mut writer: W,
    persist: F,
) -> anyhow::Result<MigrationOutcome>
where
    W: Write,
    F: FnOnce(&Path, &str) -> std::io::Result<()>,
{
    let display = normalize_display_path(path);
    writeln!(writer, "Reading {display}...")?;

    let content = read_source(path)?;
    let (rewritten, report) = rewrite_text(rules, &content)?;

    writeln!(writer, "\n{}", "Applying replacements...".cyan())?;
    for entry in report.applied() {
        writeln!(
            writer,
            "  {} Replaced {} instances of '{}' with '{}'",
            "✓".green(),
            entry.count,
            entry.from,
            entry.to
        )?;
        if options.verbose {
            for line in &entry.lines {
                writeln!(writer, "[VERBOSE]   {display}:{line} {}", entry.label)?;
            }
        }
    }

    if report.is_noop() {
        writeln!(
            writer,
            "\n{}",
            "No replacements needed - file already migrated or no matching calls found".yellow()
        )?;
        return Ok(MigrationOutcome {
            path: display,
            status: MigrationStatus::NoOp,
            report,
        });
    }

    writeln!(writer, "\nTotal replacements: {}", report.total())?;

    if options.dry_run {
        writeln!(
            writer,
            "\n{}",
            format!("[DRY-RUN] {display} was not modified")
                .as_str()
                .yellow()
        )?;
        return Ok(MigrationOutcome {
            path: display,
            status: MigrationStatus::DryRun,
            report,
        });
    }

    writeln!(writer, "\nWriting changes to {display}...")?;
    persist(path, &rewritten).map_err(|source| MigrateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    writeln!(writer, "{}", "File updated successfully!".green())?;

    Ok(MigrationOutcome {
        path: display,
        status: MigrationStatus::Written,
        report,
    })
}

fn read_source(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| MigrateError::NotFound {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|_| MigrateError::InvalidEncoding {
        path: path.to_path_buf(),
    })
}

/// Replaces the file at `path` with `content` without ever exposing a partial write.
///
/// The content goes to a temporary file in the same directory, which then takes
/// over the original's permissions and is renamed onto it. Symlinks are followed
/// so the link itself survives.
///
/// # Errors
///
/// Returns the underlying I/O error; on failure the original file is unchanged.
pub fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    if let Ok(metadata) = fs::metadata(&target) {
        tmp.as_file().set_permissions(metadata.permissions())?;
    }
    tmp.persist(&target).map_err(|e| e.error)?;
    Ok(())
}
