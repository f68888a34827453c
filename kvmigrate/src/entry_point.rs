use crate::cli::Cli;
use crate::config::Config;
use crate::constants::DEFAULT_TARGET;
use crate::error::MigrateError;
use crate::migrate::{migrate_file, MigrateOptions};
use crate::output::{print_failure, print_header, print_success};
use crate::rules::RuleSet;
use crate::utils::normalize_display_path;

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

/// JSON body printed instead of the failure banner in `--json` mode.
#[derive(Debug, Serialize)]
struct JsonFailure {
    error: &'static str,
    message: String,
}

/// Runs the migration with the given arguments, writing to stdout.
///
/// # Errors
///
/// Returns an error only if writing to stdout fails.
pub fn run_with_args(args: Vec<String>) -> Result<i32> {
    run_with_args_to(args, &mut std::io::stdout())
}

/// Runs the migration with the given arguments, writing output to the specified writer.
///
/// Returns the process exit code: 0 on success (including an already migrated
/// file and a dry run), 1 on any argument, configuration, read or write failure.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn run_with_args_to<W: Write>(args: Vec<String>, writer: &mut W) -> Result<i32> {
    let mut program_args = vec!["kvmigrate".to_owned()];
    program_args.extend(args);
    let cli_var = match Cli::try_parse_from(program_args) {
        Ok(c) => c,
        Err(e) => match e.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                write!(writer, "{e}")?;
                writer.flush()?;
                return Ok(0);
            }
            _ => {
                eprint!("{e}");
                return Ok(1);
            }
        },
    };
    let json = cli_var.output.json;

    let config = match &cli_var.config {
        Some(path) => match Config::load_file(path) {
            Ok(config) => config,
            Err(e) => return report_failure(writer, json, &anyhow::Error::new(e)),
        },
        None => Config::load(),
    };

    let spec = config.rule_spec();
    let rules = match RuleSet::new(&spec) {
        Ok(rules) => rules,
        Err(e) => return report_failure(writer, json, &anyhow::Error::new(e)),
    };

    let target = cli_var
        .path
        .clone()
        .or_else(|| config.target())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TARGET));

    if cli_var.output.verbose && !json {
        eprintln!("[VERBOSE] kvmigrate v{}", env!("CARGO_PKG_VERSION"));
        match &config.config_file_path {
            Some(path) => eprintln!("[VERBOSE] Config: {}", normalize_display_path(path)),
            None => eprintln!("[VERBOSE] Config: built-in defaults"),
        }
        eprintln!("[VERBOSE] Target: {}", normalize_display_path(&target));
        eprintln!("[VERBOSE] Rules: {}", rules.len());
        eprintln!();
    }

    let options = MigrateOptions {
        dry_run: cli_var.dry_run,
        verbose: cli_var.output.verbose,
    };

    if json {
        return match migrate_file(&target, &rules, options, std::io::sink()) {
            Ok(outcome) => {
                writeln!(writer, "{}", serde_json::to_string_pretty(&outcome)?)?;
                Ok(0)
            }
            Err(e) => report_failure(writer, true, &e),
        };
    }

    print_header(writer, &spec.receiver, &spec.wrapper)?;
    match migrate_file(&target, &rules, options, &mut *writer) {
        Ok(_) => {
            print_success(writer, cli_var.dry_run)?;
            Ok(0)
        }
        Err(e) => report_failure(writer, false, &e),
    }
}

fn report_failure<W: Write>(writer: &mut W, json: bool, error: &anyhow::Error) -> Result<i32> {
    if json {
        let failure = JsonFailure {
            // writer failures are plain io::Error and have no kind
            error: error
                .downcast_ref::<MigrateError>()
                .map_or("error", MigrateError::kind),
            message: format!("{error:#}"),
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&failure)?)?;
    } else {
        print_failure(writer, &format!("{error:#}"))?;
    }
    Ok(1)
}
