use clap::{Args, Parser};
use std::path::PathBuf;

/// Help text for configuration file options, shown at the bottom of --help.
const CONFIG_HELP: &str = "\
CONFIGURATION FILE (.kvmigrate.toml):
  Looked up from the current directory upwards, or passed with --config.

  [kvmigrate]
  target = \"supabase/functions/server/index.tsx\"  # Relative to this file
  receiver = \"kv\"                # Calls being wrapped
  wrapper = \"kvWithRetry\"        # Replacement receiver
  prefix = \"await \"              # Required text before the receiver
  methods = [\"get\", \"set\", \"del\", \"mget\", \"mset\", \"getByPrefix\"]
";

/// Options for output formatting and verbosity.
#[derive(Args, Debug, Default, Clone)]
pub struct OutputOptions {
    /// Output the migration outcome as JSON.
    #[arg(long)]
    pub json: bool,

    /// Show every substitution with its line number.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Command line interface configuration using `clap`.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "kvmigrate - Route kv calls through kvWithRetry, idempotently",
    long_about = None,
    after_help = CONFIG_HELP
)]
pub struct Cli {
    /// File to migrate.
    /// Defaults to `target` from the configuration file, then to
    /// supabase/functions/server/index.tsx.
    pub path: Option<PathBuf>,

    /// Report what would change without writing the file.
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Explicit configuration file (disables the upward search).
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Output formatting options.
    #[command(flatten)]
    pub output: OutputOptions,
}
