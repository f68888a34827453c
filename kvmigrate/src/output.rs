//! Header and banner printing for the human-readable report.

use colored::Colorize;
use std::io::Write;

const RULE: &str = "============================================================";

/// Print the run header.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_header(writer: &mut impl Write, receiver: &str, wrapper: &str) -> std::io::Result<()> {
    writeln!(writer, "{}", RULE.cyan())?;
    writeln!(
        writer,
        "{}",
        format!("{receiver} to {wrapper} Migration").as_str().cyan().bold()
    )?;
    writeln!(writer, "{}", RULE.cyan())?;
    writeln!(writer)?;
    Ok(())
}

/// Print the closing banner after a successful run.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_success(writer: &mut impl Write, dry_run: bool) -> std::io::Result<()> {
    let title = if dry_run {
        "DRY RUN COMPLETE"
    } else {
        "MIGRATION COMPLETE!"
    };
    writeln!(writer, "\n{RULE}")?;
    writeln!(writer, "{}", title.green().bold())?;
    writeln!(writer, "{RULE}")?;
    Ok(())
}

/// Print an error line followed by the failure banner.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_failure(writer: &mut impl Write, message: &str) -> std::io::Result<()> {
    writeln!(writer, "{} {message}", "ERROR:".red().bold())?;
    writeln!(writer, "\n{RULE}")?;
    writeln!(writer, "{}", "MIGRATION FAILED".red().bold())?;
    writeln!(writer, "{RULE}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_names_receivers() {
        let mut buffer = Vec::new();
        print_header(&mut buffer, "kv", "kvWithRetry").unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("kv to kvWithRetry Migration"));
    }

    #[test]
    fn test_success_banner_variants() {
        let mut buffer = Vec::new();
        print_success(&mut buffer, false).unwrap();
        print_success(&mut buffer, true).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("MIGRATION COMPLETE!"));
        assert!(output.contains("DRY RUN COMPLETE"));
    }

    #[test]
    fn test_failure_banner_includes_message() {
        let mut buffer = Vec::new();
        print_failure(&mut buffer, "file not found: x.tsx").unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("file not found: x.tsx"));
        assert!(output.contains("MIGRATION FAILED"));
    }
}
