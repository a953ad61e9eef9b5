//! Report formatting and printing utilities.
//!
//! Separate from core logic to allow glotpot to be used as a library.

use std::io::{self, Write};

use colored::Colorize;

use super::commands::{CommandResult, CommandSummary, ExtractSummary, InitSummary};
use crate::utils::plural;

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

pub fn print(result: &CommandResult) {
    match &result.summary {
        CommandSummary::Extract(summary) => {
            print_extract_to(summary, &mut io::stdout().lock());
            print_skipped_warning_to(summary.skipped_paths, &mut io::stderr().lock());
        }
        CommandSummary::Init(summary) => print_init(summary),
    }
}

/// Print the extraction summary to a custom writer.
pub fn print_extract_to<W: Write>(summary: &ExtractSummary, writer: &mut W) {
    let headline = format!(
        "Extracted {} {} from {} source {} ({} new, {} removed)",
        summary.message_count,
        plural(summary.message_count, "message", "messages"),
        summary.files_scanned,
        plural(summary.files_scanned, "file", "files"),
        summary.sync.added,
        summary.sync.removed,
    );

    if summary.written {
        let _ = writeln!(
            writer,
            "{} {} {} {}",
            SUCCESS_MARK.green(),
            headline.green(),
            "->".dimmed(),
            summary.output.display()
        );
    } else {
        let _ = writeln!(
            writer,
            "{} {} {}",
            SUCCESS_MARK.green(),
            headline.green(),
            "(dry run, nothing written)".yellow()
        );
    }

    let retained = &summary.sync.retained;
    if !retained.is_empty() {
        let _ = writeln!(
            writer,
            "  - kept {} unused {} ({} or {} in config):",
            retained.len(),
            plural(retained.len(), "message", "messages"),
            "--keep-unused".cyan(),
            "\"removeUnused\": false".cyan()
        );
        for msgid in retained {
            let _ = writeln!(writer, "      {:?}", msgid);
        }
    }
}

/// Print a warning about paths that could not be accessed.
pub fn print_skipped_warning_to<W: Write>(count: usize, writer: &mut W) {
    if count > 0 {
        let _ = writeln!(
            writer,
            "{} {} path(s) skipped due to access errors (use {} for details)",
            "warning:".bold().yellow(),
            count,
            "-v".cyan()
        );
    }
}

fn print_init(summary: &InitSummary) {
    match &summary.error {
        Some(error) => eprintln!("Error: {}", error),
        None => println!(
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Created {}", summary.path.display()).green()
        ),
    }
}
