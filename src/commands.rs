//! The `check` command: scan a vault and report defects.

use std::path::Path;
use std::process::ExitCode;

use crate::diagnostics;
use crate::error::Error;
use crate::report::Report;
use crate::scan::Scanner;
use crate::store::FsStore;

/// How `check` prints its report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON on stdout.
    Json,
    /// Markdown with bold headings.
    #[default]
    Text,
}

/// Exit code for a finished scan. Broken links (2) outrank orphan anchors (1).
pub fn exit_code(report: &Report) -> u8 {
    if report.broken_count() > 0 {
        return 2;
    }
    if report.orphan_count() > 0 {
        return 1;
    }
    return 0;
}

/// Scan the vault at `root` and print the report.
///
/// `context` overrides the configured context window.
///
/// # Errors
///
/// Returns config errors, or the retrieval error that failed the scan.
pub fn check(root: &Path, format: OutputFormat, context: Option<usize>) -> Result<ExitCode, Error> {
    let store = FsStore::open(root)?;
    let mut options = store.config().scan_options();
    if let Some(window) = context {
        options.context_window = window;
    }

    let mut scanner = Scanner::new(&store, options);
    scanner.run();
    let report = scanner.into_report()?;

    match format {
        OutputFormat::Json => {
            // serde_json::to_string_pretty won't fail on this structure.
            let json = serde_json::to_string_pretty(&report).unwrap_or_default();
            println!("{json}");
        },
        OutputFormat::Text => diagnostics::print_report(&report),
    }

    return Ok(ExitCode::from(exit_code(&report)));
}
