use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::config::CONFIG_FILE;
use crate::error::Error;
use crate::report::{BrokenLink, DocumentReport, OrphanAnchor, Report};
use crate::types::Outcome;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Print markdown line by line, making headings bold.
fn print_markdown_to(md: &str, to_stderr: bool) {
    for line in md.lines() {
        let line = if line.starts_with('#') { format!("{BOLD}{line}{RESET}") } else { line.to_string() };
        if to_stderr {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    print_markdown_to(&render_error(e), true);
}

/// Render a report as markdown with bold headings and print to stdout.
pub fn print_report(report: &Report) {
    print_markdown_to(&render_report(report), false);
}

// ── Errors ────────────────────────────────────────────────────────────

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where there is one,
/// how to fix it. Errors that stopped the corpus from being read also say
/// that no report exists.
pub fn render_error(e: &Error) -> String {
    let mut md = match e {
        Error::ConfigCycle { chain } => render_config_cycle(chain),
        Error::ConfigNotFound { path } => render_config_not_found(path),
        Error::Io(source) => render_io(source),
        Error::ParseFailed { file, reason } => render_parse_failed(file, reason),
        Error::ReadFailed { path, source } => render_read_failed(path, source),
        Error::TomlDe(source) => render_invalid_toml(source),
        Error::UnknownDocument { id } => render_unknown_document(id),
        Error::Watch { reason } => render_watch_failed(reason),
    };
    if e.is_retrieval_failure() {
        md.push_str("\nThe scan stopped and no report was produced.\n");
    }
    return md;
}

fn render_io(source: &std::io::Error) -> String {
    return format!("\
# Error: I/O

{source}
");
}

fn render_parse_failed(file: &Path, reason: &str) -> String {
    return format!("\
# Error: Parse Failed

Could not parse `{}`: {reason}
", file.display());
}

fn render_invalid_toml(source: &toml::de::Error) -> String {
    return format!("\
# Error: Invalid TOML

{source}

## Fix

Check the syntax of `{CONFIG_FILE}`.
");
}

fn render_unknown_document(id: &str) -> String {
    return format!("\
# Error: Unknown Document

The document store has no document `{id}`.
");
}

fn render_config_not_found(path: &Path) -> String {
    return format!("\
# Error: Config Not Found

`{}` does not exist.

## Fix

Check the `extends` path in your `{CONFIG_FILE}`.
", path.display());
}

fn render_read_failed(path: &Path, source: &std::io::Error) -> String {
    return format!("\
# Error: Cannot Read Document

`{}`: {source}

## Fix

Fix the file or exclude it in `{CONFIG_FILE}`:

    exclude = [\"path/to/skip/\"]
", path.display());
}

fn render_watch_failed(reason: &str) -> String {
    return format!("\
# Error: Watch Failed

{reason}

## Fix

Run a one-off scan instead:

    blockaudit check
");
}

fn render_config_cycle(chain: &[PathBuf]) -> String {
    let chain_str = chain
        .iter()
        .map(|p| return p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ");

    return format!(
        "\
# Error: Config Cycle Detected

Circular `extends` chain: {chain_str}

## Fix

Remove the circular `extends` reference in one of the config files.
"
    );
}

// ── Reports ───────────────────────────────────────────────────────────

/// Render a report as markdown: one section per document with findings,
/// then a summary.
pub fn render_report(report: &Report) -> String {
    let mut out = String::new();

    if report.is_clean() {
        out.push_str("# Block references\n\n");
    } else {
        out.push_str("# Block reference defects\n\n");
    }

    for (document, findings) in &report.documents {
        let _ = writeln!(out, "## {document}\n");
        render_document(&mut out, findings);
        out.push('\n');
    }

    render_summary(&mut out, report);
    return out;
}

fn render_document(out: &mut String, findings: &DocumentReport) {
    let mut lines: Vec<(usize, String)> = Vec::new();
    for orphan in &findings.orphan_anchors {
        lines.push((orphan.location.byte_range.start, render_orphan(orphan)));
    }
    for broken in &findings.broken_links {
        lines.push((broken.location.byte_range.start, render_broken(broken)));
    }
    lines.sort_by_key(|(start, _)| return *start);
    for (_, line) in lines {
        out.push_str(&line);
    }

    if !findings.duplicate_anchors.is_empty() {
        let keys: Vec<String> = findings
            .duplicate_anchors
            .iter()
            .map(|d| return format!("`^{}` (line {})", d.anchor.key, d.location.line))
            .collect();
        let _ = writeln!(out, "- note: anchors defined more than once: {}", keys.join(", "));
    }
}

fn render_orphan(orphan: &OrphanAnchor) -> String {
    return format!(
        "- {}:{} orphan anchor `^{}`\n      {}\n",
        orphan.location.line, orphan.location.column, orphan.anchor.key, orphan.context
    );
}

fn render_broken(broken: &BrokenLink) -> String {
    let reference = &broken.link.reference;
    let detail = match &broken.link.outcome {
        Outcome::BrokenUnknownAnchor { target } => format!("no anchor `^{}` in `{target}`", reference.anchor_key),
        Outcome::BrokenUnknownDocument => format!("no document `{}`", reference.raw_target.trim()),
        Outcome::Resolved { .. } => broken.link.outcome.label().to_string(),
    };
    return format!(
        "- {}:{} broken link `{}#^{}`: {detail}\n      {}\n",
        broken.location.line, broken.location.column, reference.raw_target, reference.anchor_key, broken.context
    );
}

/// `count` followed by `noun`, with an `s` unless the count is one.
fn counted(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    return format!("{count} {noun}{suffix}");
}

fn render_summary(out: &mut String, report: &Report) {
    let stats = &report.stats;
    let _ = writeln!(
        out,
        "{}, {}, {} ({} resolved, {} malformed)",
        counted(stats.documents, "document"),
        counted(stats.anchors, "anchor"),
        counted(stats.references, "reference"),
        stats.resolved,
        stats.malformed
    );

    if report.is_clean() {
        out.push_str("Every anchor is referenced and every block link resolves.\n");
    } else {
        let _ = writeln!(
            out,
            "{}, {}",
            counted(report.orphan_count(), "orphan anchor"),
            counted(report.broken_count(), "broken link")
        );
    }

    let duplicates = report.duplicate_count();
    if duplicates > 0 {
        let _ = writeln!(out, "{} sharing a key", counted(duplicates, "anchor definition"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{ScanOptions, scan};
    use crate::store::MemoryStore;

    fn report_for(store: &MemoryStore) -> String {
        render_report(&scan(store, ScanOptions::default()).unwrap())
    }

    #[test]
    fn clean_report() {
        let store = MemoryStore::new().with("A.md", "Fact. ^f1\n").with("B.md", "[[A#^f1]]\n");
        let md = report_for(&store);
        assert!(md.starts_with("# Block references\n"));
        assert!(md.contains("2 documents, 1 anchor, 1 reference (1 resolved, 0 malformed)"));
        assert!(md.contains("every block link resolves"));
    }

    #[test]
    fn defects_listed_per_document() {
        let store = MemoryStore::new()
            .with("A.md", "Some text ^abc123\n")
            .with("B.md", "See [[C#^xyz]]\n")
            .with("D.md", "See [[A#^nope]]\n");
        let md = report_for(&store);
        assert!(md.contains("## A.md\n\n- 1:11 orphan anchor `^abc123`\n      Some text ^abc123 \n"));
        assert!(md.contains("## B.md\n\n- 1:7 broken link `C#^xyz`: no document `C`"));
        assert!(md.contains("no anchor `^nope` in `A.md`"));
        assert!(md.contains("1 orphan anchor, 2 broken links"));
    }

    #[test]
    fn duplicates_are_noted() {
        let store = MemoryStore::new().with("A.md", "one ^dup\ntwo ^dup\n").with("B.md", "[[A#^dup]]\n");
        let md = report_for(&store);
        assert!(md.contains("- note: anchors defined more than once: `^dup` (line 1), `^dup` (line 2)"));
        assert!(md.contains("2 anchor definitions sharing a key"));
    }

    #[test]
    fn config_cycle_shows_chain() {
        let e = Error::ConfigCycle {
            chain: vec![PathBuf::from("a.toml"), PathBuf::from("b.toml"), PathBuf::from("a.toml")],
        };
        let md = render_error(&e);
        assert!(md.starts_with("# Error: Config Cycle Detected"));
        assert!(md.contains("a.toml -> b.toml -> a.toml"));
    }

    #[test]
    fn read_failure_mentions_path() {
        let e = Error::ReadFailed {
            path: PathBuf::from("notes/x.md"),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, "stream did not contain valid UTF-8"),
        };
        let md = render_error(&e);
        assert!(md.contains("# Error: Cannot Read Document"));
        assert!(md.contains("`notes/x.md`: stream did not contain valid UTF-8"));
        assert!(md.contains("no report was produced"));
    }

    #[test]
    fn config_errors_do_not_mention_the_report() {
        let e = Error::ConfigNotFound {
            path: PathBuf::from("base.toml"),
        };
        let md = render_error(&e);
        assert!(md.starts_with("# Error: Config Not Found"));
        assert!(!md.contains("no report"));
    }

    #[test]
    fn single_counts_are_singular() {
        assert_eq!(counted(1, "anchor"), "1 anchor");
        assert_eq!(counted(0, "broken link"), "0 broken links");
        assert_eq!(counted(3, "document"), "3 documents");
    }
}
