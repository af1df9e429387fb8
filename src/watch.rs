//! File watcher: runs `check` on startup, then re-runs on document changes.

use std::path::{Component, Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};

use crate::commands::{self, OutputFormat};
use crate::config::{CONFIG_FILE, Config};
use crate::diagnostics;
use crate::error::Error;

/// Debounce delay between filesystem events and re-check.
const DEBOUNCE_MS: u64 = 100;

/// Whether a changed path can affect the report: a document with a watched
/// extension outside hidden directories, or the config file itself.
fn is_relevant(path: &Path, root: &Path, config: &Config) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    if relative.file_name().is_some_and(|name| return name == CONFIG_FILE) {
        return true;
    }
    let hidden = relative.components().any(|c| {
        return matches!(c, Component::Normal(name) if name.to_string_lossy().starts_with('.'));
    });
    return !hidden && config.accepts_extension(relative);
}

/// Create a filesystem watcher that sends relevant events on the given channel.
///
/// # Errors
///
/// Returns `Error::Watch` if the watcher cannot be created.
fn create_watcher(
    tx: crossbeam_channel::Sender<PathBuf>,
    root: PathBuf,
    config: Config,
) -> Result<notify::RecommendedWatcher, Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        let Ok(event) = res else {
            return;
        };
        if !matches!(
            event.kind,
            notify::EventKind::Create(_) | notify::EventKind::Modify(_) | notify::EventKind::Remove(_)
        ) {
            return;
        }
        for path in event.paths {
            if is_relevant(&path, &root, &config) {
                let _ = tx.send(path);
            }
        }
    })
    .map_err(|e| {
        return Error::Watch {
            reason: format!("watcher setup failed: {e}"),
        };
    });
}

/// Entry point for the watch command.
///
/// Runs an initial check, then watches the vault and re-checks on changes.
///
/// # Errors
///
/// Returns errors from config loading or watcher setup.
pub fn run(root: &Path, format: OutputFormat, context: Option<usize>) -> Result<ExitCode, Error> {
    eprintln!("watch: initial check");
    let mut last_code = run_check(root, format, context);

    let config = Config::load(root)?;
    let watch_root = std::fs::canonicalize(root)?;

    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(tx, watch_root.clone(), config)?;
    watcher
        .watch(&watch_root, RecursiveMode::Recursive)
        .map_err(|e| {
            return Error::Watch {
                reason: format!("cannot watch {}: {e}", watch_root.display()),
            };
        })?;

    eprintln!("watch: monitoring {}, press Ctrl+C to stop", watch_root.display());

    while let Ok(first) = rx.recv() {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        let mut changed = 1_usize;
        while rx.recv_timeout(debounce).is_ok() {
            changed = changed.saturating_add(1);
        }
        tracing::info!(path = %first.display(), events = changed, "change detected");
        eprintln!("watch: change detected, re-checking...");
        last_code = run_check(root, format, context);
    }

    return Ok(last_code);
}

/// Run check once and print result. Returns the exit code from check.
fn run_check(root: &Path, format: OutputFormat, context: Option<usize>) -> ExitCode {
    return match commands::check(root, format, context) {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(3_u8)
        },
    };
}
