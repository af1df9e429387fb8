/// Crate-level error types for blockaudit diagnostics.
use std::path::PathBuf;

/// Every error that can stop a scan. Each variant names the file or reason for
/// failure so a diagnostic can be printed without a debugger.
///
/// Defects found in documents (orphan anchors, broken links, malformed
/// references) are never errors: they are classification outcomes carried in
/// the report.
#[allow(clippy::error_impl_error, reason = "single crate error type, re-exported as blockaudit::Error")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Config file `extends` chain forms a cycle.
    #[error("config cycle detected: {}", chain.iter().map(|p| return p.display().to_string()).collect::<Vec<_>>().join(" -> "))]
    ConfigCycle {
        /// Ordered chain of config file paths forming the cycle.
        chain: Vec<PathBuf>,
    },

    /// A config file named by `extends` does not exist on disk.
    #[error("config not found: {}", path.display())]
    ConfigNotFound {
        /// Path to the missing config file.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// Tree-sitter failed to parse a document.
    #[error("parse failed: {}: {reason}", file.display())]
    ParseFailed {
        /// Document that failed to parse.
        file: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// The document store could not supply a document's text.
    #[error("cannot read {}: {source}", path.display())]
    ReadFailed {
        /// Path of the document that could not be read.
        path: PathBuf,
        /// The underlying read error.
        #[source]
        source: std::io::Error,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// A store was asked for a document it does not hold.
    #[error("unknown document: `{id}`")]
    UnknownDocument {
        /// Identity that was requested.
        id: String,
    },

    /// The filesystem watcher could not be set up.
    #[error("watch failed: {reason}")]
    Watch {
        /// Description of the watcher failure.
        reason: String,
    },
}

impl Error {
    /// Whether this error means the document corpus could not be retrieved,
    /// as opposed to a configuration or tooling problem.
    pub const fn is_retrieval_failure(&self) -> bool {
        return matches!(
            self,
            Self::Io(_) | Self::ParseFailed { .. } | Self::ReadFailed { .. } | Self::UnknownDocument { .. }
        );
    }
}
