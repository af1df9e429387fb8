//! Where documents come from: a filesystem vault or an in-memory corpus.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::config::Config;
use crate::error::Error;
use crate::structure::{self, Structure};
use crate::types::DocumentId;

/// Source of corpus documents and their structural metadata.
///
/// Implementations must be shareable across the threads of one scan.
pub trait DocumentStore: Sync {
    /// Every document in the corpus.
    ///
    /// # Errors
    ///
    /// Returns an error if the corpus cannot be enumerated.
    fn list(&self) -> Result<Vec<DocumentId>, Error>;

    /// Current text of one document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read.
    fn read(&self, id: &DocumentId) -> Result<String, Error>;

    /// Headings, code blocks and aliases of a document whose text is `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be analyzed.
    fn structure(&self, id: &DocumentId, text: &str) -> Result<Structure, Error> {
        return structure::analyze(Path::new(id.as_str()), text);
    }
}

// ── Filesystem ────────────────────────────────────────────────────────

/// Documents stored as files below a root directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    config: Config,
    root: PathBuf,
}

impl FsStore {
    /// Store over `root`, filtered by `config`.
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Self {
        return Self {
            config,
            root: root.into(),
        };
    }

    /// Store over `root` using the `.blockaudit.toml` found there.
    ///
    /// # Errors
    ///
    /// Returns config loading errors.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        let config = Config::load(&root)?;
        return Ok(Self::new(root, config));
    }

    /// Directory documents are read from.
    pub fn root(&self) -> &Path {
        return &self.root;
    }

    /// Filters and scan settings in effect.
    pub const fn config(&self) -> &Config {
        return &self.config;
    }

    /// Identity of a file below the root, or `None` if the config skips it.
    fn document_id(&self, path: &Path) -> Option<DocumentId> {
        if !self.config.accepts_extension(path) {
            return None;
        }
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let id = DocumentId::new(relative.to_string_lossy());
        if !self.config.should_scan(id.as_str()) {
            return None;
        }
        return Some(id);
    }
}

/// Dot-directories such as `.git` or `.obsidian` are never part of the vault.
fn is_hidden(entry: &DirEntry) -> bool {
    return entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.');
}

impl DocumentStore for FsStore {
    fn list(&self) -> Result<Vec<DocumentId>, Error> {
        let mut ids = Vec::new();
        for entry in WalkDir::new(&self.root).into_iter().filter_entry(|e| return !is_hidden(e)) {
            let entry = entry.map_err(|e| return Error::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(id) = self.document_id(entry.path()) {
                ids.push(id);
            }
        }
        ids.sort();
        tracing::debug!(root = %self.root.display(), documents = ids.len(), "listed vault");
        return Ok(ids);
    }

    fn read(&self, id: &DocumentId) -> Result<String, Error> {
        let path = self.root.join(id.as_str());
        return std::fs::read_to_string(&path).map_err(|source| return Error::ReadFailed { path, source });
    }
}

// ── In memory ─────────────────────────────────────────────────────────

/// Documents held in memory, keyed by identity.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: BTreeMap<DocumentId, String>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        return Self::default();
    }

    /// Add or replace a document.
    pub fn insert(&mut self, path: &str, text: impl Into<String>) {
        self.documents.insert(DocumentId::new(path), text.into());
    }

    /// Builder form of [`MemoryStore::insert`].
    #[must_use]
    pub fn with(mut self, path: &str, text: impl Into<String>) -> Self {
        self.insert(path, text);
        return self;
    }
}

impl<P: AsRef<str>, T: Into<String>> FromIterator<(P, T)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (P, T)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (path, text) in iter {
            store.insert(path.as_ref(), text);
        }
        return store;
    }
}

impl DocumentStore for MemoryStore {
    fn list(&self) -> Result<Vec<DocumentId>, Error> {
        return Ok(self.documents.keys().cloned().collect());
    }

    fn read(&self, id: &DocumentId) -> Result<String, Error> {
        return self.documents.get(id).cloned().ok_or_else(|| {
            return Error::UnknownDocument {
                id: id.to_string(),
            };
        });
    }
}
