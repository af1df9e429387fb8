use std::path::{Path, PathBuf};

use crate::context::DEFAULT_WINDOW;
use crate::error::Error;
use crate::sanitizer::FrontMatterScope;
use crate::scan::ScanOptions;

/// Name of the config file looked up in the scan root.
pub const CONFIG_FILE: &str = ".blockaudit.toml";

/// Project configuration loaded from `.blockaudit.toml`.
/// Include/exclude patterns are path prefixes relative to the scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Characters of context shown on each side of a defect.
    pub context_window: usize,
    /// Path prefixes never scanned.
    pub exclude: Vec<String>,
    /// File extensions treated as documents, lowercase and without the dot.
    pub extensions: Vec<String>,
    /// How far a front-matter block reaches.
    pub front_matter: FrontMatterScope,
    /// Path prefixes to scan. Empty means everything.
    pub include: Vec<String>,
}

/// Raw TOML structure for `.blockaudit.toml`.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct BlockauditTomlConfig {
    context_window: Option<usize>,
    #[serde(default)]
    exclude: Vec<String>,
    extends: Option<PathBuf>,
    extensions: Option<Vec<String>>,
    front_matter: Option<FrontMatterScope>,
    #[serde(default)]
    include: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            context_window: DEFAULT_WINDOW,
            exclude: Vec::new(),
            extensions: vec!["md".to_string()],
            front_matter: FrontMatterScope::default(),
            include: Vec::new(),
        };
    }
}

impl Config {
    /// Load config from `.blockaudit.toml` in the given root directory,
    /// following its `extends` chain.
    ///
    /// Returns the defaults if the file doesn't exist. A file that exists but
    /// is malformed is an error, never a silent fallback.
    ///
    /// `include` and `exclude` accumulate parent-first along the chain; the
    /// other settings in a child override its parent.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` for malformed TOML, `Error::ConfigNotFound` if
    /// an `extends` target is missing, `Error::ConfigCycle` if the chain loops,
    /// or `Error::Io` for other read failures.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let Some(first) = read_layer(&path)? else {
            return Ok(Self::default());
        };

        let mut chain = vec![identity(&path)];
        let mut layers = vec![first];
        let mut current = path;

        while let Some(extends) = layers.last().and_then(|l| return l.extends.clone()) {
            let base = current.parent().unwrap_or_else(|| return Path::new("."));
            let next = base.join(extends);
            let id = identity(&next);
            if chain.contains(&id) {
                chain.push(id);
                return Err(Error::ConfigCycle { chain });
            }
            chain.push(id);

            let Some(layer) = read_layer(&next)? else {
                return Err(Error::ConfigNotFound { path: next });
            };
            tracing::debug!(config = %next.display(), "extending config");
            layers.push(layer);
            current = next;
        }

        let mut config = Self::default();
        for layer in layers.into_iter().rev() {
            config.apply(layer);
        }
        return Ok(config);
    }

    /// Merge one layer on top of what has been loaded so far.
    fn apply(&mut self, layer: BlockauditTomlConfig) {
        self.include.extend(layer.include);
        self.exclude.extend(layer.exclude);
        if let Some(window) = layer.context_window {
            self.context_window = window;
        }
        if let Some(scope) = layer.front_matter {
            self.front_matter = scope;
        }
        if let Some(extensions) = layer.extensions {
            self.extensions = extensions
                .iter()
                .map(|e| return e.trim_start_matches('.').to_lowercase())
                .collect();
        }
    }

    /// Check whether a document path should be scanned.
    ///
    /// A path is included if no include patterns are set (scan everything),
    /// or if the path starts with at least one include pattern.
    /// An included path is then excluded if it starts with any exclude pattern.
    pub fn should_scan(&self, relative_path: &str) -> bool {
        let included = self.include.is_empty()
            || self.include.iter().any(|p| return relative_path.starts_with(p.as_str()));

        if !included {
            return false;
        }

        return !self.exclude.iter().any(|p| return relative_path.starts_with(p.as_str()));
    }

    /// Whether `path` has one of the configured document extensions.
    pub fn accepts_extension(&self, path: &Path) -> bool {
        let Some(ext) = path.extension() else {
            return false;
        };
        let ext = ext.to_string_lossy().to_lowercase();
        return self.extensions.iter().any(|e| return *e == ext);
    }

    /// Scan settings carried by this config.
    pub const fn scan_options(&self) -> ScanOptions {
        return ScanOptions {
            context_window: self.context_window,
            front_matter: self.front_matter,
        };
    }
}

/// Read and parse one config file. `Ok(None)` if it does not exist.
///
/// # Errors
///
/// Returns `Error::Io` if reading fails (other than not-found),
/// or `Error::TomlDe` if the TOML is malformed.
fn read_layer(path: &Path) -> Result<Option<BlockauditTomlConfig>, Error> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::Io(e)),
    };
    return Ok(Some(toml::from_str(&content)?));
}

/// Canonical form of a config path for cycle detection.
fn identity(path: &Path) -> PathBuf {
    return std::fs::canonicalize(path).unwrap_or_else(|_| return path.to_path_buf());
}
