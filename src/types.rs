/// Core domain types: document identities, anchors, references and outcomes.
use std::fmt;
use std::ops::Range;

use serde::Serialize;

/// Stable identity of a document: its corpus-relative path with `/`
/// separators, e.g. `notes/daily/2024-01-01.md`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DocumentId(
    /// The relative path string.
    String,
);

impl DocumentId {
    /// Build an identity from a relative path, normalizing `\` to `/`.
    pub fn new(path: impl Into<String>) -> Self {
        let path: String = path.into();
        return Self(path.replace('\\', "/"));
    }

    /// The full relative path.
    pub fn as_str(&self) -> &str {
        return &self.0;
    }

    /// Folder part of the path, empty for documents at the corpus root.
    pub fn folder(&self) -> &str {
        return self.0.rsplit_once('/').map_or("", |(folder, _)| return folder);
    }

    /// File name without folder.
    pub fn file_name(&self) -> &str {
        return self.0.rsplit_once('/').map_or(self.0.as_str(), |(_, name)| return name);
    }

    /// File name without its extension. This is the document's title.
    pub fn stem(&self) -> &str {
        let name = self.file_name();
        return match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => name,
        };
    }

    /// Path without the file's extension, used as the link form of the path.
    pub fn link_path(&self) -> &str {
        let extension_len = self.file_name().len().saturating_sub(self.stem().len());
        return self.0.get(..self.0.len().saturating_sub(extension_len)).unwrap_or(&self.0);
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(&self.0);
    }
}

/// A `^key` marker found at the end of a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnchorDefinition {
    /// Byte range of the caret and key in the raw text.
    pub byte_range: Range<usize>,
    /// Anchor identifier without the caret.
    pub key: String,
    /// Document that defines the anchor.
    pub source: DocumentId,
}

/// Which link syntax a reference was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkSyntax {
    /// `[text](path#^key)`, path may be percent-encoded.
    Markdown,
    /// `[[path#^key]]` or `[[path#^key|label]]`.
    Wiki,
}

/// One occurrence of a block link in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkReference {
    /// Anchor key as written after `#^`.
    pub anchor_key: String,
    /// Byte range in the raw text, starting after the opening delimiter and
    /// ending after the closing one.
    pub byte_range: Range<usize>,
    /// Target path as written before `#^`. Empty means the current document.
    pub raw_target: String,
    /// Document containing the link.
    pub source: DocumentId,
    /// Syntax the link was written in.
    pub syntax: LinkSyntax,
}

/// Result of resolving a reference against the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// The target document exists but defines no such anchor.
    BrokenUnknownAnchor {
        /// Document the path resolved to.
        target: DocumentId,
    },
    /// No document matches the target path.
    BrokenUnknownDocument,
    /// Both document and anchor exist.
    Resolved {
        /// Key of the anchor that was hit.
        anchor_key: String,
        /// Document the path resolved to.
        target: DocumentId,
    },
}

impl Outcome {
    /// Whether the reference failed to resolve.
    pub const fn is_broken(&self) -> bool {
        return !matches!(self, Self::Resolved { .. });
    }

    /// Short human label for reports.
    pub const fn label(&self) -> &'static str {
        return match self {
            Self::BrokenUnknownAnchor { .. } => "unknown anchor",
            Self::BrokenUnknownDocument => "unknown document",
            Self::Resolved { .. } => "resolved",
        };
    }
}

/// A reference together with its resolution outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedReference {
    /// How the reference resolved.
    pub outcome: Outcome,
    /// The reference as extracted.
    pub reference: LinkReference,
}

/// Snippet of raw text around a defect, flattened to one line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContextWindow {
    /// Text after the match, suffixed with an ellipsis when clipped.
    pub after: String,
    /// Text before the match, prefixed with an ellipsis when clipped.
    pub before: String,
    /// The matched text itself.
    pub matched: String,
}

impl fmt::Display for ContextWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "{}{}{}", self.before, self.matched, self.after);
    }
}
