//! Corpus documents and their sanitized, search-ready form.

use std::collections::BTreeSet;
use std::ops::Range;

use crate::ranges::RangeSet;
use crate::sanitizer::{self, FrontMatterScope};
use crate::types::DocumentId;

/// One document of the corpus, immutable for the duration of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Alternative names from front matter, usable as link targets.
    pub aliases: BTreeSet<String>,
    /// Stable identity (relative path).
    pub id: DocumentId,
    /// Text exactly as stored.
    pub raw_text: String,
    /// File stem of the path.
    pub title: String,
}

impl Document {
    /// Build a document; its title is the file stem of `id`.
    pub fn new(id: DocumentId, raw_text: String, aliases: BTreeSet<String>) -> Self {
        let title = id.stem().to_string();
        return Self {
            aliases,
            id,
            raw_text,
            title,
        };
    }
}

/// A document plus the redacted copy of its text used for pattern search.
///
/// `sanitized_text` has exactly the byte length of `raw_text`, so every
/// offset found in it is an offset into the raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedDocument {
    /// The source document.
    document: Document,
    /// Ranges blanked in `sanitized_text`.
    ignored: RangeSet,
    /// Raw text with ignored ranges replaced by spaces.
    sanitized_text: String,
}

impl SanitizedDocument {
    /// Compute ignore ranges from all sources and redact the document.
    ///
    /// `structural` holds host-supplied regions such as headings and code blocks.
    pub fn new(document: Document, structural: &[Range<usize>], scope: FrontMatterScope) -> Self {
        let ignored = sanitizer::ignore_ranges(&document.raw_text, structural, scope);
        let sanitized_text = sanitizer::sanitize(&document.raw_text, &ignored);
        return Self {
            document,
            ignored,
            sanitized_text,
        };
    }

    /// The underlying document.
    pub const fn document(&self) -> &Document {
        return &self.document;
    }

    /// Shorthand for the document's identity.
    pub const fn id(&self) -> &DocumentId {
        return &self.document.id;
    }

    /// Ranges that were blanked.
    pub const fn ignored(&self) -> &RangeSet {
        return &self.ignored;
    }

    /// Redacted text, same length as the raw text.
    pub fn sanitized_text(&self) -> &str {
        return &self.sanitized_text;
    }

    /// Give back the document, dropping the redacted copy.
    pub fn into_document(self) -> Document {
        return self.document;
    }
}
