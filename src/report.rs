//! The defect report handed back to the host, grouped by source document.

use std::collections::{BTreeMap, HashMap};
use std::ops::Range;

use serde::Serialize;

use crate::context::{build_context, line_column};
use crate::document::Document;
use crate::reconciler::Reconciliation;
use crate::types::{AnchorDefinition, ContextWindow, DocumentId, ResolvedReference};

/// Where a defect sits in a document's raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Byte range in the raw text.
    pub byte_range: Range<usize>,
    /// One-based column of the range start, in characters.
    pub column: usize,
    /// Document containing the defect.
    pub document: DocumentId,
    /// One-based line of the range start.
    pub line: usize,
}

impl Location {
    /// Locate `byte_range` in `document`.
    pub fn new(document: &Document, byte_range: Range<usize>) -> Self {
        let (line, column) = line_column(&document.raw_text, byte_range.start);
        return Self {
            byte_range,
            column,
            document: document.id.clone(),
            line,
        };
    }
}

/// Host callback that opens a document and selects a range in it.
pub trait Navigator {
    /// Bring `location` into view. The engine never navigates by itself.
    fn reveal(&mut self, location: &Location);
}

/// An anchor nothing links to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanAnchor {
    /// The definition.
    pub anchor: AnchorDefinition,
    /// Raw text around the definition.
    pub context: ContextWindow,
    /// Position of the definition.
    pub location: Location,
}

/// A link that does not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenLink {
    /// Raw text around the link.
    pub context: ContextWindow,
    /// The link and why it failed.
    pub link: ResolvedReference,
    /// Position of the link.
    pub location: Location,
}

/// One of several definitions of the same key in one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateAnchor {
    /// The definition.
    pub anchor: AnchorDefinition,
    /// Position of the definition.
    pub location: Location,
}

/// Findings for one source document, each list sorted by offset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentReport {
    /// Links in this document that do not resolve.
    pub broken_links: Vec<BrokenLink>,
    /// Keys defined more than once in this document. Not defects.
    pub duplicate_anchors: Vec<DuplicateAnchor>,
    /// Anchors in this document that nothing links to.
    pub orphan_anchors: Vec<OrphanAnchor>,
}

impl DocumentReport {
    /// Whether there is nothing to report.
    pub fn is_empty(&self) -> bool {
        return self.broken_links.is_empty() && self.duplicate_anchors.is_empty() && self.orphan_anchors.is_empty();
    }

    fn sort(&mut self) {
        self.broken_links.sort_by_key(|b| return b.location.byte_range.start);
        self.duplicate_anchors.sort_by_key(|d| return d.location.byte_range.start);
        self.orphan_anchors.sort_by_key(|o| return o.location.byte_range.start);
    }
}

/// Corpus-wide counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Anchor definitions extracted.
    pub anchors: usize,
    /// Documents scanned.
    pub documents: usize,
    /// References skipped as malformed.
    pub malformed: usize,
    /// References extracted, malformed ones included.
    pub references: usize,
    /// References that resolved.
    pub resolved: usize,
}

/// Result of a finished scan.
///
/// Only documents with findings appear in `documents`; an empty map means
/// the corpus is clean.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Findings per source document.
    pub documents: BTreeMap<DocumentId, DocumentReport>,
    /// Counters for the whole corpus.
    pub stats: ScanStats,
}

/// A single reportable defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Defect<'r> {
    /// A link that does not resolve.
    BrokenLink(&'r BrokenLink),
    /// An anchor nothing links to.
    OrphanAnchor(&'r OrphanAnchor),
}

impl<'r> Defect<'r> {
    /// Position of the defect.
    pub const fn location(&self) -> &'r Location {
        return match self {
            Self::BrokenLink(b) => &b.location,
            Self::OrphanAnchor(o) => &o.location,
        };
    }

    /// Text around the defect.
    pub const fn context(&self) -> &'r ContextWindow {
        return match self {
            Self::BrokenLink(b) => &b.context,
            Self::OrphanAnchor(o) => &o.context,
        };
    }

    /// Ask the host to show this defect.
    pub fn navigate<N: Navigator + ?Sized>(&self, navigator: &mut N) {
        navigator.reveal(self.location());
    }
}

impl Report {
    /// Whether no orphan anchors and no broken links were found.
    pub fn is_clean(&self) -> bool {
        return self.orphan_count() == 0 && self.broken_count() == 0;
    }

    /// Total orphan anchors.
    pub fn orphan_count(&self) -> usize {
        return self.documents.values().map(|d| return d.orphan_anchors.len()).sum();
    }

    /// Total broken links.
    pub fn broken_count(&self) -> usize {
        return self.documents.values().map(|d| return d.broken_links.len()).sum();
    }

    /// Total duplicated anchor definitions.
    pub fn duplicate_count(&self) -> usize {
        return self.documents.values().map(|d| return d.duplicate_anchors.len()).sum();
    }

    /// Every defect, by document then offset.
    pub fn defects(&self) -> Vec<Defect<'_>> {
        let mut defects = Vec::new();
        for report in self.documents.values() {
            let start = defects.len();
            defects.extend(report.orphan_anchors.iter().map(Defect::OrphanAnchor));
            defects.extend(report.broken_links.iter().map(Defect::BrokenLink));
            if let Some(tail) = defects.get_mut(start..) {
                tail.sort_by_key(|d| return d.location().byte_range.start);
            }
        }
        return defects;
    }
}

/// Attach locations and context to reconciled findings and group them by
/// source document.
pub fn assemble(documents: &[Document], reconciliation: Reconciliation, stats: ScanStats, window: usize) -> Report {
    let by_id: HashMap<&DocumentId, &Document> = documents.iter().map(|d| return (&d.id, d)).collect();
    let mut grouped: BTreeMap<DocumentId, DocumentReport> = BTreeMap::new();

    for anchor in reconciliation.orphan_anchors {
        let Some(document) = by_id.get(&anchor.source) else {
            continue;
        };
        let orphan = OrphanAnchor {
            context: build_context(&document.raw_text, anchor.byte_range.clone(), window),
            location: Location::new(document, anchor.byte_range.clone()),
            anchor,
        };
        grouped.entry(document.id.clone()).or_default().orphan_anchors.push(orphan);
    }

    for link in reconciliation.broken_links {
        let Some(document) = by_id.get(&link.reference.source) else {
            continue;
        };
        let range = link.reference.byte_range.clone();
        let broken = BrokenLink {
            context: build_context(&document.raw_text, range.clone(), window),
            location: Location::new(document, range),
            link,
        };
        grouped.entry(document.id.clone()).or_default().broken_links.push(broken);
    }

    for anchor in reconciliation.duplicate_anchors {
        let Some(document) = by_id.get(&anchor.source) else {
            continue;
        };
        let duplicate = DuplicateAnchor {
            location: Location::new(document, anchor.byte_range.clone()),
            anchor,
        };
        grouped.entry(document.id.clone()).or_default().duplicate_anchors.push(duplicate);
    }

    for report in grouped.values_mut() {
        report.sort();
    }

    return Report {
        documents: grouped,
        stats,
    };
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::types::{LinkReference, LinkSyntax, Outcome};

    fn doc(path: &str, text: &str) -> Document {
        Document::new(DocumentId::new(path), text.to_string(), BTreeSet::new())
    }

    fn anchor_at(doc: &Document, needle: &str) -> AnchorDefinition {
        let start = doc.raw_text.find(needle).unwrap();
        AnchorDefinition {
            byte_range: start..start + needle.len(),
            key: needle.trim_start_matches('^').to_string(),
            source: doc.id.clone(),
        }
    }

    fn broken_at(doc: &Document, needle: &str) -> ResolvedReference {
        let start = doc.raw_text.find(needle).unwrap();
        ResolvedReference {
            outcome: Outcome::BrokenUnknownDocument,
            reference: LinkReference {
                anchor_key: "k".to_string(),
                byte_range: start..start + needle.len(),
                raw_target: "C".to_string(),
                source: doc.id.clone(),
                syntax: LinkSyntax::Wiki,
            },
        }
    }

    struct Recorder(Vec<Location>);

    impl Navigator for Recorder {
        fn reveal(&mut self, location: &Location) {
            self.0.push(location.clone());
        }
    }

    fn sample() -> Report {
        let a = doc("A.md", "intro\nSee [[C#^k]] here ^late\n");
        let b = doc("B.md", "clean\n");
        let reconciliation = Reconciliation {
            broken_links: vec![broken_at(&a, "C#^k]")],
            duplicate_anchors: Vec::new(),
            orphan_anchors: vec![anchor_at(&a, "^late")],
            resolved: 0,
        };
        assemble(&[a, b], reconciliation, ScanStats::default(), 20)
    }

    #[test]
    fn groups_only_documents_with_findings() {
        let report = sample();
        assert_eq!(report.documents.len(), 1);
        assert!(report.documents.contains_key(&DocumentId::new("A.md")));
        assert_eq!(report.orphan_count(), 1);
        assert_eq!(report.broken_count(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn locations_are_line_and_column() {
        let report = sample();
        let a = &report.documents[&DocumentId::new("A.md")];
        assert_eq!(a.broken_links[0].location.line, 2);
        assert_eq!(a.broken_links[0].location.column, 7);
        assert_eq!(a.broken_links[0].context.matched, "C#^k]");
        assert_eq!(a.orphan_anchors[0].context.before, "...o See [[C#^k]] here ");
    }

    #[test]
    fn defects_are_in_offset_order() {
        let report = sample();
        let kinds: Vec<&str> = report
            .defects()
            .iter()
            .map(|d| match d {
                Defect::BrokenLink(_) => "broken",
                Defect::OrphanAnchor(_) => "orphan",
            })
            .collect();
        assert_eq!(kinds, vec!["broken", "orphan"]);
    }

    #[test]
    fn navigate_hands_location_to_host() {
        let report = sample();
        let mut recorder = Recorder(Vec::new());
        for defect in report.defects() {
            defect.navigate(&mut recorder);
        }
        assert_eq!(recorder.0.len(), 2);
        assert_eq!(recorder.0[0].document, DocumentId::new("A.md"));
        assert!(recorder.0[0].byte_range.start < recorder.0[1].byte_range.start);
    }

    #[test]
    fn empty_reconciliation_is_clean() {
        let report = assemble(&[doc("A.md", "x")], Reconciliation::default(), ScanStats::default(), 20);
        assert!(report.is_clean());
        assert!(report.documents.is_empty());
    }

    #[test]
    fn serializes_to_json() {
        let json = serde_json::to_value(sample()).unwrap();
        let broken = &json["documents"]["A.md"]["broken_links"][0];
        assert_eq!(broken["link"]["outcome"]["kind"], "broken_unknown_document");
        assert_eq!(broken["location"]["byte_range"]["start"], 12);
    }
}
