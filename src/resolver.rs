use crate::index::CorpusIndex;
use crate::types::{LinkReference, LinkSyntax, Outcome, ResolvedReference};

/// Path and anchor key of a reference after link-path parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    /// Anchor key without `#^`.
    pub anchor_key: String,
    /// Decoded, trimmed target path. Empty means the current document.
    pub path: String,
}

/// Split a reference into its target path and anchor key.
///
/// Angle brackets around a markdown link destination are dropped. Returns
/// `None` for malformed references: an invalid percent escape in a markdown
/// link, a path that is an external URL, or an empty key.
pub fn parse_link_target(reference: &LinkReference) -> Option<LinkTarget> {
    if reference.anchor_key.is_empty() {
        return None;
    }

    let raw = reference.raw_target.trim();
    let path = match reference.syntax {
        LinkSyntax::Markdown => {
            let raw = raw.strip_prefix('<').unwrap_or(raw);
            let raw = raw.strip_suffix('>').unwrap_or(raw);
            urlencoding::decode(raw).ok()?.into_owned()
        },
        LinkSyntax::Wiki => raw.to_string(),
    };

    if path.contains("://") {
        return None;
    }

    return Some(LinkTarget {
        anchor_key: reference.anchor_key.clone(),
        path: path.trim().to_string(),
    });
}

/// Classify one reference against the corpus.
///
/// Returns `None` if the reference is malformed; such references are not
/// defects and are only counted.
pub fn resolve(reference: &LinkReference, index: &CorpusIndex) -> Option<ResolvedReference> {
    let Some(target) = parse_link_target(reference) else {
        tracing::debug!(
            document = %reference.source,
            link = %reference.raw_target,
            "skipping malformed reference"
        );
        return None;
    };

    let outcome = match index.resolve_path(&target.path, &reference.source) {
        None => Outcome::BrokenUnknownDocument,
        Some(document) if index.has_anchor(document, &target.anchor_key) => Outcome::Resolved {
            anchor_key: target.anchor_key,
            target: document.clone(),
        },
        Some(document) => Outcome::BrokenUnknownAnchor {
            target: document.clone(),
        },
    };

    return Some(ResolvedReference {
        outcome,
        reference: reference.clone(),
    });
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::document::Document;
    use crate::types::{AnchorDefinition, DocumentId};

    fn reference(raw_target: &str, key: &str, syntax: LinkSyntax) -> LinkReference {
        LinkReference {
            anchor_key: key.to_string(),
            byte_range: 0..1,
            raw_target: raw_target.to_string(),
            source: DocumentId::new("A.md"),
            syntax,
        }
    }

    fn corpus() -> CorpusIndex {
        let docs = [
            Document::new(DocumentId::new("A.md"), String::new(), BTreeSet::new()),
            Document::new(DocumentId::new("My Note.md"), String::new(), BTreeSet::new()),
        ];
        let anchors = [
            AnchorDefinition {
                byte_range: 0..3,
                key: "q1".to_string(),
                source: DocumentId::new("My Note.md"),
            },
            AnchorDefinition {
                byte_range: 0..3,
                key: "self".to_string(),
                source: DocumentId::new("A.md"),
            },
        ];
        CorpusIndex::build(&docs, &anchors)
    }

    #[test]
    fn markdown_paths_are_percent_decoded() {
        let target = parse_link_target(&reference("My%20Note.md", "q1", LinkSyntax::Markdown)).unwrap();
        assert_eq!(target.path, "My Note.md");
    }

    #[test]
    fn angle_brackets_are_stripped_from_markdown_paths() {
        let target = parse_link_target(&reference("<My Note.md", "q1", LinkSyntax::Markdown)).unwrap();
        assert_eq!(target.path, "My Note.md");
        let resolved = resolve(&reference("<My Note.md", "q1", LinkSyntax::Markdown), &corpus()).unwrap();
        assert!(!resolved.outcome.is_broken());
    }

    #[test]
    fn wiki_paths_are_verbatim() {
        let target = parse_link_target(&reference(" My%20Note ", "q1", LinkSyntax::Wiki)).unwrap();
        assert_eq!(target.path, "My%20Note");
    }

    #[test]
    fn invalid_escape_is_malformed() {
        assert!(parse_link_target(&reference("bad%FF%FE", "q1", LinkSyntax::Markdown)).is_none());
    }

    #[test]
    fn url_target_is_malformed() {
        assert!(parse_link_target(&reference("https://x.y/z", "q1", LinkSyntax::Markdown)).is_none());
    }

    #[test]
    fn resolved_when_document_and_anchor_exist() {
        let resolved = resolve(&reference("My%20Note.md", "q1", LinkSyntax::Markdown), &corpus()).unwrap();
        assert_eq!(
            resolved.outcome,
            Outcome::Resolved {
                anchor_key: "q1".to_string(),
                target: DocumentId::new("My Note.md"),
            }
        );
    }

    #[test]
    fn unknown_anchor_in_known_document() {
        let resolved = resolve(&reference("My Note", "nope", LinkSyntax::Wiki), &corpus()).unwrap();
        assert_eq!(
            resolved.outcome,
            Outcome::BrokenUnknownAnchor {
                target: DocumentId::new("My Note.md"),
            }
        );
    }

    #[test]
    fn unknown_document() {
        let resolved = resolve(&reference("C", "xyz", LinkSyntax::Wiki), &corpus()).unwrap();
        assert_eq!(resolved.outcome, Outcome::BrokenUnknownDocument);
        assert!(resolved.outcome.is_broken());
    }

    #[test]
    fn empty_path_targets_source_document() {
        let resolved = resolve(&reference("", "self", LinkSyntax::Wiki), &corpus()).unwrap();
        assert!(!resolved.outcome.is_broken());
    }

    #[test]
    fn malformed_reference_is_skipped() {
        assert!(resolve(&reference("%C3%28", "q1", LinkSyntax::Markdown), &corpus()).is_none());
    }
}
