//! Set subtraction between defined anchors and resolved references.

use std::collections::{HashMap, HashSet};

use crate::types::{AnchorDefinition, DocumentId, Outcome, ResolvedReference};

/// Outcome of reconciling a whole corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// References that did not resolve.
    pub broken_links: Vec<ResolvedReference>,
    /// Definitions sharing a `(document, key)` pair with another definition.
    /// Informational: they also appear in `orphan_anchors` when unreferenced.
    pub duplicate_anchors: Vec<AnchorDefinition>,
    /// Definitions no resolved reference points at.
    pub orphan_anchors: Vec<AnchorDefinition>,
    /// Number of references that resolved.
    pub resolved: usize,
}

/// Split anchors into orphaned and referenced, and collect broken links.
///
/// An anchor is referenced when any resolved reference names its
/// `(document, key)` pair. Duplicate definitions of one pair are all
/// retained, and a reference to the pair satisfies every one of them.
/// Input order does not affect which items land in which list.
pub fn reconcile(anchors: Vec<AnchorDefinition>, references: Vec<ResolvedReference>) -> Reconciliation {
    let mut hit: HashSet<(DocumentId, String)> = HashSet::new();
    let mut broken_links = Vec::new();
    let mut resolved = 0_usize;

    for reference in references {
        match &reference.outcome {
            Outcome::Resolved { anchor_key, target } => {
                hit.insert((target.clone(), anchor_key.clone()));
                resolved = resolved.saturating_add(1);
            },
            Outcome::BrokenUnknownAnchor { .. } | Outcome::BrokenUnknownDocument => {
                broken_links.push(reference);
            },
        }
    }

    let duplicate_anchors = find_duplicates(&anchors);
    let orphan_anchors = anchors
        .into_iter()
        .filter(|a| return !hit.contains(&(a.source.clone(), a.key.clone())))
        .collect();

    return Reconciliation {
        broken_links,
        duplicate_anchors,
        orphan_anchors,
        resolved,
    };
}

/// Every definition whose `(document, key)` pair occurs more than once.
fn find_duplicates(anchors: &[AnchorDefinition]) -> Vec<AnchorDefinition> {
    let mut counts: HashMap<(&DocumentId, &str), usize> = HashMap::new();
    for anchor in anchors {
        let count = counts.entry((&anchor.source, anchor.key.as_str())).or_default();
        *count = count.saturating_add(1);
    }
    return anchors
        .iter()
        .filter(|a| return counts.get(&(&a.source, a.key.as_str())).is_some_and(|n| return *n > 1))
        .cloned()
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LinkReference, LinkSyntax};

    fn anchor(doc: &str, key: &str, start: usize) -> AnchorDefinition {
        AnchorDefinition {
            byte_range: start..start + key.len() + 1,
            key: key.to_string(),
            source: DocumentId::new(doc),
        }
    }

    fn link(source: &str, outcome: Outcome) -> ResolvedReference {
        ResolvedReference {
            outcome,
            reference: LinkReference {
                anchor_key: "k".to_string(),
                byte_range: 0..1,
                raw_target: String::new(),
                source: DocumentId::new(source),
                syntax: LinkSyntax::Wiki,
            },
        }
    }

    fn hit(target: &str, key: &str) -> Outcome {
        Outcome::Resolved {
            anchor_key: key.to_string(),
            target: DocumentId::new(target),
        }
    }

    #[test]
    fn unreferenced_anchor_is_orphan() {
        let result = reconcile(vec![anchor("A.md", "abc123", 10)], Vec::new());
        assert_eq!(result.orphan_anchors.len(), 1);
        assert!(result.broken_links.is_empty());
    }

    #[test]
    fn two_references_to_one_anchor() {
        let result = reconcile(
            vec![anchor("A.md", "f1", 0)],
            vec![link("B.md", hit("A.md", "f1")), link("C.md", hit("A.md", "f1"))],
        );
        assert!(result.orphan_anchors.is_empty());
        assert!(result.broken_links.is_empty());
        assert_eq!(result.resolved, 2);
    }

    #[test]
    fn same_key_in_other_document_does_not_count() {
        let result = reconcile(vec![anchor("A.md", "f1", 0)], vec![link("A.md", hit("B.md", "f1"))]);
        assert_eq!(result.orphan_anchors.len(), 1);
    }

    #[test]
    fn broken_outcomes_are_collected() {
        let result = reconcile(
            Vec::new(),
            vec![
                link("A.md", Outcome::BrokenUnknownDocument),
                link(
                    "A.md",
                    Outcome::BrokenUnknownAnchor {
                        target: DocumentId::new("B.md"),
                    },
                ),
                link("A.md", hit("B.md", "x")),
            ],
        );
        assert_eq!(result.broken_links.len(), 2);
        assert_eq!(result.resolved, 1);
    }

    #[test]
    fn duplicates_are_all_satisfied_by_one_reference() {
        let result = reconcile(
            vec![anchor("A.md", "dup", 0), anchor("A.md", "dup", 20)],
            vec![link("B.md", hit("A.md", "dup"))],
        );
        assert!(result.orphan_anchors.is_empty());
        assert_eq!(result.duplicate_anchors.len(), 2);
    }

    #[test]
    fn unreferenced_duplicates_are_each_orphaned() {
        let result = reconcile(vec![anchor("A.md", "dup", 0), anchor("A.md", "dup", 20)], Vec::new());
        assert_eq!(result.orphan_anchors.len(), 2);
        assert_eq!(result.duplicate_anchors.len(), 2);
    }

    #[test]
    fn every_anchor_is_orphan_or_referenced() {
        let anchors = vec![anchor("A.md", "a", 0), anchor("A.md", "b", 5), anchor("B.md", "a", 0)];
        let refs = vec![link("C.md", hit("A.md", "a"))];
        let result = reconcile(anchors.clone(), refs);
        let referenced = anchors.iter().filter(|a| !result.orphan_anchors.contains(a)).count();
        assert_eq!(referenced + result.orphan_anchors.len(), anchors.len());
        assert_eq!(referenced, 1);
    }

    #[test]
    fn order_does_not_change_result() {
        let anchors = vec![anchor("A.md", "a", 0), anchor("B.md", "b", 0)];
        let refs = vec![link("C.md", hit("B.md", "b")), link("C.md", Outcome::BrokenUnknownDocument)];
        let forward = reconcile(anchors.clone(), refs.clone());
        let backward = reconcile(anchors.into_iter().rev().collect(), refs.into_iter().rev().collect());
        assert_eq!(forward.orphan_anchors, backward.orphan_anchors);
        assert_eq!(forward.broken_links, backward.broken_links);
    }
}
