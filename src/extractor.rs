//! Anchor and reference extraction from sanitized document text.
//!
//! Both passes are plain regex scans of one document. They never look at
//! other documents; cross-document work belongs to the resolver.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::types::{AnchorDefinition, DocumentId, LinkReference, LinkSyntax};

/// `^key` at the end of a line.
#[allow(clippy::expect_used, reason = "hardcoded pattern")]
static ANCHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)\^([A-Za-z0-9-]+)\r?$").expect("valid regex"));

/// `[path#^key]`, `[path#^key|`, `(path#^key)` or `(<path#^key>)`; the pipe
/// may be escaped inside tables.
#[allow(clippy::expect_used, reason = "hardcoded pattern")]
static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([\[(])([^\[\]()|#\r\n]*)#\^([A-Za-z0-9-]+)>?\\?[\])|]").expect("valid regex"));

/// Find every anchor definition in `sanitized`.
pub fn extract_anchors(source: &DocumentId, sanitized: &str) -> Vec<AnchorDefinition> {
    let mut anchors = Vec::new();
    for caps in ANCHOR.captures_iter(sanitized) {
        let Some(anchor) = anchor_from_capture(source, &caps) else {
            continue;
        };
        anchors.push(anchor);
    }
    return anchors;
}

/// Build an anchor from a match. Matches without exactly one key group are skipped.
fn anchor_from_capture(source: &DocumentId, caps: &Captures<'_>) -> Option<AnchorDefinition> {
    if caps.len() != 2 {
        return None;
    }
    let whole = caps.get(0)?;
    let key = caps.get(1)?;
    return Some(AnchorDefinition {
        byte_range: whole.start()..key.end(),
        key: key.as_str().to_string(),
        source: source.clone(),
    });
}

/// Find every block reference in `sanitized`.
pub fn extract_references(source: &DocumentId, sanitized: &str) -> Vec<LinkReference> {
    let mut references = Vec::new();
    for caps in REFERENCE.captures_iter(sanitized) {
        let Some(reference) = reference_from_capture(source, &caps) else {
            continue;
        };
        references.push(reference);
    }
    return references;
}

/// Build a reference from a match. The range skips the opening delimiter.
fn reference_from_capture(source: &DocumentId, caps: &Captures<'_>) -> Option<LinkReference> {
    let whole = caps.get(0)?;
    let opener = caps.get(1)?;
    let target = caps.get(2)?;
    let key = caps.get(3)?;

    let syntax = if opener.as_str() == "(" { LinkSyntax::Markdown } else { LinkSyntax::Wiki };

    return Some(LinkReference {
        anchor_key: key.as_str().to_string(),
        byte_range: opener.end()..whole.end(),
        raw_target: target.as_str().to_string(),
        source: source.clone(),
        syntax,
    });
}
