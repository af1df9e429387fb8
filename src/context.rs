//! Context windows around defects, and offset to line/column mapping.

use std::ops::Range;

use crate::types::ContextWindow;

/// Default number of characters shown on each side of a defect.
pub const DEFAULT_WINDOW: usize = 20;

/// Marker for a side of the window clipped before reaching the document edge.
pub const ELLIPSIS: &str = "...";

/// Cut `window` characters on each side of `byte_range` out of `raw`.
///
/// The range is clamped to the text and widened to character boundaries.
/// Line breaks in every part become single spaces.
pub fn build_context(raw: &str, byte_range: Range<usize>, window: usize) -> ContextWindow {
    let end = ceil_char_boundary(raw, byte_range.end);
    let start = floor_char_boundary(raw, byte_range.start.min(end));

    let begin = window_start(raw, start, window);
    let stop = window_end(raw, end, window);

    let mut before = flatten(raw.get(begin..start).unwrap_or(""));
    if begin > 0 {
        before.insert_str(0, ELLIPSIS);
    }
    let mut after = flatten(raw.get(end..stop).unwrap_or(""));
    if stop < raw.len() {
        after.push_str(ELLIPSIS);
    }

    return ContextWindow {
        after,
        before,
        matched: flatten(raw.get(start..end).unwrap_or("")),
    };
}

/// Offset of the `window`-th character before `start`, or 0.
fn window_start(raw: &str, start: usize, window: usize) -> usize {
    let Some(skip) = window.checked_sub(1) else {
        return start;
    };
    let head = raw.get(..start).unwrap_or("");
    return head.char_indices().rev().nth(skip).map_or(0, |(i, _)| return i);
}

/// Offset just past the `window`-th character after `end`, or the text length.
fn window_end(raw: &str, end: usize, window: usize) -> usize {
    let tail = raw.get(end..).unwrap_or("");
    return tail
        .char_indices()
        .nth(window)
        .map_or(raw.len(), |(i, _)| return end.saturating_add(i));
}

/// Replace each line break (`\r\n`, `\n` or `\r`) with one space.
fn flatten(text: &str) -> String {
    return text.replace("\r\n", " ").replace(['\n', '\r'], " ");
}

/// Largest char boundary at or below `offset`, clamped to the text.
fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset = offset.saturating_sub(1);
    }
    return offset;
}

/// Smallest char boundary at or above `offset`, clamped to the text.
fn ceil_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset = offset.saturating_add(1);
    }
    return offset;
}

/// One-based line and character column of a byte offset.
pub fn line_column(raw: &str, offset: usize) -> (usize, usize) {
    let offset = floor_char_boundary(raw, offset);
    let head = raw.get(..offset).unwrap_or("");
    let line_start = head.rfind('\n').map_or(0, |i| return i.saturating_add(1));
    let line = head.matches('\n').count().saturating_add(1);
    let column = head.get(line_start..).map_or(0, |s| return s.chars().count()).saturating_add(1);
    return (line, column);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn around(raw: &str, needle: &str, window: usize) -> ContextWindow {
        let start = raw.find(needle).unwrap();
        build_context(raw, start..start + needle.len(), window)
    }

    #[test]
    fn short_document_is_not_clipped() {
        let ctx = around("Some text ^abc123", "^abc123", DEFAULT_WINDOW);
        assert_eq!(ctx.before, "Some text ");
        assert_eq!(ctx.matched, "^abc123");
        assert_eq!(ctx.after, "");
    }

    #[test]
    fn clipped_sides_get_ellipsis() {
        let raw = "0123456789abcdefghij MATCH klmnopqrstuvwxyz0123456789";
        let ctx = around(raw, "MATCH", 5);
        assert_eq!(ctx.before, "...ghij ");
        assert_eq!(ctx.after, " klmn...");
    }

    #[test]
    fn window_reaching_exact_edges_is_not_clipped() {
        let ctx = around("abcXdef", "X", 3);
        assert_eq!(ctx.before, "abc");
        assert_eq!(ctx.after, "def");
    }

    #[test]
    fn newlines_become_spaces() {
        let ctx = around("line one\nSee [[B#^x]]\r\nnext", "B#^x]", 20);
        assert_eq!(ctx.before, "line one See [");
        assert_eq!(ctx.after, "] next");
    }

    #[test]
    fn counts_characters_not_bytes() {
        let ctx = around("ééééé ^k ééééé", "^k", 3);
        assert_eq!(ctx.before, "...éé ");
        assert_eq!(ctx.after, " éé...");
    }

    #[test]
    fn zero_window_shows_only_match() {
        let ctx = around("abc ^k def", "^k", 0);
        assert_eq!(ctx.before, "...");
        assert_eq!(ctx.matched, "^k");
        assert_eq!(ctx.after, "...");
    }

    #[test]
    fn out_of_range_offsets_are_clamped() {
        let ctx = build_context("short", 3..99, 2);
        assert_eq!(ctx.matched, "rt");
        assert_eq!(ctx.before, "...ho");
        assert_eq!(ctx.after, "");
    }

    #[test]
    fn line_and_column() {
        let raw = "first\nsecönd ^x\nthird";
        assert_eq!(line_column(raw, 0), (1, 1));
        assert_eq!(line_column(raw, raw.find("^x").unwrap()), (2, 8));
        assert_eq!(line_column(raw, raw.find("third").unwrap()), (3, 1));
    }
}
