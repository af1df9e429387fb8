//! Ignore-range sources and length-preserving redaction of document text.
//!
//! Each source is an independent function returning byte ranges over the raw
//! text. The ranges are unioned into a [`RangeSet`] and [`sanitize`] blanks
//! them, so patterns searched in the sanitized text report offsets that are
//! valid in the raw text.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ranges::RangeSet;

/// Replacement for every byte of an ignored character.
const BLANK: char = ' ';

/// How far a front-matter block extends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrontMatterScope {
    /// From the opening `---` line to the first closing `---` line.
    FirstClose,
    /// From the opening `---` line to the last `---` line in the document.
    #[default]
    Greedy,
}

/// Opening delimiter at the very top, greedy to the last delimiter line.
#[allow(clippy::expect_used, reason = "hardcoded pattern")]
static FRONT_MATTER_GREEDY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?ms)\A---[ \t]*\r?$(.*)^---[ \t]*\r?$").expect("valid regex"));

/// Opening delimiter at the very top, up to the first closing delimiter line.
#[allow(clippy::expect_used, reason = "hardcoded pattern")]
static FRONT_MATTER_FIRST_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?ms)\A---[ \t]*\r?$(.*?)^---[ \t]*\r?$").expect("valid regex"));

/// Single-backtick code span on one line.
#[allow(clippy::expect_used, reason = "hardcoded pattern")]
static INLINE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`[^`\r\n]+`").expect("valid regex"));

/// HTML comments (may span lines) and opening, closing or void tags on one line.
#[allow(clippy::expect_used, reason = "hardcoded pattern")]
static HTML: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<!--.*?-->|</?[A-Za-z][A-Za-z0-9-]*(?:[ \t][^<>\r\n]*)?/?>").expect("valid regex")
});

/// `scheme://...` or `www....` tokens up to whitespace or a bracket.
#[allow(clippy::expect_used, reason = "hardcoded pattern")]
static BARE_WEB_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\b[A-Za-z][A-Za-z0-9+.-]*://|\bwww\.)[^\s<>()\[\]]+").expect("valid regex"));

/// A front-matter block and its inner body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter {
    /// Bytes between the delimiter lines.
    pub body: Range<usize>,
    /// Whole block including both delimiter lines.
    pub block: Range<usize>,
}

/// Locate the front-matter block at the top of `text`, if any.
/// An unterminated block yields `None`.
pub fn front_matter(text: &str, scope: FrontMatterScope) -> Option<FrontMatter> {
    let pattern = match scope {
        FrontMatterScope::FirstClose => &*FRONT_MATTER_FIRST_CLOSE,
        FrontMatterScope::Greedy => &*FRONT_MATTER_GREEDY,
    };
    let caps = pattern.captures(text)?;
    let block = caps.get(0)?;
    let body = caps.get(1)?;
    return Some(FrontMatter {
        body: body.range(),
        block: block.range(),
    });
}

/// Front-matter block as an ignore range.
pub fn front_matter_ranges(text: &str, scope: FrontMatterScope) -> Vec<Range<usize>> {
    return front_matter(text, scope).map(|fm| return fm.block).into_iter().collect();
}

/// Inline code spans delimited by single backticks.
pub fn inline_code_ranges(text: &str) -> Vec<Range<usize>> {
    return INLINE_CODE.find_iter(text).map(|m| return m.range()).collect();
}

/// HTML tags and comments. A `<...>` opening a markdown link destination
/// (`[t](<path>)`) is not a tag.
pub fn html_ranges(text: &str) -> Vec<Range<usize>> {
    return HTML
        .find_iter(text)
        .filter(|m| return !text.get(..m.start()).is_some_and(|before| return before.ends_with("](")))
        .map(|m| return m.range())
        .collect();
}

/// Bare web links.
pub fn web_link_ranges(text: &str) -> Vec<Range<usize>> {
    return BARE_WEB_LINK.find_iter(text).map(|m| return m.range()).collect();
}

/// Union of all ignore-range sources for one document.
///
/// `structural` holds regions supplied by the host (headings, code blocks).
pub fn ignore_ranges(text: &str, structural: &[Range<usize>], scope: FrontMatterScope) -> RangeSet {
    let scanners: [fn(&str) -> Vec<Range<usize>>; 3] = [inline_code_ranges, html_ranges, web_link_ranges];

    let mut set: RangeSet = structural.iter().cloned().collect();
    set.extend(front_matter_ranges(text, scope));
    for scan in scanners {
        set.extend(scan(text));
    }
    return set;
}

/// Blank every character whose first byte lies in `ignore`.
///
/// Each byte of a blanked character becomes a space, so the output has the
/// same byte length as `raw` and every offset keeps its meaning. Line breaks
/// are kept so line-anchored patterns behave the same as on the raw text.
pub fn sanitize(raw: &str, ignore: &RangeSet) -> String {
    if ignore.is_empty() {
        return raw.to_owned();
    }

    let mut out = String::with_capacity(raw.len());
    for (offset, ch) in raw.char_indices() {
        if ch == '\n' || ch == '\r' || !ignore.contains(offset) {
            out.push(ch);
            continue;
        }
        out.extend(std::iter::repeat_n(BLANK, ch.len_utf8()));
    }
    return out;
}
