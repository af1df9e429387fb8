//! Structural metadata for a document: block regions found by tree-sitter-md
//! and aliases declared in YAML front matter.

use std::collections::BTreeSet;
use std::ops::Range;
use std::path::Path;

use serde::Serialize;
use tree_sitter::{Node, Parser, Tree};

use crate::error::Error;
use crate::sanitizer::{self, FrontMatterScope};

/// Kind of block region excluded from pattern matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    /// Fenced or indented code block.
    CodeBlock,
    /// ATX or setext heading.
    Heading,
}

/// A block region with its byte range in the raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    /// Byte range of the whole block.
    pub byte_range: Range<usize>,
    /// What the block is.
    pub kind: RegionKind,
}

/// Everything the scanner needs to know about a document besides its text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Structure {
    /// Alternative names declared in front matter.
    pub aliases: BTreeSet<String>,
    /// Headings and code blocks, in document order.
    pub regions: Vec<Region>,
}

impl Structure {
    /// Region byte ranges, ready to be used as ignore ranges.
    pub fn ignore_ranges(&self) -> Vec<Range<usize>> {
        return self.regions.iter().map(|r| return r.byte_range.clone()).collect();
    }
}

/// Parse `text` and collect its structural metadata.
///
/// # Errors
///
/// Returns `Error::ParseFailed` if the markdown grammar cannot be loaded or
/// tree-sitter gives up on the document.
pub fn analyze(file: &Path, text: &str) -> Result<Structure, Error> {
    let tree = parse_markdown(file, text)?;
    let mut regions = Vec::new();
    collect_regions(tree.root_node(), &mut regions);
    return Ok(Structure {
        aliases: front_matter_aliases(text),
        regions,
    });
}

/// Parse markdown into a block-level tree-sitter tree.
///
/// # Errors
///
/// Returns `Error::ParseFailed` if the language cannot be set or parsing fails.
fn parse_markdown(file: &Path, text: &str) -> Result<Tree, Error> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_md::LANGUAGE.into())
        .map_err(|e| return Error::ParseFailed {
            file: file.to_path_buf(),
            reason: e.to_string(),
        })?;

    return parser.parse(text, None).ok_or_else(|| return Error::ParseFailed {
        file: file.to_path_buf(),
        reason: "tree-sitter returned None".to_string(),
    });
}

/// Map a block node kind to the region it represents, if any.
fn region_kind(kind: &str) -> Option<RegionKind> {
    return match kind {
        "atx_heading" | "setext_heading" => Some(RegionKind::Heading),
        "fenced_code_block" | "indented_code_block" => Some(RegionKind::CodeBlock),
        _ => None,
    };
}

/// Walk the tree depth-first. Code blocks and headings are leaves for our
/// purposes, so their children are not visited.
fn collect_regions(node: Node<'_>, regions: &mut Vec<Region>) {
    if let Some(kind) = region_kind(node.kind()) {
        regions.push(Region {
            byte_range: node.byte_range(),
            kind,
        });
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_regions(child, regions);
    }
}

/// Read `aliases` (or `alias`) from YAML front matter.
///
/// The value may be a list or a comma-separated string. Front matter that is
/// not valid YAML declares no aliases.
pub fn front_matter_aliases(text: &str) -> BTreeSet<String> {
    let Some(fm) = sanitizer::front_matter(text, FrontMatterScope::FirstClose) else {
        return BTreeSet::new();
    };
    let Some(body) = text.get(fm.body) else {
        return BTreeSet::new();
    };

    let yaml: serde_yaml::Value = match serde_yaml::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!("ignoring unparseable front matter: {e}");
            return BTreeSet::new();
        },
    };

    let value = yaml.get("aliases").or_else(|| return yaml.get("alias"));
    let mut aliases = BTreeSet::new();
    match value {
        Some(serde_yaml::Value::Sequence(items)) => {
            for item in items {
                push_alias(&mut aliases, item);
            }
        },
        Some(item) => push_alias(&mut aliases, item),
        None => {},
    }
    return aliases;
}

/// Add one alias value, splitting strings on commas.
fn push_alias(aliases: &mut BTreeSet<String>, value: &serde_yaml::Value) {
    let text = match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(_)
        | serde_yaml::Value::Mapping(_)
        | serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Tagged(_) => return,
    };
    for part in text.split(',') {
        let alias = part.trim();
        if !alias.is_empty() {
            aliases.insert(alias.to_string());
        }
    }
}
