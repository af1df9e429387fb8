//! Read-only lookup tables over a fully built corpus: link paths, file
//! names, aliases, and the anchors each document defines.

use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};

use crate::document::Document;
use crate::types::{AnchorDefinition, DocumentId};

/// Corpus-wide index built once all documents have been extracted.
#[derive(Debug, Default)]
pub struct CorpusIndex {
    /// Lowercased alias to the documents declaring it.
    by_alias: HashMap<String, Vec<DocumentId>>,
    /// Lowercased title and file name to documents with that name.
    by_name: HashMap<String, Vec<DocumentId>>,
    /// Lowercased relative path, with and without its extension, to document.
    by_path: HashMap<String, DocumentId>,
    /// Anchor keys defined in each document.
    anchors: HashMap<DocumentId, HashSet<String>>,
}

impl CorpusIndex {
    /// Index documents and the anchors extracted from them.
    pub fn build<'a, D, A>(documents: D, anchors: A) -> Self
    where
        D: IntoIterator<Item = &'a Document>,
        A: IntoIterator<Item = &'a AnchorDefinition>,
    {
        let mut index = Self::default();
        for document in documents {
            index.insert_document(document);
        }
        for anchor in anchors {
            index
                .anchors
                .entry(anchor.source.clone())
                .or_default()
                .insert(anchor.key.clone());
        }
        return index;
    }

    /// Register one document under its paths, names and aliases.
    fn insert_document(&mut self, document: &Document) {
        let id = &document.id;
        self.by_path.insert(id.as_str().to_lowercase(), id.clone());
        self.by_path.insert(id.link_path().to_lowercase(), id.clone());

        let title = document.title.to_lowercase();
        let file_name = id.file_name().to_lowercase();
        if file_name != title {
            self.by_name.entry(file_name).or_default().push(id.clone());
        }
        self.by_name.entry(title).or_default().push(id.clone());
        for alias in &document.aliases {
            self.by_alias
                .entry(alias.to_lowercase())
                .or_default()
                .push(id.clone());
        }
        self.anchors.entry(id.clone()).or_default();
    }

    /// Whether `document` defines an anchor named `key`.
    pub fn has_anchor(&self, document: &DocumentId, key: &str) -> bool {
        return self.anchors.get(document).is_some_and(|keys| return keys.contains(key));
    }

    /// Resolve a link path written in `source` to a document.
    ///
    /// An empty path means `source` itself. Paths starting with `./` or `../`
    /// are relative to the source's folder. The file extension is optional.
    /// Other paths containing `/` are
    /// tried as corpus-absolute, then relative, then as a path suffix. Bare
    /// names match file stems, then aliases. When several documents match,
    /// the one closest to `source` wins.
    pub fn resolve_path(&self, path: &str, source: &DocumentId) -> Option<&DocumentId> {
        let path = path.trim();
        if path.is_empty() {
            return self.by_path.get(&source.as_str().to_lowercase());
        }

        let wanted = path.to_lowercase();
        let source_folder = source.folder().to_lowercase();

        if wanted.starts_with("./") || wanted.starts_with("../") {
            let joined = normalize_link_path(&format!("{source_folder}/{wanted}"));
            return self.by_path.get(&joined);
        }

        if wanted.contains('/') {
            let absolute = normalize_link_path(wanted.trim_start_matches('/'));
            if let Some(id) = self.by_path.get(&absolute) {
                return Some(id);
            }
            let relative = normalize_link_path(&format!("{source_folder}/{wanted}"));
            if let Some(id) = self.by_path.get(&relative) {
                return Some(id);
            }
            let suffix = format!("/{absolute}");
            let candidates: Vec<&DocumentId> = self
                .by_path
                .iter()
                .filter(|(key, _)| return key.ends_with(&suffix))
                .map(|(_, id)| return id)
                .collect();
            return closest(candidates, source);
        }

        if let Some(named) = self.by_name.get(&wanted) {
            return closest(named.iter().collect(), source);
        }
        if let Some(aliased) = self.by_alias.get(&wanted) {
            return closest(aliased.iter().collect(), source);
        }
        return None;
    }
}

/// Pick the candidate nearest to `source`: most shared leading folders,
/// then shortest path, then alphabetical.
fn closest<'a>(candidates: Vec<&'a DocumentId>, source: &DocumentId) -> Option<&'a DocumentId> {
    return candidates.into_iter().min_by(|a, b| {
        let shared_a = shared_folders(a, source);
        let shared_b = shared_folders(b, source);
        return shared_b
            .cmp(&shared_a)
            .then_with(|| return a.as_str().len().cmp(&b.as_str().len()))
            .then_with(|| return a.cmp(b));
    });
}

/// Number of leading folder segments two documents have in common.
fn shared_folders(a: &DocumentId, b: &DocumentId) -> usize {
    let folders_a = a.folder().split('/').filter(|s| return !s.is_empty());
    let folders_b = b.folder().split('/').filter(|s| return !s.is_empty());
    return folders_a.zip(folders_b).take_while(|(x, y)| return x == y).count();
}

/// Collapse `.` and `..` segments and render with `/` separators.
fn normalize_link_path(path: &str) -> String {
    let normalized = normalize_path(Path::new(path));
    let parts: Vec<String> = normalized
        .components()
        .map(|c| return c.as_os_str().to_string_lossy().into_owned())
        .collect();
    return parts.join("/");
}

/// Collapse `.` and `..` components in a path without touching the filesystem.
/// Preserves leading `..` when there is nothing left to pop.
fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        push_normalized_component(&mut components, component);
    }
    return components.iter().collect();
}

/// Handle a single path component during normalization.
/// Pops the last component for `..` when possible, preserves it otherwise.
fn push_normalized_component<'a>(components: &mut Vec<Component<'a>>, component: Component<'a>) {
    match component {
        Component::CurDir | Component::RootDir | Component::Prefix(_) => {},
        Component::ParentDir => {
            let can_pop = matches!(components.last(), Some(c) if !matches!(c, Component::ParentDir));
            if can_pop {
                components.pop();
            } else {
                components.push(component);
            }
        },
        Component::Normal(_) => components.push(component),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn doc(path: &str, aliases: &[&str]) -> Document {
        Document::new(
            DocumentId::new(path),
            String::new(),
            aliases.iter().map(|a| a.to_string()).collect::<BTreeSet<_>>(),
        )
    }

    fn index(docs: &[Document]) -> CorpusIndex {
        CorpusIndex::build(docs, std::iter::empty::<&AnchorDefinition>())
    }

    fn resolve<'a>(index: &'a CorpusIndex, path: &str, source: &str) -> Option<&'a str> {
        index.resolve_path(path, &DocumentId::new(source)).map(DocumentId::as_str)
    }

    #[test]
    fn empty_path_is_source_document() {
        let idx = index(&[doc("a/Here.md", &[])]);
        assert_eq!(resolve(&idx, "", "a/Here.md"), Some("a/Here.md"));
    }

    #[test]
    fn bare_name_is_case_insensitive() {
        let idx = index(&[doc("notes/Target.md", &[])]);
        assert_eq!(resolve(&idx, "target", "Index.md"), Some("notes/Target.md"));
        assert_eq!(resolve(&idx, "Target.md", "Index.md"), Some("notes/Target.md"));
    }

    #[test]
    fn full_path_resolves() {
        let idx = index(&[doc("a/Same.md", &[]), doc("b/Same.md", &[])]);
        assert_eq!(resolve(&idx, "b/Same", "a/Other.md"), Some("b/Same.md"));
        assert_eq!(resolve(&idx, "/a/Same.md", "b/Other.md"), Some("a/Same.md"));
    }

    #[test]
    fn relative_paths_use_source_folder() {
        let idx = index(&[doc("a/b/Deep.md", &[]), doc("a/Up.md", &[])]);
        assert_eq!(resolve(&idx, "../Up", "a/b/Deep.md"), Some("a/Up.md"));
        assert_eq!(resolve(&idx, "./Deep", "a/b/Other.md"), Some("a/b/Deep.md"));
        assert_eq!(resolve(&idx, "../../../Up", "a/b/Deep.md"), None);
    }

    #[test]
    fn path_suffix_resolves() {
        let idx = index(&[doc("vault/projects/x/Plan.md", &[])]);
        assert_eq!(resolve(&idx, "x/Plan", "Index.md"), Some("vault/projects/x/Plan.md"));
    }

    #[test]
    fn duplicate_names_prefer_closest_folder() {
        let idx = index(&[doc("a/Dup.md", &[]), doc("b/c/Dup.md", &[])]);
        assert_eq!(resolve(&idx, "Dup", "b/c/Src.md"), Some("b/c/Dup.md"));
        assert_eq!(resolve(&idx, "Dup", "a/Src.md"), Some("a/Dup.md"));
    }

    #[test]
    fn duplicate_names_fall_back_to_shortest_path() {
        let idx = index(&[doc("deep/er/Dup.md", &[]), doc("x/Dup.md", &[])]);
        assert_eq!(resolve(&idx, "Dup", "Root.md"), Some("x/Dup.md"));
    }

    #[test]
    fn alias_resolves_when_no_name_matches() {
        let idx = index(&[doc("People/Ada Lovelace.md", &["Ada"])]);
        assert_eq!(resolve(&idx, "ada", "Index.md"), Some("People/Ada Lovelace.md"));
    }

    #[test]
    fn name_wins_over_alias() {
        let idx = index(&[doc("Ada.md", &[]), doc("People/Ada Lovelace.md", &["Ada"])]);
        assert_eq!(resolve(&idx, "Ada", "People/Index.md"), Some("Ada.md"));
    }

    #[test]
    fn unknown_path_is_none() {
        let idx = index(&[doc("A.md", &[])]);
        assert_eq!(resolve(&idx, "C", "A.md"), None);
        assert_eq!(resolve(&idx, "x/C", "A.md"), None);
    }

    #[test]
    fn anchors_are_looked_up_per_document() {
        let docs = [doc("A.md", &[]), doc("B.md", &[])];
        let anchor = AnchorDefinition {
            byte_range: 0..3,
            key: "f1".to_string(),
            source: DocumentId::new("A.md"),
        };
        let idx = CorpusIndex::build(&docs, [&anchor]);
        assert!(idx.has_anchor(&DocumentId::new("A.md"), "f1"));
        assert!(!idx.has_anchor(&DocumentId::new("B.md"), "f1"));
        assert!(!idx.has_anchor(&DocumentId::new("A.md"), "F1"));
    }

    #[test]
    fn other_extensions_resolve_by_path_and_name() {
        let idx = index(&[doc("dir/Note.markdown", &[])]);
        assert_eq!(resolve(&idx, "dir/Note", "Index.md"), Some("dir/Note.markdown"));
        assert_eq!(resolve(&idx, "dir/Note.markdown", "Index.md"), Some("dir/Note.markdown"));
        assert_eq!(resolve(&idx, "./Note", "dir/Other.md"), Some("dir/Note.markdown"));
        assert_eq!(resolve(&idx, "Note", "Index.md"), Some("dir/Note.markdown"));
        assert_eq!(resolve(&idx, "note.MARKDOWN", "Index.md"), Some("dir/Note.markdown"));
    }

    #[test]
    fn names_come_from_the_document_title() {
        let mut titled = doc("x/2024-01-01.md", &[]);
        titled.title = "Daily".to_string();
        let idx = index(&[titled]);
        assert_eq!(resolve(&idx, "daily", "Index.md"), Some("x/2024-01-01.md"));
        assert_eq!(resolve(&idx, "2024-01-01.md", "Index.md"), Some("x/2024-01-01.md"));
    }

    #[test]
    fn normalizes_dot_segments() {
        assert_eq!(normalize_link_path("a/./b/../c"), "a/c");
        assert_eq!(normalize_link_path("/a/b"), "a/b");
        assert_eq!(normalize_link_path("../x"), "../x");
    }
}
