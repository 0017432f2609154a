//! Flatten an [`IndexTree`] into link entries, expanding wildcard segments.
use std::fmt;
use std::path::{Path, PathBuf};

use super::{IndexTree, Node};

/// Glyph that marks a segment for filesystem expansion.
pub const WILDCARD: char = '*';

/// One resolved source-to-destination mapping.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Entry {
    /// Source path relative to the dotfiles root.
    pub source: PathBuf,
    /// Destination directory relative to the destination root. The link is
    /// created at `dest_dir/<basename of source>`.
    pub dest_dir: PathBuf,
}

impl Entry {
    /// Create a new entry.
    pub fn new(source: impl Into<PathBuf>, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            dest_dir: dest_dir.into(),
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source.display(), self.dest_dir.display())
    }
}

/// Flatten `tree` into entries, depth first with siblings in lexicographic order.
///
/// Segment keys along a branch are joined with `/` to form the source path.
/// The first segment containing [`WILDCARD`] is expanded against the
/// filesystem under `source_root`: every match yields one entry, with any
/// remaining segments appended verbatim. Later wildcard segments on the same
/// branch are not expanded. Matches are sorted; a pattern with no matches (or
/// an invalid pattern) yields nothing.
///
/// `source_root` should be absolute so matches can be made relative to it.
#[must_use]
pub fn resolve(tree: &IndexTree, source_root: &Path) -> Vec<Entry> {
    let mut entries = Vec::new();
    let mut segments = Vec::new();
    for (segment, node) in tree.roots() {
        walk(node, segment, &mut segments, source_root, &mut entries);
    }
    entries
}

fn walk<'a>(
    node: &'a Node,
    segment: &'a str,
    segments: &mut Vec<&'a str>,
    source_root: &Path,
    entries: &mut Vec<Entry>,
) {
    segments.push(segment);
    match node {
        Node::Branch(children) => {
            for (child_segment, child) in children {
                walk(child, child_segment, segments, source_root, entries);
            }
        }
        Node::Leaf(dest_dir) => expand_leaf(segments, dest_dir, source_root, entries),
    }
    segments.pop();
}

fn expand_leaf(segments: &[&str], dest_dir: &str, source_root: &Path, entries: &mut Vec<Entry>) {
    let Some(wildcard_at) = segments.iter().position(|s| s.contains(WILDCARD)) else {
        entries.push(Entry::new(segments.join("/"), dest_dir));
        return;
    };

    let (head, tail) = segments.split_at(wildcard_at + 1);
    let root = source_root.to_string_lossy();
    let pattern = format!(
        "{}/{}",
        glob::Pattern::escape(root.trim_end_matches('/')),
        head.join("/")
    );

    let paths = match glob::glob(&pattern) {
        Ok(paths) => paths,
        Err(e) => {
            tracing::debug!("skipping invalid pattern {pattern}: {e}");
            return;
        }
    };

    let mut matches: Vec<PathBuf> = paths
        .filter_map(|p| {
            p.map_err(|e| tracing::debug!("skipping unreadable match: {e}"))
                .ok()
        })
        .collect();
    matches.sort();

    if matches.is_empty() {
        tracing::debug!("no matches for {}", head.join("/"));
    }

    for matched in matches {
        let Ok(relative) = matched.strip_prefix(source_root) else {
            continue;
        };
        let mut source = relative.to_path_buf();
        if !tail.is_empty() {
            source.push(tail.join("/"));
        }
        entries.push(Entry::new(source, dest_dir));
    }
}
