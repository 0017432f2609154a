//! Index definition: a nested mapping of path segments to destination directories.
//!
//! ```yaml
//! shell:
//!   bashrc: .
//!   config/*.conf: config/shell
//! ```
//!
//! Internal nodes are mappings, leaves are destination directories relative
//! to the destination root. See [`resolve()`] for how a tree is flattened into
//! [`Entry`] values.
mod resolve;

pub use resolve::{Entry, WILDCARD, resolve};

use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::IndexError;

/// A node in the index tree.
///
/// Siblings are stored in a [`BTreeMap`] so traversal order is always
/// lexicographic by segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Destination directory, relative to the destination root.
    Leaf(String),
    /// Nested path segments.
    Branch(BTreeMap<String, Node>),
}

/// Accepts exactly a string or a mapping, so a bad node is reported at its
/// own location rather than at the top of the document.
struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a destination directory or a mapping of path segments")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Node, E> {
        Ok(Node::Leaf(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Node, E> {
        Ok(Node::Leaf(value))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Node, A::Error> {
        let mut children = BTreeMap::new();
        while let Some((segment, node)) = map.next_entry::<String, Node>()? {
            children.insert(segment, node);
        }
        Ok(Node::Branch(children))
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

/// Parsed index definition.
///
/// The root must be a mapping; anything that is neither a mapping nor a
/// string at any depth is rejected when parsing.
///
/// # Examples
///
/// ```
/// use flexdot_cli::index::{IndexTree, Node};
///
/// let tree = IndexTree::from_yaml_str("bashrc: .\nvim:\n  vimrc: .\n").unwrap();
/// let (segment, node) = tree.roots().next().unwrap();
/// assert_eq!(segment, "bashrc");
/// assert_eq!(node, &Node::Leaf(".".to_string()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(transparent)]
pub struct IndexTree {
    roots: BTreeMap<String, Node>,
}

impl IndexTree {
    /// Parse an index from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not YAML, the root is not a mapping,
    /// or any node is neither a mapping nor a string.
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml_ng::Error> {
        serde_yaml_ng::from_str(content)
    }

    /// Read and parse the index file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Io`] if the file cannot be read and
    /// [`IndexError::Parse`] if its structure is invalid.
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let content = std::fs::read_to_string(path).map_err(|source| IndexError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content).map_err(|source| IndexError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Top-level segments and their nodes, in lexicographic order.
    pub fn roots(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.roots.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parse_nested_tree() {
        let tree = IndexTree::from_yaml_str(
            "shell:\n  bashrc: .\n  config/*.conf: config/shell\nvimrc: .\n",
        )
        .unwrap();
        let roots: Vec<(&str, &Node)> = tree.roots().collect();
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[1], ("vimrc", &Node::Leaf(".".to_string())));
        let Node::Branch(shell) = roots[0].1 else {
            panic!("shell should be a branch, got {:?}", roots[0].1);
        };
        assert_eq!(shell.get("bashrc"), Some(&Node::Leaf(".".to_string())));
        assert_eq!(
            shell.get("config/*.conf"),
            Some(&Node::Leaf("config/shell".to_string()))
        );
    }

    #[test]
    fn roots_are_sorted() {
        let tree = IndexTree::from_yaml_str("zsh: .\nbash: .\nfish: .\n").unwrap();
        let keys: Vec<&str> = tree.roots().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["bash", "fish", "zsh"]);
    }

    #[test]
    fn empty_mapping_is_empty_tree() {
        let tree = IndexTree::from_yaml_str("{}").unwrap();
        assert_eq!(tree.roots().count(), 0);
    }

    #[test]
    fn sequence_root_is_rejected() {
        assert!(IndexTree::from_yaml_str("- bashrc\n- vimrc\n").is_err());
    }

    #[test]
    fn sequence_leaf_is_rejected() {
        assert!(IndexTree::from_yaml_str("bashrc: [a, b]\n").is_err());
    }

    #[test]
    fn null_leaf_is_rejected() {
        assert!(IndexTree::from_yaml_str("bashrc:\n").is_err());
    }

    #[test]
    fn numeric_leaf_error_points_at_the_leaf() {
        let err = IndexTree::from_yaml_str("shell:\n  bashrc: .\n  zshrc: 1\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("zshrc"), "got {msg}");
        assert!(msg.contains("invalid type: integer `1`"), "got {msg}");
        assert!(msg.contains("line 3"), "got {msg}");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = IndexTree::load(&dir.path().join("index.yml")).unwrap_err();
        assert!(matches!(err, IndexError::Io { .. }));
    }

    #[test]
    fn load_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.yml");
        std::fs::write(&path, "bashrc: [.]\n").unwrap();
        let err = IndexTree::load(&path).unwrap_err();
        assert!(matches!(err, IndexError::Parse { .. }));
    }
}
