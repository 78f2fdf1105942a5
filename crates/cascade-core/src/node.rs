#![forbid(unsafe_code)]

//! Option trees for hierarchical selection.
//!
//! An [`OptionTree`] is plain nested data: a list of root [`OptionNode`]s, each
//! owning its children. There are no parent pointers; anything that needs
//! ancestry (label chains, filtering) computes it top-down while walking.
//!
//! # Example
//!
//! ```
//! use cascade_core::{OptionNode, OptionTree};
//!
//! let tree = OptionTree::new(vec![
//!     OptionNode::new("status", "Status")
//!         .child(OptionNode::new("active", "Active"))
//!         .child(OptionNode::new("pending", "Pending")),
//!     OptionNode::new("pool", "Pool")
//!         .child(OptionNode::new("1", "Pool 1")),
//! ]);
//!
//! assert_eq!(tree.roots().len(), 2);
//! assert_eq!(tree.total_count(), 5);
//! assert_eq!(tree.leaf_paths().len(), 3);
//! ```

use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashSet, FxHasher};

use crate::error::TreeError;
use crate::key::Key;
use crate::path::KeyPath;

/// A labeled, selectable option.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct OptionNode {
    value: Key,
    label: String,
    #[cfg_attr(
        feature = "state-persistence",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    children: Vec<OptionNode>,
    #[cfg_attr(
        feature = "state-persistence",
        serde(default, skip_serializing_if = "std::ops::Not::not")
    )]
    disabled: bool,
}

impl OptionNode {
    /// Create an enabled leaf option.
    #[must_use]
    pub fn new(value: impl Into<Key>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            children: Vec::new(),
            disabled: false,
        }
    }

    /// Add a child option.
    #[must_use]
    pub fn child(mut self, node: OptionNode) -> Self {
        self.children.push(node);
        self
    }

    /// Set children from a vec.
    #[must_use]
    pub fn with_children(mut self, nodes: Vec<OptionNode>) -> Self {
        self.children = nodes;
        self
    }

    /// Mark this option (and therefore its whole branch) unavailable.
    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Get the value.
    #[must_use]
    pub fn value(&self) -> &Key {
        &self.value
    }

    /// Get the label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Get the children.
    #[must_use]
    pub fn children(&self) -> &[OptionNode] {
        &self.children
    }

    /// Whether this option is disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Whether this option has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Find the direct child carrying `value`.
    #[must_use]
    pub fn find_child(&self, value: &Key) -> Option<&OptionNode> {
        self.children.iter().find(|child| &child.value == value)
    }

    /// Count this node and all of its descendants.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.children
            .iter()
            .fold(1usize, |acc, child| acc.saturating_add(child.total_count()))
    }

    fn depth(&self) -> usize {
        1 + self.children.iter().map(Self::depth).max().unwrap_or(0)
    }

    fn walk<'a, F>(&'a self, path: &mut KeyPath, visit: &mut F)
    where
        F: FnMut(&KeyPath, &'a OptionNode),
    {
        path.push(self.value.clone());
        visit(path, self);
        for child in &self.children {
            child.walk(path, visit);
        }
        path.pop();
    }

    fn hash_structure(&self, hasher: &mut FxHasher) {
        self.value.hash(hasher);
        self.label.hash(hasher);
        self.disabled.hash(hasher);
        self.children.len().hash(hasher);
        for child in &self.children {
            child.hash_structure(hasher);
        }
    }

    fn check_siblings(nodes: &[OptionNode], parent: &mut KeyPath) -> Result<(), TreeError> {
        let mut seen = FxHashSet::default();
        for node in nodes {
            if !seen.insert(&node.value) {
                return Err(TreeError::DuplicateSibling {
                    parent: parent.clone(),
                    value: node.value.clone(),
                });
            }
        }
        for node in nodes {
            parent.push(node.value.clone());
            Self::check_siblings(&node.children, parent)?;
            parent.pop();
        }
        Ok(())
    }
}

/// The caller-supplied forest of options.
///
/// Treated as immutable for the duration of a render cycle; operations that
/// narrow it (filtering) build a new tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct OptionTree {
    roots: Vec<OptionNode>,
}

impl OptionTree {
    /// Create a tree from its root options.
    #[must_use]
    pub fn new(roots: Vec<OptionNode>) -> Self {
        Self { roots }
    }

    /// Root-level options.
    #[must_use]
    pub fn roots(&self) -> &[OptionNode] {
        &self.roots
    }

    /// Whether the tree has no options at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Count every option in the tree.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.roots
            .iter()
            .fold(0usize, |acc, node| acc.saturating_add(node.total_count()))
    }

    /// Number of levels on the deepest branch.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.roots.iter().map(OptionNode::depth).max().unwrap_or(0)
    }

    /// Structural lookup of the node named by `path`.
    ///
    /// Unlike [`resolve_path`](crate::resolve_path) this ignores `disabled`;
    /// it is meant for display (labels of a stale or disabled selection).
    #[must_use]
    pub fn node_at(&self, path: &[Key]) -> Option<&OptionNode> {
        let (first, rest) = path.split_first()?;
        let mut current = self.roots.iter().find(|node| &node.value == first)?;
        for key in rest {
            current = current.find_child(key)?;
        }
        Some(current)
    }

    /// Labels along `path`, root first.
    #[must_use]
    pub fn labels_for(&self, path: &[Key]) -> Option<Vec<&str>> {
        let (first, rest) = path.split_first()?;
        let mut current = self.roots.iter().find(|node| &node.value == first)?;
        let mut labels = Vec::with_capacity(path.len());
        labels.push(current.label());
        for key in rest {
            current = current.find_child(key)?;
            labels.push(current.label());
        }
        Some(labels)
    }

    /// Visit every node depth-first (pre-order) with its full path.
    pub fn walk<'a, F>(&'a self, mut visit: F)
    where
        F: FnMut(&KeyPath, &'a OptionNode),
    {
        let mut path = KeyPath::new();
        for root in &self.roots {
            root.walk(&mut path, &mut visit);
        }
    }

    /// Paths of every leaf, in depth-first order.
    #[must_use]
    pub fn leaf_paths(&self) -> Vec<KeyPath> {
        let mut out = Vec::new();
        self.walk(|path, node| {
            if node.is_leaf() {
                out.push(path.clone());
            }
        });
        out
    }

    /// Stable structural hash, usable as a memoization key.
    ///
    /// Two trees with the same shape, values, labels, and disabled flags
    /// always produce the same fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.roots.len().hash(&mut hasher);
        for root in &self.roots {
            root.hash_structure(&mut hasher);
        }
        hasher.finish()
    }

    /// Check that sibling values are unique at every level.
    pub fn validate(&self) -> Result<(), TreeError> {
        OptionNode::check_siblings(&self.roots, &mut KeyPath::new())
    }

    /// Consume the tree, returning its roots.
    #[must_use]
    pub fn into_roots(self) -> Vec<OptionNode> {
        self.roots
    }
}

impl From<Vec<OptionNode>> for OptionTree {
    fn from(roots: Vec<OptionNode>) -> Self {
        Self::new(roots)
    }
}

impl FromIterator<OptionNode> for OptionTree {
    fn from_iter<I: IntoIterator<Item = OptionNode>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
