#![forbid(unsafe_code)]

//! Selection paths and their resolution against an option tree.
//!
//! A [`KeyPath`] lists option values from a root option down to the option it
//! names. Paths carry no reference to the tree they were built from; whether a
//! path is still meaningful is decided each time by [`resolve_path`].
//!
//! # Example
//!
//! ```
//! use cascade_core::{KeyPath, OptionNode, OptionTree, ResolveError, resolve_path};
//!
//! let tree = OptionTree::new(vec![
//!     OptionNode::new("china", "China")
//!         .child(OptionNode::new("beijing", "Beijing"))
//!         .child(OptionNode::new("lhasa", "Lhasa").with_disabled(true)),
//! ]);
//!
//! let node = resolve_path(&tree, &KeyPath::from(["china", "beijing"])).unwrap();
//! assert_eq!(node.label(), "Beijing");
//! assert_eq!(
//!     resolve_path(&tree, &KeyPath::from(["china", "lhasa"])),
//!     Err(ResolveError::Disabled { depth: 1 }),
//! );
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use smallvec::SmallVec;

use crate::error::ResolveError;
use crate::key::Key;
use crate::node::{OptionNode, OptionTree};

/// Inline capacity; most cascaders are two or three levels deep.
const INLINE_SEGMENTS: usize = 4;

/// Ordered list of option values from a root to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct KeyPath {
    segments: SmallVec<[Key; INLINE_SEGMENTS]>,
}

impl KeyPath {
    /// Create an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// First segment: the top-level category of the path.
    #[must_use]
    pub fn category(&self) -> Option<&Key> {
        self.segments.first()
    }

    /// Last segment: the value of the node the path names.
    #[must_use]
    pub fn leaf(&self) -> Option<&Key> {
        self.segments.last()
    }

    /// Path of the parent node, or `None` for root-level and empty paths.
    #[must_use]
    pub fn parent(&self) -> Option<KeyPath> {
        match self.segments.len() {
            0 | 1 => None,
            n => Some(Self {
                segments: self.segments[..n - 1].iter().cloned().collect(),
            }),
        }
    }

    /// Return a new path extended by one segment.
    #[must_use]
    pub fn join(&self, key: impl Into<Key>) -> KeyPath {
        let mut next = self.clone();
        next.push(key);
        next
    }

    /// Append a segment in place.
    pub fn push(&mut self, key: impl Into<Key>) {
        self.segments.push(key.into());
    }

    /// Remove the last segment.
    pub fn pop(&mut self) -> Option<Key> {
        self.segments.pop()
    }

    /// Borrow the segments.
    #[must_use]
    pub fn as_slice(&self) -> &[Key] {
        &self.segments
    }

    /// Whether `prefix` names this node or one of its ancestors.
    #[must_use]
    pub fn has_prefix(&self, prefix: &[Key]) -> bool {
        self.segments.starts_with(prefix)
    }
}

impl Deref for KeyPath {
    type Target = [Key];

    fn deref(&self) -> &[Key] {
        &self.segments
    }
}

// `Hash`/`Eq`/`Ord` of `KeyPath` are exactly those of its segment slice.
impl Borrow<[Key]> for KeyPath {
    fn borrow(&self) -> &[Key] {
        &self.segments
    }
}

impl AsRef<[Key]> for KeyPath {
    fn as_ref(&self) -> &[Key] {
        &self.segments
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(" / ")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

impl<K: Into<Key>, const N: usize> From<[K; N]> for KeyPath {
    fn from(keys: [K; N]) -> Self {
        keys.into_iter().collect()
    }
}

impl From<Vec<Key>> for KeyPath {
    fn from(keys: Vec<Key>) -> Self {
        Self {
            segments: SmallVec::from_vec(keys),
        }
    }
}

impl From<&[Key]> for KeyPath {
    fn from(keys: &[Key]) -> Self {
        Self {
            segments: SmallVec::from(keys),
        }
    }
}

impl<K: Into<Key>> FromIterator<K> for KeyPath {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a KeyPath {
    type Item = &'a Key;
    type IntoIter = std::slice::Iter<'a, Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

/// Resolve `path` to the node it names.
///
/// Walks the tree one level per segment. The first failure wins: a segment
/// with no matching sibling yields [`ResolveError::NotFound`], and a matching
/// node that is disabled yields [`ResolveError::Disabled`] even when deeper
/// segments would name enabled nodes. The empty path names nothing.
pub fn resolve_path<'t>(tree: &'t OptionTree, path: &[Key]) -> Result<&'t OptionNode, ResolveError> {
    let mut level = tree.roots();
    let mut found: Option<&OptionNode> = None;

    for (depth, key) in path.iter().enumerate() {
        let Some(node) = level.iter().find(|node| node.value() == key) else {
            #[cfg(feature = "tracing")]
            tracing::trace!(depth, key = %key, "cascade.resolve not_found");
            return Err(ResolveError::NotFound { depth });
        };
        if node.is_disabled() {
            #[cfg(feature = "tracing")]
            tracing::trace!(depth, key = %key, "cascade.resolve disabled");
            return Err(ResolveError::Disabled { depth });
        }
        level = node.children();
        found = Some(node);
    }

    found.ok_or(ResolveError::NotFound { depth: 0 })
}
