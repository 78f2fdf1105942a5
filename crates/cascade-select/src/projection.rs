#![forbid(unsafe_code)]

//! Flat category → value(s) projection of a selection.
//!
//! List and table filters match records by simple attribute equality
//! ("status = active"). [`to_filter_map`] projects selection paths into that
//! shape: the category is the first segment of each path, the value is the
//! last. Intermediate segments are discarded, so the projection cannot be
//! inverted; keep the original paths if you need them back.
//!
//! # Example
//!
//! ```
//! use cascade_core::{Key, KeyPath};
//! use cascade_select::{FilterValue, to_filter_map};
//!
//! let paths = [
//!     KeyPath::from(["status", "active"]),
//!     KeyPath::from(["status", "pending"]),
//!     KeyPath::from(["pool", "1"]),
//! ];
//! let map = to_filter_map(&paths);
//! assert_eq!(
//!     map.get(&Key::from("status")),
//!     Some(&FilterValue::Many(vec![Key::from("active"), Key::from("pending")])),
//! );
//! assert_eq!(map.get(&Key::from("pool")), Some(&FilterValue::One(Key::from("1"))));
//! ```

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use cascade_core::Key;
use indexmap::IndexMap;

use crate::selection::SelectionState;

/// The value side of a [`FilterMap`] entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum FilterValue {
    /// Exactly one path selected in the category.
    One(Key),
    /// Several paths selected; distinct leaf values in first-seen order.
    Many(Vec<Key>),
}

impl FilterValue {
    /// Whether `value` satisfies this entry.
    #[must_use]
    pub fn contains(&self, value: &Key) -> bool {
        match self {
            Self::One(key) => key == value,
            Self::Many(keys) => keys.contains(value),
        }
    }

    /// Accepted values as a slice.
    #[must_use]
    pub fn keys(&self) -> &[Key] {
        match self {
            Self::One(key) => std::slice::from_ref(key),
            Self::Many(keys) => keys,
        }
    }
}

/// Insertion-ordered category → value(s) map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct FilterMap {
    entries: IndexMap<Key, FilterValue>,
}

impl FilterMap {
    /// Value for `category`.
    #[must_use]
    pub fn get(&self, category: &Key) -> Option<&FilterValue> {
        self.entries.get(category)
    }

    /// Number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no category is constrained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-seen category order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &FilterValue)> + '_ {
        self.entries.iter()
    }

    /// Categories in first-seen order.
    pub fn categories(&self) -> impl Iterator<Item = &Key> + '_ {
        self.entries.keys()
    }

    /// Whether `record` satisfies every category.
    ///
    /// An empty map accepts everything. A record lacking a constrained field
    /// is rejected.
    #[must_use]
    pub fn matches<R: FilterRecord + ?Sized>(&self, record: &R) -> bool {
        self.entries.iter().all(|(category, value)| {
            record
                .field(category)
                .is_some_and(|field| value.contains(field))
        })
    }

    /// Records accepted by [`matches`](Self::matches), in input order.
    pub fn filter<'r, R, I>(&self, records: I) -> Vec<&'r R>
    where
        R: FilterRecord + 'r,
        I: IntoIterator<Item = &'r R>,
    {
        records
            .into_iter()
            .filter(|record| self.matches(*record))
            .collect()
    }

    /// Consume the map, returning the underlying ordered map.
    #[must_use]
    pub fn into_inner(self) -> IndexMap<Key, FilterValue> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a FilterMap {
    type Item = (&'a Key, &'a FilterValue);
    type IntoIter = indexmap::map::Iter<'a, Key, FilterValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Project selection paths into a [`FilterMap`].
///
/// A category with one path maps to that path's leaf value. A category with
/// two or more paths maps to the list of their distinct leaf values, even
/// when the leaves collapse to a single value. Empty paths are skipped.
pub fn to_filter_map<I>(paths: I) -> FilterMap
where
    I: IntoIterator,
    I::Item: AsRef<[Key]>,
{
    let mut grouped: IndexMap<Key, (usize, Vec<Key>)> = IndexMap::new();
    for path in paths {
        let path = path.as_ref();
        let (Some(category), Some(leaf)) = (path.first(), path.last()) else {
            continue;
        };
        let (count, leaves) = grouped.entry(category.clone()).or_default();
        *count += 1;
        if !leaves.contains(leaf) {
            leaves.push(leaf.clone());
        }
    }

    let entries = grouped
        .into_iter()
        .map(|(category, (count, mut leaves))| {
            let value = if count == 1 {
                FilterValue::One(leaves.remove(0))
            } else {
                FilterValue::Many(leaves)
            };
            (category, value)
        })
        .collect();

    FilterMap { entries }
}

impl SelectionState {
    /// Project this selection with [`to_filter_map`].
    #[must_use]
    pub fn filter_map(&self) -> FilterMap {
        to_filter_map(self.paths())
    }
}

/// A record that can be matched against a [`FilterMap`].
pub trait FilterRecord {
    /// Value of the field named by `category`, if the record has one.
    fn field(&self, category: &Key) -> Option<&Key>;
}

impl<S: BuildHasher> FilterRecord for HashMap<Key, Key, S> {
    fn field(&self, category: &Key) -> Option<&Key> {
        self.get(category)
    }
}

impl FilterRecord for BTreeMap<Key, Key> {
    fn field(&self, category: &Key) -> Option<&Key> {
        self.get(category)
    }
}

impl<S: BuildHasher> FilterRecord for IndexMap<Key, Key, S> {
    fn field(&self, category: &Key) -> Option<&Key> {
        self.get(category)
    }
}

impl<R: FilterRecord + ?Sized> FilterRecord for &R {
    fn field(&self, category: &Key) -> Option<&Key> {
        (**self).field(category)
    }
}
