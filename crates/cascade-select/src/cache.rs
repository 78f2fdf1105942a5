#![forbid(unsafe_code)]

//! Memoized search filtering.
//!
//! Filtering a large option tree on every keystroke and every render is the
//! only non-trivial cost in the selection model. [`FilterCache`] memoizes
//! [`filter_tree_with`] results keyed by the tree's structural fingerprint,
//! the normalized query, and the filter options.
//!
//! # Usage
//!
//! ```
//! use cascade_core::{OptionNode, OptionTree};
//! use cascade_select::{FilterCache, FilterOptions};
//!
//! let tree = OptionTree::new(vec![OptionNode::new("china", "China")]);
//! let mut cache = FilterCache::new(32);
//!
//! let first = cache.get_or_filter(&tree, "chi", FilterOptions::default());
//! let second = cache.get_or_filter(&tree, "CHI", FilterOptions::default());
//! assert_eq!(first, second);
//! assert_eq!(cache.stats().hits, 1);
//! ```
//!
//! # Invalidation
//!
//! The tree fingerprint is part of the key, so handing the cache a changed
//! tree never returns a stale result. [`FilterCache::invalidate_all`] exists
//! for callers that want to drop memory held for trees they no longer show.
//!
//! [`FilterCache::get_or_filter`] fingerprints the tree on every call, which
//! walks every node. Owners of a long-lived tree should compute
//! [`OptionTree::fingerprint`] once and use
//! [`FilterCache::get_or_filter_keyed`], so a hit costs one hash lookup.
//!
//! # Eviction
//!
//! When at capacity the least-used entry is evicted.

use std::sync::Arc;

use cascade_core::OptionTree;
use rustc_hash::FxHashMap;

use crate::filter::{FilterOptions, filter_tree_with, normalize_query};

/// Key for filter cache lookups.
///
/// Trees are compared by their 64-bit structural fingerprint only. Two
/// different trees with colliding fingerprints would share cached results.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct FilterCacheKey {
    /// Structural fingerprint of the source tree.
    pub tree_fingerprint: u64,
    /// Lowercased query (empty for the identity filter).
    pub query: String,
    /// Options the filter ran with.
    pub options: FilterOptions,
}

impl FilterCacheKey {
    /// Build the key for filtering `tree` by `query`.
    pub fn new(tree: &OptionTree, query: &str, options: FilterOptions) -> Self {
        Self::with_fingerprint(tree.fingerprint(), query, options)
    }

    /// Build the key from a precomputed tree fingerprint.
    pub fn with_fingerprint(tree_fingerprint: u64, query: &str, options: FilterOptions) -> Self {
        Self {
            tree_fingerprint,
            query: normalize_query(query).unwrap_or_default(),
            options,
        }
    }
}

#[derive(Clone, Debug)]
struct CachedFilterEntry {
    tree: Arc<OptionTree>,
    generation: u64,
    access_count: u32,
}

/// Statistics about filter cache performance.
#[derive(Debug, Clone, Default)]
pub struct FilterCacheStats {
    /// Number of entries currently in the cache.
    pub entries: usize,
    /// Total cache hits since creation or last reset.
    pub hits: u64,
    /// Total cache misses since creation or last reset.
    pub misses: u64,
    /// Hit rate as a fraction (0.0 to 1.0).
    pub hit_rate: f64,
}

/// Bounded memo of filtered trees.
#[derive(Debug)]
pub struct FilterCache {
    entries: FxHashMap<FilterCacheKey, CachedFilterEntry>,
    generation: u64,
    max_entries: usize,
    hits: u64,
    misses: u64,
}

impl FilterCache {
    /// Create a cache holding at most `max_entries` results (minimum 1).
    #[inline]
    pub fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            entries: FxHashMap::with_capacity_and_hasher(max_entries, Default::default()),
            generation: 0,
            max_entries,
            hits: 0,
            misses: 0,
        }
    }

    /// Filtered view of `tree`, computed at most once per key and generation.
    pub fn get_or_filter(
        &mut self,
        tree: &OptionTree,
        query: &str,
        options: FilterOptions,
    ) -> Arc<OptionTree> {
        self.get_or_filter_keyed(tree, tree.fingerprint(), query, options)
    }

    /// [`get_or_filter`](Self::get_or_filter) with the caller's fingerprint of
    /// `tree`.
    ///
    /// `tree` is only read on a miss. `fingerprint` must be
    /// `tree.fingerprint()`; a stale value returns results for the old tree.
    pub fn get_or_filter_keyed(
        &mut self,
        tree: &OptionTree,
        fingerprint: u64,
        query: &str,
        options: FilterOptions,
    ) -> Arc<OptionTree> {
        let key = FilterCacheKey::with_fingerprint(fingerprint, query, options);

        if let Some(entry) = self.entries.get_mut(&key)
            && entry.generation == self.generation
        {
            self.hits += 1;
            entry.access_count = entry.access_count.saturating_add(1);
            return Arc::clone(&entry.tree);
        }

        self.misses += 1;
        let filtered = Arc::new(filter_tree_with(tree, &key.query, options));

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.evict_lru();
        }

        self.entries.insert(
            key,
            CachedFilterEntry {
                tree: Arc::clone(&filtered),
                generation: self.generation,
                access_count: 1,
            },
        );

        filtered
    }

    /// Make every entry stale. O(1); stale entries are replaced lazily.
    #[inline]
    pub fn invalidate_all(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "cascade.filter_cache.invalidate",
            generation = self.generation,
            entries = self.entries.len()
        );
    }

    /// Current hit/miss statistics.
    pub fn stats(&self) -> FilterCacheStats {
        let total = self.hits + self.misses;
        FilterCacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
            hit_rate: if total > 0 {
                self.hits as f64 / total as f64
            } else {
                0.0
            },
        }
    }

    /// Reset statistics counters to zero.
    #[inline]
    pub fn reset_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }

    /// Drop all entries immediately.
    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Number of stored entries (stale ones included).
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    fn evict_lru(&mut self) {
        if let Some(key) = self
            .entries
            .iter()
            .min_by_key(|(_, e)| (e.generation == self.generation, e.access_count))
            .map(|(k, _)| k.clone())
        {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                message = "cascade.filter_cache.evict",
                query = key.query.as_str(),
                tree_fingerprint = key.tree_fingerprint
            );
            self.entries.remove(&key);
        }
    }
}

impl Default for FilterCache {
    /// Creates a cache with default capacity of 64 entries.
    fn default() -> Self {
        Self::new(64)
    }
}
