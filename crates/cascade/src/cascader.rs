#![forbid(unsafe_code)]

//! The [`Cascader`] controller.
//!
//! Bundles an option tree with its configuration and a filter cache, and
//! forwards to the pure selection functions. The selection state itself stays
//! with the caller: every method takes the current state and returns a new
//! one.
//!
//! # Example
//!
//! ```
//! use cascade::prelude::*;
//!
//! let tree = OptionTree::new(vec![
//!     OptionNode::new("status", "Status")
//!         .child(OptionNode::new("active", "Active"))
//!         .child(OptionNode::new("pending", "Pending")),
//! ]);
//! let mut cascader = Cascader::new(tree).with_config(
//!     CascaderConfig::default().with_mode(SelectMode::Multi),
//! );
//!
//! let state = cascader.empty_state();
//! let state = cascader.pick(&state, &KeyPath::from(["status", "active"]));
//! assert_eq!(cascader.labels(&state), ["Status / Active"]);
//! assert_eq!(cascader.visible("pend").total_count(), 2);
//! ```

use std::sync::Arc;

use cascade_core::{Key, KeyPath, OptionTree, resolve_path};
use cascade_select::{
    FilterCache, FilterMap, FilterOptions, SearchHit, SelectMode, SelectPolicy, SelectionState,
    apply_selection_with, search_paths, try_apply_selection_with,
};

use crate::error::Result;

/// Default number of memoized filter results.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Configuration for a [`Cascader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascaderConfig {
    mode: SelectMode,
    policy: SelectPolicy,
    filter: FilterOptions,
    cache_capacity: usize,
    persistence_id: Option<String>,
}

impl Default for CascaderConfig {
    fn default() -> Self {
        Self {
            mode: SelectMode::default(),
            policy: SelectPolicy::default(),
            filter: FilterOptions::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            persistence_id: None,
        }
    }
}

impl CascaderConfig {
    /// Set the selection mode.
    #[must_use]
    pub fn with_mode(mut self, mode: SelectMode) -> Self {
        self.mode = mode;
        self
    }

    /// Only accept picks that end at a leaf.
    #[must_use]
    pub fn with_leaf_only(mut self, leaf_only: bool) -> Self {
        self.policy = self.policy.with_leaf_only(leaf_only);
        self
    }

    /// Set search filtering options.
    #[must_use]
    pub fn with_filter_options(mut self, options: FilterOptions) -> Self {
        self.filter = options;
        self
    }

    /// Set how many filter results are memoized.
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Set a persistence ID for state saving.
    #[must_use]
    pub fn with_persistence_id(mut self, id: impl Into<String>) -> Self {
        self.persistence_id = Some(id.into());
        self
    }

    /// Selection mode.
    #[must_use]
    pub fn mode(&self) -> SelectMode {
        self.mode
    }

    /// Pick policy.
    #[must_use]
    pub fn policy(&self) -> SelectPolicy {
        self.policy
    }

    /// Search filtering options.
    #[must_use]
    pub fn filter_options(&self) -> FilterOptions {
        self.filter
    }

    /// Filter cache capacity.
    #[must_use]
    pub fn cache_capacity(&self) -> usize {
        self.cache_capacity
    }

    /// Get the persistence ID, if set.
    #[must_use]
    pub fn persistence_id(&self) -> Option<&str> {
        self.persistence_id.as_deref()
    }
}

/// Persistable snapshot of a cascader's caller-side state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct CascaderPersistState {
    /// Selected paths in display order.
    pub paths: Vec<KeyPath>,
    /// Search query as typed.
    pub query: String,
}

#[cfg(feature = "state-persistence")]
impl CascaderPersistState {
    /// Encode as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Option tree plus configuration and memoized search.
#[derive(Debug)]
pub struct Cascader {
    tree: OptionTree,
    fingerprint: u64,
    config: CascaderConfig,
    cache: FilterCache,
}

impl Cascader {
    /// Create a cascader over `tree` with default configuration.
    #[must_use]
    pub fn new(tree: OptionTree) -> Self {
        Self {
            fingerprint: tree.fingerprint(),
            tree,
            config: CascaderConfig::default(),
            cache: FilterCache::new(DEFAULT_CACHE_CAPACITY),
        }
    }

    /// Create a cascader after checking that sibling values are unique.
    pub fn try_new(tree: OptionTree, config: CascaderConfig) -> Result<Self> {
        tree.validate()?;
        Ok(Self::new(tree).with_config(config))
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: CascaderConfig) -> Self {
        if config.cache_capacity != self.cache.capacity() {
            self.cache = FilterCache::new(config.cache_capacity);
        }
        self.config = config;
        self
    }

    /// The option tree.
    #[must_use]
    pub fn tree(&self) -> &OptionTree {
        &self.tree
    }

    /// Structural fingerprint of the current tree, computed when it was set.
    #[must_use]
    pub fn tree_fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &CascaderConfig {
        &self.config
    }

    /// Swap in a new option tree, dropping memoized search results.
    ///
    /// Existing selections may now be stale; pass them through
    /// [`SelectionState::retain_valid`] or [`Cascader::restore_state`].
    pub fn set_tree(&mut self, tree: OptionTree) {
        self.fingerprint = tree.fingerprint();
        self.tree = tree;
        self.cache.clear();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "cascade.tree.replaced",
            total_nodes = self.tree.total_count(),
            persistence_id = self.config.persistence_id().unwrap_or("default")
        );
    }

    /// Key under which this cascader's state is persisted.
    #[must_use]
    pub fn state_key(&self) -> String {
        format!(
            "Cascader/{}",
            self.config.persistence_id().unwrap_or("default")
        )
    }

    /// Empty selection for the configured mode.
    #[must_use]
    pub fn empty_state(&self) -> SelectionState {
        SelectionState::empty(self.config.mode)
    }

    /// Apply a pick; unresolvable picks return `state` unchanged.
    #[must_use]
    pub fn pick(&self, state: &SelectionState, path: &[Key]) -> SelectionState {
        apply_selection_with(&self.tree, state, path, self.config.mode, self.config.policy)
    }

    /// Apply a pick, reporting why it was rejected.
    pub fn try_pick(&self, state: &SelectionState, path: &[Key]) -> Result<SelectionState> {
        Ok(try_apply_selection_with(
            &self.tree,
            state,
            path,
            self.config.mode,
            self.config.policy,
        )?)
    }

    /// Filtered tree for `query`, memoized.
    ///
    /// A repeated query costs one hash lookup; the tree is not walked.
    pub fn visible(&mut self, query: &str) -> Arc<OptionTree> {
        self.cache
            .get_or_filter_keyed(&self.tree, self.fingerprint, query, self.config.filter)
    }

    /// Flattened leaf hits for `query`.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        search_paths(&self.tree, query)
    }

    /// Category → value(s) projection of `state`.
    #[must_use]
    pub fn filter_map(&self, state: &SelectionState) -> FilterMap {
        state.filter_map()
    }

    /// Display labels (`Parent / Child`) of every selected path still in the tree.
    #[must_use]
    pub fn labels(&self, state: &SelectionState) -> Vec<String> {
        state
            .labels(&self.tree)
            .into_iter()
            .map(|labels| labels.join(" / "))
            .collect()
    }

    /// Filter cache statistics.
    #[must_use]
    pub fn cache_stats(&self) -> cascade_select::FilterCacheStats {
        self.cache.stats()
    }

    /// Snapshot `state` and `query` for persistence.
    #[must_use]
    pub fn save_state(&self, state: &SelectionState, query: &str) -> CascaderPersistState {
        CascaderPersistState {
            paths: state.paths().cloned().collect(),
            query: query.to_owned(),
        }
    }

    /// Rebuild a selection from a snapshot.
    ///
    /// Paths that no longer resolve (or violate the pick policy) are dropped.
    /// In single mode the last surviving path wins.
    #[must_use]
    pub fn restore_state(&self, persist: &CascaderPersistState) -> SelectionState {
        let valid = persist.paths.iter().filter(|path| self.is_pickable(path));
        let restored = match self.config.mode {
            SelectMode::Single { .. } => SelectionState::Single(valid.last().cloned()),
            SelectMode::Multi => SelectionState::multi(valid.cloned()),
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "cascade.state.restored",
            saved = persist.paths.len(),
            restored = restored.len(),
            persistence_id = self.config.persistence_id().unwrap_or("default")
        );

        restored
    }

    fn is_pickable(&self, path: &[Key]) -> bool {
        resolve_path(&self.tree, path)
            .is_ok_and(|node| !self.config.policy.leaf_only() || node.is_leaf())
    }
}
