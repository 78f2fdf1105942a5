#![forbid(unsafe_code)]

//! Search filtering over option trees.
//!
//! [`filter_tree`] narrows a tree to the nodes whose label contains the query
//! (case-insensitive) plus every ancestor leading to such a node. Nodes with
//! no match in their own label or anywhere below are dropped from the result
//! entirely. A blank query is the identity.
//!
//! [`search_paths`] flattens the same matching into the list of full leaf
//! paths a cascader shows while the user types.

use cascade_core::{KeyPath, OptionNode, OptionTree};
#[cfg(feature = "tracing")]
use web_time::Instant;

/// Tuning for [`filter_tree_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FilterOptions {
    keep_matched_subtrees: bool,
}

impl FilterOptions {
    /// Keep the whole subtree under a node whose own label matches, instead
    /// of pruning its non-matching descendants.
    #[must_use]
    pub fn with_keep_matched_subtrees(mut self, keep: bool) -> Self {
        self.keep_matched_subtrees = keep;
        self
    }

    /// Whether matched nodes keep their whole subtree.
    #[must_use]
    pub const fn keep_matched_subtrees(&self) -> bool {
        self.keep_matched_subtrees
    }
}

/// Lowercase a query; `None` when it is empty or whitespace only.
///
/// Surrounding whitespace of a non-blank query is kept and must match.
#[must_use]
pub fn normalize_query(query: &str) -> Option<String> {
    if query.trim().is_empty() {
        None
    } else {
        Some(query.to_lowercase())
    }
}

fn label_matches(node: &OptionNode, query_lower: &str) -> bool {
    node.label().to_lowercase().contains(query_lower)
}

/// Filter `tree` by `query` with default options.
#[must_use]
pub fn filter_tree(tree: &OptionTree, query: &str) -> OptionTree {
    filter_tree_with(tree, query, FilterOptions::default())
}

/// Filter `tree` by `query`.
#[must_use]
pub fn filter_tree_with(tree: &OptionTree, query: &str, options: FilterOptions) -> OptionTree {
    let Some(query_lower) = normalize_query(query) else {
        return tree.clone();
    };

    #[cfg(feature = "tracing")]
    let filter_start = Instant::now();
    #[cfg(feature = "tracing")]
    let total_nodes = tree.total_count();
    #[cfg(feature = "tracing")]
    let filter_span = tracing::debug_span!(
        "cascade.filter",
        total_nodes,
        matched_nodes = tracing::field::Empty,
        duration_us = tracing::field::Empty,
    );
    #[cfg(feature = "tracing")]
    let _filter_guard = filter_span.enter();

    let filtered: OptionTree = tree
        .roots()
        .iter()
        .filter_map(|root| filter_node(root, &query_lower, options))
        .collect();

    #[cfg(feature = "tracing")]
    {
        let elapsed_us = filter_start.elapsed().as_micros() as u64;
        let matched_nodes = filtered.total_count();
        filter_span.record("matched_nodes", matched_nodes);
        filter_span.record("duration_us", elapsed_us);
        tracing::debug!(
            message = "cascade.filter.metrics",
            filter_duration_us = elapsed_us,
            total_nodes,
            matched_nodes
        );
    }

    filtered
}

fn filter_node(node: &OptionNode, query_lower: &str, options: FilterOptions) -> Option<OptionNode> {
    let matches = label_matches(node, query_lower);
    if matches && options.keep_matched_subtrees {
        return Some(node.clone());
    }

    let children: Vec<OptionNode> = node
        .children()
        .iter()
        .filter_map(|child| filter_node(child, query_lower, options))
        .collect();

    if !matches && children.is_empty() {
        return None;
    }

    Some(
        OptionNode::new(node.value().clone(), node.label())
            .with_disabled(node.is_disabled())
            .with_children(children),
    )
}

/// One flattened search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Full path of the leaf.
    pub path: KeyPath,
    /// Labels along the path, root first.
    pub labels: Vec<String>,
    /// Whether any node on the path is disabled (the hit is shown but not pickable).
    pub disabled: bool,
}

impl SearchHit {
    /// Labels joined for display, e.g. `China / Beijing`.
    #[must_use]
    pub fn display_label(&self) -> String {
        self.labels.join(" / ")
    }
}

/// Leaf paths passing through at least one node whose label matches `query`.
///
/// Results follow depth-first tree order. A blank query yields no hits.
#[must_use]
pub fn search_paths(tree: &OptionTree, query: &str) -> Vec<SearchHit> {
    let Some(query_lower) = normalize_query(query) else {
        return Vec::new();
    };

    let mut hits = Vec::new();
    let mut trail = SearchTrail::default();
    for root in tree.roots() {
        collect_hits(root, &query_lower, &mut trail, &mut hits);
    }
    hits
}

#[derive(Default)]
struct SearchTrail<'a> {
    path: KeyPath,
    labels: Vec<&'a str>,
    matched: usize,
    disabled: usize,
}

fn collect_hits<'a>(
    node: &'a OptionNode,
    query_lower: &str,
    trail: &mut SearchTrail<'a>,
    hits: &mut Vec<SearchHit>,
) {
    let matched = label_matches(node, query_lower);
    trail.path.push(node.value().clone());
    trail.labels.push(node.label());
    trail.matched += usize::from(matched);
    trail.disabled += usize::from(node.is_disabled());

    if node.is_leaf() {
        if trail.matched > 0 {
            hits.push(SearchHit {
                path: trail.path.clone(),
                labels: trail.labels.iter().map(|l| (*l).to_owned()).collect(),
                disabled: trail.disabled > 0,
            });
        }
    } else {
        for child in node.children() {
            collect_hits(child, query_lower, trail, hits);
        }
    }

    trail.disabled -= usize::from(node.is_disabled());
    trail.matched -= usize::from(matched);
    trail.labels.pop();
    trail.path.pop();
}
