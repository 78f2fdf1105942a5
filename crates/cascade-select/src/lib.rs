#![forbid(unsafe_code)]

//! Selection model for cascade option trees.
//!
//! Everything here is a pure function over caller-owned values: the option
//! tree and the current [`SelectionState`] go in, a new state (or filtered
//! tree, or filter map) comes out.
//!
//! - [`selection`]: single/multi pick transitions with silent rejection of
//!   picks that do not resolve.
//! - [`filter`]: case-insensitive search with ancestor inclusion.
//! - [`cache`]: memoized filtering keyed by tree fingerprint and query.
//! - [`projection`]: category → value(s) projection and record matching.

pub mod cache;
pub mod filter;
pub mod projection;
pub mod selection;

pub use cache::{FilterCache, FilterCacheKey, FilterCacheStats};
pub use filter::{
    FilterOptions, SearchHit, filter_tree, filter_tree_with, normalize_query, search_paths,
};
pub use projection::{FilterMap, FilterRecord, FilterValue, to_filter_map};
pub use selection::{
    ParseSelectModeError, SelectMode, SelectPolicy, SelectRejection, SelectionState, apply_selection,
    apply_selection_with, try_apply_selection, try_apply_selection_with,
};
