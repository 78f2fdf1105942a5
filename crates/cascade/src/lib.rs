#![forbid(unsafe_code)]

//! Cascade public facade crate.
//!
//! Re-exports the option tree model and the selection engine, and adds the
//! [`Cascader`] controller that ties a tree, its configuration and a filter
//! cache together. Most users only need the [`prelude`].

pub mod cascader;
mod error;

// --- Tree re-exports -------------------------------------------------------

pub use cascade_core::{Key, KeyPath, OptionNode, OptionTree, ResolveError, TreeError, resolve_path};

// --- Selection re-exports --------------------------------------------------

pub use cascade_select::{
    FilterCache, FilterCacheStats, FilterMap, FilterOptions, FilterRecord, FilterValue,
    SearchHit, SelectMode, SelectPolicy, SelectRejection, SelectionState, apply_selection,
    filter_tree, search_paths, to_filter_map, try_apply_selection,
};

// --- Controller ------------------------------------------------------------

pub use cascader::{Cascader, CascaderConfig, CascaderPersistState};

// --- Errors ----------------------------------------------------------------

pub use error::{Error, Result};

// --- Prelude ---------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Cascader, CascaderConfig, Error, FilterMap, FilterOptions, FilterRecord, FilterValue, Key,
        KeyPath, OptionNode, OptionTree, Result, SearchHit, SelectMode, SelectionState,
    };

    pub use crate::{core, select};
}

pub use cascade_core as core;
pub use cascade_select as select;
