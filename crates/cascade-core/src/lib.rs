#![forbid(unsafe_code)]

//! Core data model for hierarchical option selection.
//!
//! - [`Key`]: primitive option value with strict per-variant equality.
//! - [`OptionNode`] / [`OptionTree`]: the caller-owned, read-only option forest.
//! - [`KeyPath`] and [`resolve_path`]: naming a node by its values, root first,
//!   and checking that the name still points at an enabled option.

pub mod error;
pub mod key;
pub mod node;
pub mod path;

pub use error::{ResolveError, TreeError};
pub use key::Key;
pub use node::{OptionNode, OptionTree};
pub use path::{KeyPath, resolve_path};
